//! Export task entry points.
//!
//! [`run_task`] is what the host engine invokes once the input document is
//! open: it reads the selection flags from the params file the automation
//! service downloaded (normally `params.json` in the working directory) and
//! calls [`export_views`].

use std::path::{Path, PathBuf};

use viewpress_core::view_selection::{SelectionProfile, ViewId, ViewSelectionConfig};

use crate::host::{ExportOptions, HostDocument, HostError};
use crate::selector::{select_views, MAX_EXPORTED_VIEWS};
use crate::session::ScopedSession;

/// Selection input file the automation service places in the working
/// directory.
pub const PARAMS_FILE: &str = "params.json";

/// Base name of the merged artifact.
pub const ARTIFACT_NAME: &str = "result";

/// Name of the host session wrapped around the export.
const SESSION_NAME: &str = "Export PDF";

/// Task failures. These fail the remote work item.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The host could not open the session the export needs.
    #[error("Could not open host session: {0}")]
    Session(HostError),

    /// The host's export primitive failed.
    #[error("Export failed: {0}")]
    ExportFailed(HostError),
}

/// What one run of the task produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Exported view ids, in document order.
    pub exported: Vec<ViewId>,
    /// Views that matched before the bound.
    pub qualifying: usize,
    /// The merged artifact; `None` when nothing was selected.
    pub artifact: Option<PathBuf>,
}

/// Read the selection flags from `path`.
///
/// A missing, unreadable or malformed file yields the all-enabled default.
pub fn load_params(path: &Path) -> ViewSelectionConfig {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No selection file, exporting all view types");
        return ViewSelectionConfig::default();
    }
    match std::fs::read_to_string(path) {
        Ok(text) => ViewSelectionConfig::parse_or_default(&text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read selection file");
            ViewSelectionConfig::default()
        }
    }
}

/// Select views of `doc` and export them as one merged artifact into
/// `working_dir`.
///
/// An empty selection is a success with no artifact. The document is left
/// exactly as it was: the host session is rolled back on every path.
pub fn export_views<D: HostDocument + ?Sized>(
    doc: &mut D,
    config: &ViewSelectionConfig,
    profile: &SelectionProfile,
    working_dir: &Path,
) -> Result<ExportOutcome, ExportError> {
    let mut session = ScopedSession::open(doc, SESSION_NAME).map_err(ExportError::Session)?;

    let views = session.views();
    let selection = select_views(&views, config, profile, MAX_EXPORTED_VIEWS);

    tracing::info!(
        total = views.len(),
        qualifying = selection.qualifying,
        selected = selection.views.len(),
        dropped = selection.dropped(),
        profile = profile.name,
        "Views selected for export",
    );
    for view in &selection.views {
        tracing::debug!(view = %view.name, view_type = %view.view_type, "Selected view");
    }

    if selection.is_empty() {
        return Ok(ExportOutcome {
            exported: Vec::new(),
            qualifying: selection.qualifying,
            artifact: None,
        });
    }

    let ids = selection.ids();
    let artifact = session
        .export(working_dir, &ids, &ExportOptions::combined(ARTIFACT_NAME))
        .map_err(|e| {
            tracing::error!(error = %e, "Host export failed");
            ExportError::ExportFailed(e)
        })?;

    tracing::info!(artifact = %artifact.display(), views = ids.len(), "Export written");

    Ok(ExportOutcome {
        exported: ids,
        qualifying: selection.qualifying,
        artifact: Some(artifact),
    })
}

/// Task entry point: load flags from `params_path`, then export into
/// `working_dir` under `profile`.
pub fn run_task<D: HostDocument + ?Sized>(
    doc: &mut D,
    params_path: &Path,
    profile: &SelectionProfile,
    working_dir: &Path,
) -> Result<ExportOutcome, ExportError> {
    let config = load_params(params_path);
    export_views(doc, &config, profile, working_dir)
}

/// [`run_task`] with the params file at its conventional place,
/// `working_dir/params.json`.
pub fn run_task_in<D: HostDocument + ?Sized>(
    doc: &mut D,
    profile: &SelectionProfile,
    working_dir: &Path,
) -> Result<ExportOutcome, ExportError> {
    run_task(doc, &working_dir.join(PARAMS_FILE), profile, working_dir)
}
