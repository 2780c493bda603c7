//! In-memory host document.
//!
//! Stands in for the real engine in dry runs and tests. Its "export" writes
//! a plain-text artifact listing the exported view names, one per line, so
//! the merged output can be inspected.

use std::path::{Path, PathBuf};

use viewpress_core::view_selection::{View, ViewId};

use crate::host::{ExportOptions, HostDocument, HostError};

/// Artifact extension the host appends.
const ARTIFACT_EXTENSION: &str = "pdf";

#[derive(Debug, Default)]
pub struct MemoryDocument {
    views: Vec<View>,
    open_sessions: usize,
    /// How many sessions were rolled back.
    pub rollbacks: usize,
    /// View id lists passed to each export call.
    pub export_calls: Vec<Vec<ViewId>>,
    /// Make the next export fail.
    pub fail_export: bool,
}

impl MemoryDocument {
    pub fn new(views: Vec<View>) -> Self {
        Self {
            views,
            ..Self::default()
        }
    }

    /// Sessions opened and not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions
    }
}

impl HostDocument for MemoryDocument {
    fn views(&self) -> Vec<View> {
        self.views.clone()
    }

    fn begin_session(&mut self, _name: &str) -> Result<(), HostError> {
        self.open_sessions += 1;
        Ok(())
    }

    fn rollback_session(&mut self) {
        self.open_sessions = self.open_sessions.saturating_sub(1);
        self.rollbacks += 1;
    }

    fn export(
        &mut self,
        folder: &Path,
        view_ids: &[ViewId],
        options: &ExportOptions,
    ) -> Result<PathBuf, HostError> {
        if self.open_sessions == 0 {
            return Err(HostError("export requires an open session".into()));
        }
        self.export_calls.push(view_ids.to_vec());
        if self.fail_export {
            return Err(HostError("printer driver unavailable".into()));
        }
        if !options.combine {
            return Err(HostError("only combined export is supported".into()));
        }

        let names: Vec<&str> = view_ids
            .iter()
            .filter_map(|id| self.views.iter().find(|v| v.id == *id))
            .map(|v| v.name.as_str())
            .collect();

        let path = folder.join(format!("{}.{ARTIFACT_EXTENSION}", options.file_name));
        std::fs::write(&path, names.join("\n")).map_err(|e| HostError(e.to_string()))?;
        Ok(path)
    }
}
