//! Interface of the host document engine.

use std::path::{Path, PathBuf};

use viewpress_core::view_selection::{View, ViewId};

/// Error raised by the host engine.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HostError(pub String);

/// Options for the host's export primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Artifact base name; the host appends the extension.
    pub file_name: String,
    /// Merge all views into one artifact instead of one file per view.
    pub combine: bool,
}

impl ExportOptions {
    /// One merged artifact named `file_name`.
    pub fn combined(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            combine: true,
        }
    }
}

/// An opened document in the host engine.
pub trait HostDocument {
    /// Every view in the document, in the document's own order.
    fn views(&self) -> Vec<View>;

    /// Open a transactional session. The host refuses to export outside
    /// one.
    fn begin_session(&mut self, name: &str) -> Result<(), HostError>;

    /// Discard everything done in the open session.
    fn rollback_session(&mut self);

    /// Export `view_ids` into `folder`, returning the written artifact.
    ///
    /// The file survives a later rollback of the session.
    fn export(
        &mut self,
        folder: &Path,
        view_ids: &[ViewId],
        options: &ExportOptions,
    ) -> Result<PathBuf, HostError>;
}
