//! The export task that runs inside the host document engine.
//!
//! Picks the views of an opened document that match the client's
//! selection flags, caps their number, and has the host export them into a
//! single merged artifact. The host engine itself is reached only through
//! the [`HostDocument`] trait.

pub mod host;
pub mod memory;
pub mod selector;
pub mod session;
pub mod task;

pub use host::{ExportOptions, HostDocument, HostError};
pub use memory::MemoryDocument;
pub use selector::{select_views, Selection, MAX_EXPORTED_VIEWS};
pub use session::ScopedSession;
pub use task::{export_views, load_params, run_task, run_task_in, ExportError, ExportOutcome};
