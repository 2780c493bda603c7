//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the [`WorkItemManager`](viewpress_automation::WorkItemManager)
//! and map errors via [`AppError`](crate::error::AppError).

pub mod callback;
pub mod workitems;
