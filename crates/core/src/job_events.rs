//! Notification topic and field names for work item status pushes.
//!
//! Browser clients listen on [`TOPIC_WORKITEM`]; the payload keys are kept
//! in the PascalCase form the front end already consumes.

/// The single topic every work item status change is published on.
pub const TOPIC_WORKITEM: &str = "Workitem-Notification";

/// Payload key holding the correlation id.
pub const FIELD_WORKITEM_ID: &str = "WorkitemId";

/// Payload key holding the status name.
pub const FIELD_STATUS: &str = "Status";

/// Payload key holding the optional extra info (artifact location).
pub const FIELD_EXTRA_INFO: &str = "ExtraInfo";
