/// Correlation identifiers are issued by the remote compute service and
/// treated as opaque strings.
pub type WorkItemId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
