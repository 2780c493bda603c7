use crate::messages::DescriptorTemplate;

/// Default automation endpoint.
const DEFAULT_BASE_URL: &str = "https://developer.api.autodesk.com/da/us-east/v3";

/// Remote automation service configuration loaded from environment
/// variables.
#[derive(Clone)]
pub struct AutomationConfig {
    /// Service base URL, without trailing slash.
    pub base_url: String,
    /// Fully qualified activity that runs the export task.
    pub activity_id: String,
    /// Pre-issued bearer token for the service.
    pub access_token: String,
    /// Token the remote task uses to download the input document, if the
    /// input location needs one.
    pub input_token: Option<String>,
    /// Public URL of `/api/v1/callback/designautomation`.
    pub callback_url: String,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl AutomationConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                   | Default                                           |
    /// |---------------------------|---------------------------------------------------|
    /// | `DA_BASE_URL`             | `https://developer.api.autodesk.com/da/us-east/v3` |
    /// | `DA_ACTIVITY_ID`          | required                                          |
    /// | `DA_ACCESS_TOKEN`         | required                                          |
    /// | `DA_INPUT_ACCESS_TOKEN`   | none                                              |
    /// | `DA_CALLBACK_URL`         | required                                          |
    /// | `DA_REQUEST_TIMEOUT_SECS` | `30`                                              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let request_timeout_secs = match lookup("DA_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "DA_REQUEST_TIMEOUT_SECS",
                expected: "u64",
                value: raw,
            })?,
            None => 30,
        };

        Ok(Self {
            base_url: lookup("DA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            activity_id: required("DA_ACTIVITY_ID")?,
            access_token: required("DA_ACCESS_TOKEN")?,
            input_token: lookup("DA_INPUT_ACCESS_TOKEN").filter(|v| !v.is_empty()),
            callback_url: required("DA_CALLBACK_URL")?,
            request_timeout_secs,
        })
    }

    /// The descriptor parts shared by every submission.
    pub fn descriptor_template(&self) -> DescriptorTemplate {
        DescriptorTemplate {
            activity_id: self.activity_id.clone(),
            callback_url: self.callback_url.clone(),
            input_token: self.input_token.clone(),
        }
    }
}

impl std::fmt::Debug for AutomationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationConfig")
            .field("base_url", &self.base_url)
            .field("activity_id", &self.activity_id)
            .field("access_token", &"<redacted>")
            .field("input_token", &self.input_token.as_ref().map(|_| "<redacted>"))
            .field("callback_url", &self.callback_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
