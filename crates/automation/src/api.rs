//! REST API client for the remote automation service.
//!
//! Wraps the work item endpoints (submission, status, cancellation) using
//! [`reqwest`]. No call is retried here; callers decide what to do with
//! a failure.

use std::time::Duration;

use crate::config::AutomationConfig;
use crate::messages::{StatusResponse, SubmitResponse, WorkItemDescriptor};

/// HTTP client for one automation service endpoint.
pub struct DesignAutomationApi {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
}

/// Errors from the automation REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum AutomationApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service does not know the work item.
    #[error("Work item {0} not found")]
    NotFound(String),

    /// The configured base URL cannot carry a work item path.
    #[error("Invalid automation service URL: {0}")]
    InvalidUrl(String),

    /// The service returned another non-2xx status code.
    #[error("Automation API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl DesignAutomationApi {
    /// Create a client for the service at `api_url`, e.g.
    /// `https://developer.api.autodesk.com/da/us-east/v3`.
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, access_token)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Build a client from loaded configuration, applying its request
    /// timeout.
    pub fn from_config(config: &AutomationConfig) -> Result<Self, AutomationApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(
            client,
            config.base_url.clone(),
            config.access_token.clone(),
        ))
    }

    /// Submit a work item. Sends `POST /workitems`.
    pub async fn submit_workitem(
        &self,
        descriptor: &WorkItemDescriptor,
    ) -> Result<SubmitResponse, AutomationApiError> {
        let response = self
            .client
            .post(self.endpoint(&[])?)
            .bearer_auth(&self.access_token)
            .json(descriptor)
            .send()
            .await?;

        Self::parse_response(response, None).await
    }

    /// Fetch the current status of a work item. Sends
    /// `GET /workitems/{id}`.
    pub async fn get_workitem(&self, id: &str) -> Result<StatusResponse, AutomationApiError> {
        let response = self
            .client
            .get(self.endpoint(&[id])?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::parse_response(response, Some(id)).await
    }

    /// Ask the service to cancel a work item. Sends
    /// `DELETE /workitems/{id}`.
    ///
    /// Succeeds even when the job is already past its cancellable point;
    /// the service simply lets it finish.
    pub async fn cancel_workitem(&self, id: &str) -> Result<(), AutomationApiError> {
        let response = self
            .client
            .delete(self.endpoint(&[id])?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::ensure_success(response, Some(id)).await?;
        Ok(())
    }

    // ---- private helpers ----

    /// `{api_url}/workitems/{segments...}`, each segment percent-encoded so
    /// an id can never climb out of the work item collection.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, AutomationApiError> {
        let mut url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| AutomationApiError::InvalidUrl(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|()| AutomationApiError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .push("workitems")
            .extend(segments);
        Ok(url)
    }

    /// Ensure the response has a success status code. A 404 on a
    /// work item path becomes [`AutomationApiError::NotFound`].
    async fn ensure_success(
        response: reqwest::Response,
        workitem_id: Option<&str>,
    ) -> Result<reqwest::Response, AutomationApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if let (reqwest::StatusCode::NOT_FOUND, Some(id)) = (status, workitem_id) {
            return Err(AutomationApiError::NotFound(id.to_string()));
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(AutomationApiError::ApiError {
            status: status.as_u16(),
            body,
        })
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        workitem_id: Option<&str>,
    ) -> Result<T, AutomationApiError> {
        let response = Self::ensure_success(response, workitem_id).await?;
        Ok(response.json::<T>().await?)
    }
}
