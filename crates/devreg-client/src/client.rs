//! Registration API client implementation.

use crate::api::DeviceApi;
use async_trait::async_trait;
use devreg_core::{
    ApiError, ApiResponse, ApiResult, DeviceId, DeviceIdentity, Registrar, RegistrationRequest,
    RenameRequest,
};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Production backend base URL
pub const DEFAULT_BASE_URL: &str = "https://api.cacophony.org.nz";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the fleet-management backend
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client for `base_url` using default settings
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        ApiClientBuilder::new(base_url).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    /// Access device registration endpoints
    #[must_use]
    pub fn devices(&self) -> DeviceApi<'_> {
        DeviceApi::new(self)
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Perform a POST request with JSON body
    pub(crate) async fn post<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> ApiResult<ApiResponse> {
        let url = self.build_url(path);
        debug!(url = %url, authenticated = token.is_some(), "POST request");

        let mut request = self.inner.http.post(&url).json(body);
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }

        let response = request.send().await.map_err(|e| self.map_transport(&e))?;
        self.handle_response(response).await
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    fn map_transport(&self, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.inner.timeout.as_secs())
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }

    /// Decode a response envelope, turning `success: false` into an error
    async fn handle_response(&self, response: reqwest::Response) -> ApiResult<ApiResponse> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::error_for(status.as_u16(), body));
        }

        let envelope: ApiResponse = serde_json::from_str(&body)?;
        if envelope.success {
            Ok(envelope)
        } else {
            let message = envelope.joined_messages();
            warn!(message = %message, "backend rejected request");
            Err(ApiError::Rejected { message })
        }
    }

    /// Convert an error response to an `ApiError`
    fn error_for(status: u16, body: String) -> ApiError {
        // Prefer the backend's own explanation when the body is JSON
        let message = serde_json::from_str::<ApiResponse>(&body)
            .ok()
            .map(|r| r.joined_messages())
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        match status {
            401 | 403 => ApiError::Unauthorized,
            _ => ApiError::Api {
                code: status,
                message,
            },
        }
    }
}

#[async_trait]
impl Registrar for ApiClient {
    async fn register(&self, request: &RegistrationRequest) -> ApiResult<DeviceId> {
        self.devices().register(request).await
    }

    async fn rename(&self, current: &DeviceIdentity, update: &RenameRequest) -> ApiResult<()> {
        let token = self
            .devices()
            .authenticate(current.id, &current.secret)
            .await?;
        self.devices().reregister(&token, update).await
    }

    fn server(&self) -> &str {
        self.base_url()
    }
}

/// Builder for configuring an [`ApiClient`]
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl ApiClientBuilder {
    /// Create a new builder targeting `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("device-register/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client, validating the base URL
    pub fn build(self) -> ApiResult<ApiClient> {
        let base_url = normalize_base_url(&self.base_url)?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}

/// Require an absolute http(s) URL and strip any trailing slash
pub(crate) fn normalize_base_url(raw: &str) -> ApiResult<String> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::InvalidUrl(format!(
            "{raw}: expected an http or https URL"
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
