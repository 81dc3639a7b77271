//! SmartBI HTTP client

pub mod auth;
pub mod envelope;
pub mod error;
pub mod interceptor;

use envelope::ApiResponse;
use error::ClientError;
use interceptor::{
    BearerAuth, EnvelopeNormalizer, FailureTranslator, RequestInterceptor, TransportFailure,
    bearer_token,
};
use reqwest::{Client, ClientBuilder, Method, Request};
use serde::Serialize;
use serde_json::Value;
use smartbi_core::guard::DEFAULT_LOGIN_PATH;
use smartbi_core::{
    ClientConfig, MemoryTokenStore, Navigator, Notifier, TokenStore, TracingNotifier,
};
use std::sync::Arc;
use std::time::Duration;

/// SmartBI API client
///
/// Every call runs the same pipeline: outbound interceptors (bearer token
/// first), transport, then envelope normalization or failure translation.
#[derive(Clone)]
pub struct SmartBiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    request_stages: Arc<[Arc<dyn RequestInterceptor>]>,
    normalizer: Arc<EnvelopeNormalizer>,
    failures: Arc<FailureTranslator>,
}

impl SmartBiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> SmartBiClientBuilder {
        SmartBiClientBuilder::default()
    }

    /// Build a client from loaded configuration and host-provided seams
    pub fn from_config(
        config: &ClientConfig,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        Self::builder()
            .base_url(&config.base_url)
            .timeout(config.timeout())
            .login_path(&config.login_path)
            .token_store(tokens)
            .notifier(notifier)
            .navigator(navigator)
            .build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Create a request builder for a path under the base URL.
    ///
    /// Authentication is attached when the request is executed, so the
    /// token read is always the most recent one.
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Run the outbound stages in order
    pub fn prepare(&self, request: Request) -> Result<Request, ClientError> {
        self.request_stages
            .iter()
            .try_fold(request, |request, stage| stage.intercept(request))
            .inspect_err(|e| warn!(error = %e, "Request interceptor failed"))
    }

    /// Execute a request through the pipeline
    pub async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse, ClientError> {
        let request = request
            .build()
            .map_err(|e| ClientError::Preparation(e.to_string()))?;
        let request = self.prepare(request)?;
        let sent = bearer_token(&request);

        debug!(
            method = %request.method(),
            url = %request.url(),
            authenticated = sent.is_some(),
            "Sending request"
        );

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let failure = TransportFailure::from_error(&e);
                return Err(self.failures.translate(failure, sent.as_ref()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<Value>(&text).ok();
            debug!(%status, "Error response");
            let failure = TransportFailure::from_status(status, body);
            return Err(self.failures.translate(failure, sent.as_ref()));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                let failure = TransportFailure::from_error(&e);
                return Err(self.failures.translate(failure, sent.as_ref()));
            }
        };
        let body = serde_json::from_slice::<Value>(&bytes).unwrap_or(Value::Null);
        debug!(%status, body = %body, "API response");
        self.normalizer.normalize(body)
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        let request = self.request(Method::GET, path);
        self.execute(request).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.request(Method::POST, path).json(body);
        self.execute(request).await
    }
}

/// Builder for SmartBiClient
#[derive(Default)]
pub struct SmartBiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    login_path: Option<String>,
    tokens: Option<Arc<dyn TokenStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl SmartBiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Route the 401 redirect goes to
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Set the session token store (in-memory by default)
    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the notification sink (tracing by default)
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set the navigator used for the 401 redirect
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Append an outbound stage, run after bearer authentication
    pub fn interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SmartBiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url:?}: {e}")))?;

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        #[cfg(target_arch = "wasm32")]
        let _ = self.timeout; // Timeouts not supported on WASM

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("smartbi-client/", env!("CARGO_PKG_VERSION")).to_string());
        client_builder = client_builder.user_agent(user_agent);

        let client = client_builder
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let tokens = self
            .tokens
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LogNavigator));
        let login_path = self
            .login_path
            .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string());

        let mut request_stages: Vec<Arc<dyn RequestInterceptor>> =
            vec![Arc::new(BearerAuth::new(tokens.clone()))];
        request_stages.extend(self.interceptors);

        Ok(SmartBiClient {
            client,
            base_url,
            request_stages: request_stages.into(),
            normalizer: Arc::new(EnvelopeNormalizer::new(notifier.clone())),
            failures: Arc::new(FailureTranslator::new(
                tokens.clone(),
                notifier,
                navigator,
                login_path,
            )),
            tokens,
        })
    }
}

/// Navigator for hosts without a router: records the request in the log
struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        info!(path, "Navigation requested");
    }
}
