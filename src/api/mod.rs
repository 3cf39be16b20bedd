//! Client for the remote text analytics service.
//!
//! One `ApiClient` is built at startup and shared (behind an `Arc`) by every
//! pipeline invocation. It owns the connection pool, encodes request bodies,
//! decodes responses and classifies failures. It knows nothing about
//! documents or stages.

mod app_header;
mod config;
mod error;
mod request;
mod response;

pub use app_header::{default_app_header, resolve_app_header, APP_HEADER, KEY_HEADER};
pub use config::{ApiConfig, API_KEY_ENV, API_URL_ENV, DEFAULT_API_URL};
pub use error::ApiError;
pub use request::{
    DocumentRequest, NameTranslationRequest, Operation, UNSPECIFIED_LANGUAGE, UNSPECIFIED_SCRIPT,
};
pub use response::{
    ApiEntity, CategoriesResponse, EntitiesResponse, Label, LanguageDetection, LanguageResponse,
    MentionOffset, NameTranslationResponse, SentimentResponse,
};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{RwLock, Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};
use url::Url;

/// Pooled client for the text analytics API.
///
/// Safe for concurrent use: in-flight requests are bounded by
/// `max_connections` (a permit is held from send until the response body is
/// read) and idle connections by `max_connections_per_host`.
pub struct ApiClient {
    config: ApiConfig,
    base_url: Url,
    client: RwLock<Option<Client>>,
    permits: Semaphore,
}

impl ApiClient {
    /// Create a client from resolved configuration.
    ///
    /// Fails when no key is available for the public endpoint, the URL is
    /// invalid, or the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let base_url = config.base_url()?;
        let headers = default_headers(&config)?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(config.max_connections_per_host)
            .gzip(true)
            .build()
            .map_err(ApiError::Build)?;

        if !config.uses_default_url() {
            info!("Using alternative URL for text analytics API at: {}", base_url);
        }
        debug!(
            max_connections = config.max_connections,
            max_connections_per_host = config.max_connections_per_host,
            "API client ready"
        );

        Ok(Self {
            permits: Semaphore::new(config.max_connections),
            client: RwLock::new(Some(client)),
            base_url,
            config,
        })
    }

    /// Get the config.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Base URL all operation paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run a document-level operation and decode the response.
    pub async fn send_document_operation<T: DeserializeOwned>(
        &self,
        operation: Operation,
        content: &str,
        language: Option<&str>,
    ) -> Result<T, ApiError> {
        let body = DocumentRequest { content, language };
        self.post(operation, &body).await
    }

    /// Translate a name.
    pub async fn send_name_translation<T: DeserializeOwned>(
        &self,
        request: &NameTranslationRequest,
    ) -> Result<T, ApiError> {
        self.post(Operation::NameTranslation, request).await
    }

    /// Check that the service is reachable and accepts our credentials.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let operation = Operation::Ping;
        let client = self.transport().await;
        let url = self.endpoint(operation)?;
        let _permit = self.acquire().await;

        debug!("GET {}", url);
        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;

        let _: serde_json::Value = Self::decode(operation, resp).await?;
        Ok(())
    }

    /// Release the connection pool.
    ///
    /// Sending after `close` is a programming error and panics.
    pub async fn close(&self) {
        let mut client = self.client.write().await;
        if client.take().is_some() {
            self.permits.close();
            debug!("API client closed");
        }
    }

    /// Whether `close` has been called.
    pub async fn is_closed(&self) -> bool {
        self.client.read().await.is_none()
    }

    async fn post<B, T>(&self, operation: Operation, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let client = self.transport().await;
        let url = self.endpoint(operation)?;
        let _permit = self.acquire().await;

        debug!("POST {}", url);
        let resp = client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| {
                warn!("{} request could not be sent: {}", operation, source);
                ApiError::Transport { operation, source }
            })?;

        Self::decode(operation, resp).await
    }

    /// Read the body and classify the status.
    async fn decode<T: DeserializeOwned>(
        operation: Operation,
        resp: Response,
    ) -> Result<T, ApiError> {
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;

        if !status.is_success() {
            let err = ApiError::from_status(operation, status, &String::from_utf8_lossy(&body));
            warn!("{}", err);
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { operation, source })
    }

    async fn transport(&self) -> Client {
        match self.client.read().await.as_ref() {
            Some(client) => client.clone(),
            None => panic!("ApiClient used after close()"),
        }
    }

    async fn acquire(&self) -> SemaphorePermit<'_> {
        match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => panic!("ApiClient used after close()"),
        }
    }

    fn endpoint(&self, operation: Operation) -> Result<Url, ApiError> {
        self.base_url.join(operation.path()).map_err(|e| {
            ApiError::Config(format!(
                "cannot resolve `{}` against {}: {}",
                operation, self.base_url, e
            ))
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_connections", &self.config.max_connections)
            .finish_non_exhaustive()
    }
}

/// Headers attached to every request.
fn default_headers(config: &ApiConfig) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let app = resolve_app_header(config.app_header.as_deref());
    let app_value = HeaderValue::from_str(&app)
        .map_err(|e| ApiError::Config(format!("invalid application header `{}`: {}", app, e)))?;
    headers.insert(APP_HEADER, app_value);

    if let Some(key) = config.api_key() {
        let mut key_value = HeaderValue::from_str(key)
            .map_err(|_| ApiError::Config("API key contains invalid characters".to_string()))?;
        key_value.set_sensitive(true);
        headers.insert(KEY_HEADER, key_value);
    }

    Ok(headers)
}
