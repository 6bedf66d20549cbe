//! REST implementation of the product data client.

use async_trait::async_trait;
use catalog_core::{NewProduct, Product, ProductId, ProductPatch};
use reqwest::{Client, Method, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::api::ProductApi;
use crate::cache::{DEFAULT_CACHE_TTL, ResponseCache};
use crate::error::FetchError;
use crate::retry::RetryStrategy;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for the catalog client.
const USER_AGENT: &str = concat!("catalog/", env!("CARGO_PKG_VERSION"));

/// Longest plain-text body used verbatim as an error message.
const MAX_TEXT_MESSAGE_LEN: usize = 200;

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`RestProductClient`].
#[derive(Debug, Clone)]
pub struct RestProductClientBuilder {
    base_url: String,
    timeout: Duration,
    retry_strategy: RetryStrategy,
    cache_ttl: Duration,
    bearer_token: Option<String>,
}

impl Default for RestProductClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_strategy: RetryStrategy::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            bearer_token: None,
        }
    }
}

impl RestProductClientBuilder {
    /// Sets the API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry strategy.
    #[must_use]
    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Sets the response cache TTL. Zero disables caching.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<RestProductClient, FetchError> {
        // A trailing slash keeps `Url::join` from replacing the last segment.
        let mut base = self.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(self.base_url));
        }

        let inner = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(RestProductClient {
            inner,
            base_url,
            timeout: self.timeout,
            retry_strategy: self.retry_strategy,
            cache: ResponseCache::new(self.cache_ttl),
            bearer_token: self.bearer_token,
        })
    }
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the `/products` resource with retries and a read cache.
#[derive(Debug)]
pub struct RestProductClient {
    inner: Client,
    base_url: Url,
    timeout: Duration,
    retry_strategy: RetryStrategy,
    cache: ResponseCache,
    bearer_token: Option<String>,
}

impl RestProductClient {
    /// Creates a client for the given base URL with default settings.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::builder().base_url(base_url).build()
    }

    /// Returns a builder.
    pub fn builder() -> RestProductClientBuilder {
        RestProductClientBuilder::default()
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn products_url(&self, id: Option<ProductId>) -> Result<Url, FetchError> {
        let path = match id {
            Some(id) => format!("products/{id}"),
            None => "products".to_string(),
        };
        Ok(self.base_url.join(&path)?)
    }

    /// Sends a request, retrying transient failures.
    ///
    /// Non-idempotent methods (`POST`) are only retried when the server
    /// cannot have acted on them.
    async fn send<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Response, FetchError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let max_attempts = self.retry_strategy.max_attempts;
        let idempotent = method.is_idempotent();
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(method = %method, url = %url, attempt = attempts, "Sending request");

            let mut request = self.inner.request(method.clone(), url.clone());
            if let Some(token) = &self.bearer_token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(status = %status, "Response received");

                    if status.is_success() {
                        return Ok(response);
                    }

                    if attempts < max_attempts && self.retry_strategy.should_retry_status(status) {
                        let delay = self
                            .retry_strategy
                            .delay_for_status(attempts, retry_after(&response));
                        warn!(status = %status, delay = ?delay, "Retryable status, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Err(error_from_response(response).await);
                }
                Err(e) => {
                    if attempts < max_attempts && self.retry_strategy.should_retry(&e, idempotent) {
                        let delay = self.retry_strategy.delay_for_attempt(attempts);
                        warn!(error = %e, delay = ?delay, "Request failed, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if e.is_timeout() {
                        return Err(FetchError::Timeout(self.timeout.as_secs()));
                    }
                    return Err(e.into());
                }
            }
        }
    }

    async fn send_json<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(method, url, body).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ProductApi for RestProductClient {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, FetchError> {
        if let Some(products) = self.cache.list().await {
            debug!(count = products.len(), "Product list served from cache");
            return Ok(products);
        }

        let url = self.products_url(None)?;
        let products: Vec<Product> = self.send_json(Method::GET, url, None::<&()>).await?;
        self.cache.store_list(&products).await;
        debug!(count = products.len(), "Fetched product list");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: ProductId) -> Result<Product, FetchError> {
        if let Some(product) = self.cache.item(id).await {
            debug!("Product served from cache");
            return Ok(product);
        }

        let url = self.products_url(Some(id))?;
        let response = self.send(Method::GET, url, None::<&()>).await?;
        let bytes = response.bytes().await?;
        // Some servers answer an unknown id with 200 and an empty body.
        if bytes.iter().all(u8::is_ascii_whitespace) || bytes.as_ref() == b"null" {
            return Err(FetchError::server(404, format!("Product {id} not found")));
        }
        let product: Product =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
        self.cache.store_item(&product).await;
        Ok(product)
    }

    #[instrument(skip(self, product), fields(title = %product.title))]
    async fn create(&self, product: &NewProduct) -> Result<Product, FetchError> {
        let url = self.products_url(None)?;
        let created: Product = self.send_json(Method::POST, url, Some(product)).await?;
        self.cache.evict(None).await;
        debug!(id = created.id, "Product created");
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, FetchError> {
        let url = self.products_url(Some(id))?;
        let updated: Product = self.send_json(Method::PUT, url, Some(patch)).await?;
        self.cache.evict(Some(id)).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> Result<(), FetchError> {
        let url = self.products_url(Some(id))?;
        self.send(Method::DELETE, url, None::<&()>).await?;
        self.cache.evict(Some(id)).await;
        Ok(())
    }

    async fn invalidate_cache(&self) {
        self.cache.clear().await;
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Converts a non-success response into an error carrying the best
/// available message: a JSON `message`/`error` field, a short text body,
/// or the status line.
async fn error_from_response(response: Response) -> FetchError {
    let status = response.status();
    let retry_after_secs = retry_after(&response).map(|d| d.as_secs());
    let body = response.text().await.unwrap_or_default();
    let message = extract_message(status, &body);

    match status {
        StatusCode::UNAUTHORIZED => FetchError::AuthenticationFailed(message),
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited {
            retry_after: retry_after_secs,
        },
        _ => FetchError::server(status.as_u16(), message),
    }
}

fn extract_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let field = ["message", "error", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(serde_json::Value::as_str));
        if let Some(message) = field.filter(|m| !m.trim().is_empty()) {
            return message.to_string();
        }
        if let Some(message) = value.as_str().filter(|m| !m.trim().is_empty()) {
            return message.to_string();
        }
    } else if !body.is_empty() && body.len() <= MAX_TEXT_MESSAGE_LEN && !body.starts_with('<') {
        return body.to_string();
    }

    format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_prefers_json_field() {
        let msg = extract_message(StatusCode::CONFLICT, r#"{"message":"duplicate title"}"#);
        assert_eq!(msg, "duplicate title");

        let msg = extract_message(StatusCode::BAD_REQUEST, r#"{"error":"bad price"}"#);
        assert_eq!(msg, "bad price");
    }

    #[test]
    fn test_extract_message_plain_text_and_fallback() {
        assert_eq!(
            extract_message(StatusCode::BAD_REQUEST, "price must be positive"),
            "price must be positive"
        );
        assert_eq!(
            extract_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "500 Internal Server Error"
        );
        assert_eq!(
            extract_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "502 Bad Gateway"
        );
    }

    #[test]
    fn test_base_url_join_keeps_prefix() {
        let client = RestProductClient::builder()
            .base_url("http://localhost:8080/api/v1")
            .build()
            .unwrap();
        assert_eq!(
            client.products_url(Some(5)).unwrap().as_str(),
            "http://localhost:8080/api/v1/products/5"
        );
        assert_eq!(
            client.products_url(None).unwrap().as_str(),
            "http://localhost:8080/api/v1/products"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = RestProductClient::builder().base_url("not a url").build();
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let builder = RestProductClient::builder().bearer_token(Some("  ".to_string()));
        assert!(builder.bearer_token.is_none());
    }
}
