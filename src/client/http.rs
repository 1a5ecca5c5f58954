//! # Resilient Request Layer
//!
//! A drop-in replacement for a plain HTTP fetch with the behaviors every
//! catalog call needs:
//!
//! - **Bearer attach**: an explicitly passed token wins, else the stored
//!   access token is used
//! - **Uploads bypass**: static asset paths skip caching, offline fallback
//!   and refresh logic entirely
//! - **Offline fallback**: when the device is offline, GETs to the two
//!   cacheable list endpoints (personal cards, global cards) are served
//!   from the last cached successful body as a synthetic 200; everything
//!   else fails with a no-connection error
//! - **Single refresh retry**: a 401 triggers at most one token refresh
//!   and one retried request; a second 401 is returned to the caller
//! - **Write-through caching**: successful list responses overwrite the
//!   per-family cache key
//!
//! Bodies are described by [`RequestBody`] rather than built eagerly so the
//! 401 retry can rebuild the request, multipart parts included.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::client::auth::TokenStore;
use crate::client::storage::{keys, KeyValueStore};
use crate::shared::config::{Endpoints, UPLOADS_PATH};
use crate::shared::error::{Result, SyncError};

/// Network timeout applied to every request
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Cacheable endpoint families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheFamily {
    /// Personal cards list (`/api/cards`)
    Personal,
    /// Global cards list (`/api/global/cards`)
    Global,
}

impl CacheFamily {
    fn cache_key(self) -> &'static str {
        match self {
            CacheFamily::Personal => keys::CARDS_CACHE,
            CacheFamily::Global => keys::GLOBAL_CACHE,
        }
    }
}

/// Match a URL against the cacheable list endpoints.
///
/// Exact path match, query ignored, so the manifest/changes/by-id
/// sub-resources of the global family never pollute the list cache.
fn endpoint_family(url: &str) -> Option<CacheFamily> {
    let path = url.split('?').next().unwrap_or(url);
    let path = path.trim_end_matches('/');
    if path.ends_with("/api/global/cards") {
        Some(CacheFamily::Global)
    } else if path.ends_with("/api/cards") {
        Some(CacheFamily::Personal)
    } else {
        None
    }
}

/// Whether a URL points at static uploads
fn is_uploads(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or(url);
    path.contains(UPLOADS_PATH)
}

/// One multipart form field
#[derive(Debug, Clone)]
pub enum FormField {
    /// Plain text field
    Text { name: String, value: String },
    /// File field read from a device-local path at send time
    File {
        name: String,
        path: std::path::PathBuf,
        file_name: String,
        mime: String,
    },
}

/// Request body description, re-materializable for the 401 retry
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<FormField>),
}

/// Options for a single request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Explicit bearer token; wins over the stored access token
    pub bearer: Option<String>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestOptions {
    /// New options for the given method
    pub fn new(method: Method) -> Self {
        Self {
            method,
            bearer: None,
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Attach an explicit bearer token
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Append a query parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Set a multipart form body
    pub fn form(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }
}

/// Buffered HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client with offline fallback, token refresh and response caching.
#[derive(Debug)]
pub struct ResilientClient<S> {
    http: reqwest::Client,
    store: Arc<S>,
    tokens: TokenStore<S>,
    connectivity: watch::Receiver<bool>,
    endpoints: Endpoints,
}

impl<S> Clone for ResilientClient<S> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            store: Arc::clone(&self.store),
            tokens: self.tokens.clone(),
            connectivity: self.connectivity.clone(),
            endpoints: self.endpoints.clone(),
        }
    }
}

impl<S: KeyValueStore> ResilientClient<S> {
    /// Build a client over the given storage, endpoints and connectivity
    /// signal
    pub fn new(
        store: Arc<S>,
        endpoints: Endpoints,
        connectivity: watch::Receiver<bool>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let tokens = TokenStore::new(Arc::clone(&store), http.clone(), endpoints.clone());
        Ok(Self {
            http,
            store,
            tokens,
            connectivity,
            endpoints,
        })
    }

    /// Token store backing this client
    pub fn tokens(&self) -> &TokenStore<S> {
        &self.tokens
    }

    /// Endpoint table backing this client
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Whether the device currently reports connectivity
    pub fn is_online(&self) -> bool {
        *self.connectivity.borrow()
    }

    /// Issue a request with the resilient pipeline applied
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        // Static assets go straight out, with only an explicitly passed
        // token attached.
        if is_uploads(url) {
            return self.execute(url, &options, options.bearer.as_deref()).await;
        }

        let bearer = match &options.bearer {
            Some(token) => Some(token.clone()),
            None => self.tokens.access_token().await?,
        };

        let family = endpoint_family(url);
        let cacheable = family.is_some() && options.method == Method::GET;

        if !self.is_online() {
            if cacheable {
                if let Some(family) = family {
                    if let Some(cached) = self.store.get(family.cache_key()).await? {
                        tracing::debug!(url, "offline, serving cached response");
                        return Ok(HttpResponse {
                            status: StatusCode::OK,
                            body: cached,
                        });
                    }
                }
            }
            return Err(SyncError::NoConnection);
        }

        let mut response = self.execute(url, &options, bearer.as_deref()).await?;

        // One refresh attempt per call, never more.
        if response.status == StatusCode::UNAUTHORIZED {
            tracing::debug!(url, "401 received, attempting token refresh");
            if let Some(new_token) = self.tokens.refresh_access_token().await? {
                response = self.execute(url, &options, Some(&new_token)).await?;
            }
        }

        if response.ok() && cacheable {
            if let Some(family) = family {
                self.store.set(family.cache_key(), &response.body).await?;
            }
        }

        Ok(response)
    }

    /// GET a URL and parse the JSON body, mapping non-2xx to an
    /// unexpected-status error
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &'static str,
    ) -> Result<T> {
        let response = self.request(url, RequestOptions::get()).await?;
        if !response.ok() {
            return Err(SyncError::status(
                context,
                response.status.as_u16(),
                response.body,
            ));
        }
        response.json()
    }

    /// Build and send one request attempt
    async fn execute(
        &self,
        url: &str,
        options: &RequestOptions,
        bearer: Option<&str>,
    ) -> Result<HttpResponse> {
        let mut request = self.http.request(options.method.clone(), url);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        request = match &options.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Form(fields) => request.multipart(build_form(fields).await?),
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Materialize a multipart form, reading file fields from disk
async fn build_form(fields: &[FormField]) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name.clone(), value.clone()),
            FormField::File {
                name,
                path,
                file_name,
                mime,
            } => {
                let bytes = tokio::fs::read(path).await?;
                let part = reqwest::multipart::Part::bytes(bytes)
                    .file_name(file_name.clone())
                    .mime_str(mime)?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_family_exact_paths() {
        assert_eq!(
            endpoint_family("https://h/api/cards"),
            Some(CacheFamily::Personal)
        );
        assert_eq!(
            endpoint_family("https://h/api/cards?section=food&page=1"),
            Some(CacheFamily::Personal)
        );
        assert_eq!(
            endpoint_family("https://h/api/global/cards"),
            Some(CacheFamily::Global)
        );
        // Sub-resources of the global family are not list endpoints
        assert_eq!(endpoint_family("https://h/api/global/cards/manifest"), None);
        assert_eq!(endpoint_family("https://h/api/global/cards/changes?since=x"), None);
        assert_eq!(endpoint_family("https://h/api/global/cards/abc123"), None);
        // Mutating a single card is not the list either
        assert_eq!(endpoint_family("https://h/api/cards/abc123"), None);
    }

    #[test]
    fn test_is_uploads() {
        assert!(is_uploads("https://h/uploads/a.jpg"));
        assert!(!is_uploads("https://h/api/cards"));
    }

    #[test]
    fn test_request_options_builders() {
        let options = RequestOptions::post()
            .bearer("tok")
            .query("page", "1")
            .json(serde_json::json!({"a": 1}));
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.bearer.as_deref(), Some("tok"));
        assert_eq!(options.query, vec![("page".to_string(), "1".to_string())]);
        assert!(matches!(options.body, RequestBody::Json(_)));
    }
}
