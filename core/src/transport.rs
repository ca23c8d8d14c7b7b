//! Base URL, default headers and executor bundled into one cloneable handle.
//!
//! # Design
//! Every resource service holds a `Transport`. Cloning one only bumps
//! reference counts, so all services built from a client share the same
//! configuration and executor.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

use crate::error::ApiError;
use crate::http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse};
use crate::types::QueryParams;

#[derive(Clone)]
pub struct Transport {
    base_url: Url,
    headers: Arc<[(String, String)]>,
    executor: Arc<dyn HttpExecutor>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // header values may carry credentials
        let names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("headers", &names)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Fails if `base_url` does not parse, is not hierarchical (`mailto:`,
    /// `data:`), or if any header name or value is not valid HTTP.
    pub fn new(
        base_url: &str,
        headers: Vec<(String, String)>,
        executor: Arc<dyn HttpExecutor>,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(format!("{base_url}: not a hierarchical url")));
        }
        for (name, value) in &headers {
            ureq::http::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
            ureq::http::HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
        }
        Ok(Self {
            base_url,
            headers: headers.into(),
            executor,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` (e.g. `users/abc`) below the base URL's own path.
    ///
    /// Each `/`-separated piece becomes one percent-encoded segment.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// `endpoint` resolved as by [`Transport::url`], followed by `id` as
    /// exactly one percent-encoded segment. A `/` inside `id` is encoded,
    /// never split.
    ///
    /// Empty, `.` and `..` ids would address the collection or a parent
    /// path, so they are rejected with [`ApiError::InvalidId`].
    pub fn record_url(&self, endpoint: &str, id: &str) -> Result<Url, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::InvalidId(id.to_string()));
        }
        let mut url = self.url(endpoint)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .push(id);
        Ok(url)
    }

    /// Like [`Transport::url`] with the encoded filter pairs of `params`
    /// as the query string. Params that set nothing leave no `?` behind.
    pub fn url_with_query<P: QueryParams + ?Sized>(&self, path: &str, params: &P) -> Result<Url, ApiError> {
        let mut url = self.url(path)?;
        let mut qp = form_urlencoded::Serializer::new(String::new());
        params.populate_qp(&mut qp);
        let query = qp.finish();
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        Ok(url)
    }

    /// A bodyless request carrying the default headers.
    pub fn request(&self, method: HttpMethod, url: Url) -> HttpRequest {
        HttpRequest {
            method,
            url: url.into(),
            headers: self.headers.to_vec(),
            body: None,
        }
    }

    /// A request with `body` encoded as JSON.
    pub fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: Url,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut request = self.request(method, url);
        request
            .headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case("content-type"));
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    /// Execute `request` once. Never retries.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.executor.execute(request).map_err(|err| {
            warn!(method = request.method.as_str(), url = %request.url, error = %err, "request failed");
            err
        })?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}
