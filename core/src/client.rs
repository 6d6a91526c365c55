//! Shared API client: request construction and dispatch.
//!
//! # Design
//! `Client` holds a `ClientConfig` and an injected `HttpExecutor` and carries
//! no mutable state between calls. Resource services such as
//! `BillingService` borrow it, compose path segments and a body, and hand the
//! request back to `send` / `send_empty`. Sharing one client across threads
//! is safe whenever the executor is.
//!
//! A 4xx/5xx answer is returned as data: the body is parsed into
//! `Response::errors` when it is an error document and no destination value
//! is decoded. Only a missing or undecodable response is an `ApiError`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::billing::BillingService;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{find_header, HttpExecutor, HttpMethod, HttpRequest};
use crate::types::{ErrorDetail, ErrorDocument};

/// Status and metadata of a completed round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Parsed error document, empty unless the status is 4xx/5xx.
    pub errors: Vec<ErrorDetail>,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Client for the billing API, bound to one executor.
#[derive(Debug, Clone)]
pub struct Client<E> {
    config: ClientConfig,
    executor: E,
}

impl<E: HttpExecutor> Client<E> {
    pub fn new(config: ClientConfig, executor: E) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Billing info operations scoped to this client.
    pub fn billing(&self) -> BillingService<'_, E> {
        BillingService::new(self)
    }

    /// Build a request for the path made of `segments`, appended to the base
    /// URL.
    ///
    /// Each segment is percent-encoded on its own, so `/`, `?`, `#` and `%`
    /// inside a segment never change the resource addressed. Empty, `.` and
    /// `..` segments cannot be addressed and are rejected.
    ///
    /// `body`, when present, is serialized to JSON and sent with a
    /// `content-type: application/json` header.
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError> {
        let base = &self.config.base_url;
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::InvalidRequest(format!("unaddressable path segment {bad:?}")));
        }
        let mut url = Url::parse(base).map_err(|e| ApiError::InvalidRequest(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("{base}: not a hierarchical URL")))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("user-agent".to_string(), self.config.user_agent.clone()),
        ];
        if let Some(key) = &self.config.api_key {
            let credentials = STANDARD.encode(format!("{key}:"));
            headers.push(("authorization".to_string(), format!("Basic {credentials}")));
        }

        let body = match body {
            Some(value) => {
                let encoded =
                    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))?;
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(encoded)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            path: url.to_string(),
            headers,
            body,
        })
    }

    /// Execute `request` and decode a success body into `D`.
    ///
    /// Returns `None` for the destination when the status is 4xx/5xx or the
    /// body is empty.
    pub fn send<D: DeserializeOwned>(&self, request: &HttpRequest) -> Result<(Response, Option<D>), ApiError> {
        let (response, body) = self.dispatch(request)?;
        if response.is_error() || body.trim().is_empty() {
            return Ok((response, None));
        }
        match serde_json::from_str(&body) {
            Ok(dst) => Ok((response, Some(dst))),
            Err(e) => {
                warn!(status = response.status, path = %request.path, error = %e, "undecodable response body");
                Err(ApiError::Decode {
                    response: Box::new(response),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Execute `request` without decoding a destination.
    pub fn send_empty(&self, request: &HttpRequest) -> Result<Response, ApiError> {
        self.dispatch(request).map(|(response, _)| response)
    }

    fn dispatch(&self, request: &HttpRequest) -> Result<(Response, String), ApiError> {
        let raw = self.executor.execute(request).inspect_err(|e| {
            warn!(method = %request.method, path = %request.path, error = %e, "request failed");
        })?;
        debug!(method = %request.method, path = %request.path, status = raw.status, "request completed");

        let mut response = Response {
            status: raw.status,
            headers: raw.headers,
            errors: Vec::new(),
        };
        if response.is_error() && !raw.body.trim().is_empty() {
            match serde_json::from_str::<ErrorDocument>(&raw.body) {
                Ok(doc) => response.errors = doc.errors,
                Err(e) => {
                    warn!(status = response.status, error = %e, "error response is not an error document")
                }
            }
        }
        Ok((response, raw.body))
    }
}
