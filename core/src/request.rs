//! Request descriptors and the pure build step.

use std::time::Duration;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

/// One API call, relative to the configured base URL. Built fresh per call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    /// Relative API path including any query string, e.g. `/user/info`.
    pub path: String,
    /// JSON body, serialized when the descriptor is built.
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Overrides `ClientConfig::timeout` for this call.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn post<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Self::new(HttpMethod::Post, path).with_json(body)
    }

    pub fn put<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Self::new(HttpMethod::Put, path).with_json(body)
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Turn a descriptor into a concrete request.
///
/// Headers are `content-type: application/json`, then the descriptor's
/// extras, then `authorization: Bearer <token>` iff `token` is present. A
/// token always replaces any authorization header the descriptor carried.
pub fn build_request(
    config: &ClientConfig,
    descriptor: &RequestDescriptor,
    token: Option<&str>,
) -> Result<HttpRequest, ApiError> {
    if !descriptor.path.starts_with('/') {
        return Err(ApiError::InvalidRequest(format!(
            "path must start with '/': {:?}",
            descriptor.path
        )));
    }

    let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
    headers.extend(
        descriptor
            .headers
            .iter()
            .filter(|(name, _)| name != "content-type")
            .filter(|(name, _)| token.is_none() || name != "authorization")
            .cloned(),
    );
    if let Some(token) = token {
        headers.push(("authorization".to_string(), format!("Bearer {token}")));
    }

    Ok(HttpRequest {
        method: descriptor.method,
        url: format!("{}{}", config.base_url(), descriptor.path),
        headers,
        body: descriptor.body.clone(),
        timeout: descriptor.timeout.unwrap_or(config.timeout),
    })
}
