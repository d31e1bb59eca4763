//! The network seam.
//!
//! `Transport` is the only place an `HttpRequest` becomes real I/O. Hosts
//! plug in their own primitive; `UreqTransport` is the bundled one.

use std::future::Future;

use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// No response was obtained for a request.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Executes an `HttpRequest` and returns whatever the server answered.
///
/// Non-2xx statuses are responses, not errors: only a missing response
/// (connect, DNS, timeout, broken body) is a `TransportError`.
pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Blocking ureq client run on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tokio::task::spawn_blocking(move || execute_blocking(request))
            .await
            .map_err(|e| TransportError(format!("transport task failed: {e}")))?
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Disables ureq's status-as-error behavior so 4xx/5xx come back as data and
/// status interpretation stays with the client.
fn execute_blocking(req: HttpRequest) -> Result<HttpResponse, TransportError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(req.timeout))
        .build()
        .new_agent();

    let url = req.url.as_str();
    let headers = req.headers.as_slice();
    let result = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => with_headers(agent.get(url), headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(url), headers).call(),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(url), headers).send(body.as_bytes()),
        (HttpMethod::Post, None) => with_headers(agent.post(url), headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), headers).send(body.as_bytes()),
        (HttpMethod::Put, None) => with_headers(agent.put(url), headers).send_empty(),
    };
    let mut response = result.map_err(|e| TransportError(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| TransportError(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
