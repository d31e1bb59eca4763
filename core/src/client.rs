//! Authenticated request client.
//!
//! # Design
//! `ApiClient` composes the pure steps (`build_request`, `interpret`) with a
//! `Transport` and a `Session`. The token is read from the session on every
//! call and never held in memory.
//!
//! An expired token triggers one refresh and one replay of the original
//! request, never more. Refreshes are single-flight: the refresh guard is
//! held across the `/auth/refresh` round-trip, and a caller that acquires it
//! after someone else already rotated the token reuses the new one instead
//! of refreshing again.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::request::{build_request, RequestDescriptor};
use crate::response::{interpret, Outcome};
use crate::session::Session;
use crate::transport::Transport;
use crate::types::{RefreshRequest, RefreshResponse};

pub const REFRESH_PATH: &str = "/auth/refresh";

pub struct ApiClient<T: Transport> {
    config: ClientConfig,
    session: Session,
    transport: T,
    refresh_guard: Mutex<()>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(config: ClientConfig, session: Session, transport: T) -> Self {
        Self {
            config,
            session,
            transport,
            refresh_guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Issue `descriptor` and deserialize the envelope's `data` into `R`.
    pub async fn call<R: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<R, ApiError> {
        let data = self.call_value(descriptor).await?;
        serde_json::from_value(data).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Issue `descriptor` and return the envelope's raw `data`.
    pub async fn call_value(&self, descriptor: &RequestDescriptor) -> Result<Value, ApiError> {
        let token = self.session.token();
        let sent = token.as_deref();
        match self.dispatch(descriptor, sent).await? {
            Outcome::Data(data) => Ok(data),
            Outcome::Refresh => self.refresh_and_retry(descriptor, sent).await,
            // The token this request carried was replaced while it was in
            // flight; the rejection says nothing about the current one.
            Outcome::Fail(ApiError::SessionExpired { .. }) if self.rotated_since(sent) => {
                debug!(path = %descriptor.path, "Rejected token already rotated, replaying");
                self.refresh_and_retry(descriptor, sent).await
            }
            Outcome::Fail(err) => Err(self.settle(err, sent)),
        }
    }

    /// Exchange the stored token for a new one.
    pub async fn refresh_token(&self) -> Result<String, ApiError> {
        let current = self.session.token();
        self.fresh_token(current.as_deref()).await
    }

    async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&str>,
    ) -> Result<Outcome, ApiError> {
        let request = build_request(&self.config, descriptor, token)?;
        debug!(
            method = %request.method,
            url = %request.url,
            authenticated = token.is_some(),
            "Dispatching request"
        );

        let response = self.transport.execute(request).await.map_err(|e| {
            warn!(path = %descriptor.path, error = %e, "Transport failure");
            ApiError::Network(e.to_string())
        })?;

        debug!(path = %descriptor.path, status = response.status, "Received response");
        Ok(interpret(&response))
    }

    /// Replay `descriptor` once with a refreshed token. A second auth
    /// failure ends the session instead of refreshing again.
    async fn refresh_and_retry(
        &self,
        descriptor: &RequestDescriptor,
        stale: Option<&str>,
    ) -> Result<Value, ApiError> {
        let token = self.fresh_token(stale).await?;

        match self.dispatch(descriptor, Some(&token)).await? {
            Outcome::Data(data) => Ok(data),
            Outcome::Refresh => {
                self.end_session(Some(&token));
                Err(ApiError::SessionExpired { message: None })
            }
            Outcome::Fail(err) => Err(self.settle(err, Some(&token))),
        }
    }

    /// A token newer than `stale`, refreshing only if nobody else has.
    async fn fresh_token(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.refresh_guard.lock().await;

        let Some(current) = self.session.token() else {
            // A stale token that vanished means a concurrent refresh failed.
            return Err(match stale {
                Some(_) => ApiError::SessionExpired { message: None },
                None => ApiError::NotAuthenticated,
            });
        };
        if stale != Some(current.as_str()) {
            debug!("Token already rotated, reusing");
            return Ok(current);
        }

        match self.exchange(&current).await {
            Ok(token) => {
                self.session.set_token(&token);
                info!("Session token refreshed");
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.end_session(Some(&current));
                Err(ApiError::SessionExpired { message: None })
            }
        }
    }

    async fn exchange(&self, token: &str) -> Result<String, ApiError> {
        let descriptor = RequestDescriptor::post(
            REFRESH_PATH,
            &RefreshRequest {
                token: token.to_string(),
            },
        )?;

        let data = match self.dispatch(&descriptor, None).await? {
            Outcome::Data(data) => data,
            Outcome::Refresh => return Err(ApiError::SessionExpired { message: None }),
            Outcome::Fail(err) => return Err(err),
        };
        let refreshed: RefreshResponse =
            serde_json::from_value(data).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        if refreshed.token.is_empty() {
            return Err(ApiError::Deserialization("refresh returned an empty token".to_string()));
        }
        Ok(refreshed.token)
    }

    /// Whether the stored token differs from the one `sent` with a request.
    fn rotated_since(&self, sent: Option<&str>) -> bool {
        matches!(self.session.token(), Some(current) if Some(current.as_str()) != sent)
    }

    /// Clear the session, unless it moved past `sent` in the meantime.
    fn end_session(&self, sent: Option<&str>) {
        if self.session.token().as_deref() == sent {
            warn!("Server rejected session, clearing");
            self.session.clear();
        } else {
            debug!("Rejected token already replaced, keeping session");
        }
    }

    /// Apply the session side effect of a terminal failure of a request
    /// sent with `sent`.
    fn settle(&self, err: ApiError, sent: Option<&str>) -> ApiError {
        if let ApiError::SessionExpired { .. } = err {
            self.end_session(sent);
        }
        err
    }
}
