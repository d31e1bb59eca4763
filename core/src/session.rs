//! Session context over a `Storage`.
//!
//! The client and the UI read login state through `Session` instead of
//! touching storage keys directly. Nothing is cached in memory: every read
//! goes to storage, so concurrent calls always see the current token.

use std::sync::Arc;

use tracing::warn;

use crate::storage::Storage;
use crate::types::UserProfile;

pub const TOKEN_KEY: &str = "token";
pub const PROFILE_KEY: &str = "userInfo";

#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn Storage>,
}

impl Session {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The stored bearer token. Empty strings count as absent.
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn set_token(&self, token: &str) {
        self.storage.set(TOKEN_KEY, token.to_string());
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    /// The cached profile. A corrupt entry reads as absent.
    pub fn profile(&self) -> Option<UserProfile> {
        let raw = self.storage.get(PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cached profile");
                None
            }
        }
    }

    pub fn set_profile(&self, profile: &UserProfile) {
        match serde_json::to_string(profile) {
            Ok(raw) => self.storage.set(PROFILE_KEY, raw),
            Err(e) => warn!(error = %e, "Failed to cache profile"),
        }
    }

    /// Drop the token and the cached profile.
    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(PROFILE_KEY);
    }
}
