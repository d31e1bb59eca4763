//! UI-boundary adapter: turns a failed call into what the screen shows.

use crate::error::ApiError;

/// Screens the client can ask the UI to navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
}

/// A toast message plus an optional navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub route: Option<Route>,
}

impl From<&ApiError> for Notice {
    fn from(err: &ApiError) -> Self {
        Notice {
            message: err.user_message().to_string(),
            route: err.requires_login().then_some(Route::Login),
        }
    }
}
