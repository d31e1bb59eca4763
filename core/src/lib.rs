//! Authenticated API client for the expense-tracking service.
//!
//! # Overview
//! Builds JSON requests with a bearer token from the session, interprets the
//! `{code, message, data}` business envelope, and refreshes an expired token
//! once before replaying the original call.
//!
//! # Design
//! - The pure steps (`request::build_request`, `response::interpret`) never
//!   touch the network; a `Transport` executes each `HttpRequest`.
//! - `Session` owns login state over a host `Storage`; nothing caches the
//!   token in memory.
//! - Failures are typed `ApiError`s. Mapping them to toasts and navigation is
//!   the UI's job (`notice::Notice`).
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod ledger;
pub mod notice;
pub mod request;
pub mod response;
pub mod session;
pub mod storage;
pub mod transport;
pub mod types;

pub use api::ListPeriod;
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError, Environment};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notice::{Notice, Route};
pub use request::RequestDescriptor;
pub use response::{Outcome, ResponseCode};
pub use session::Session;
pub use storage::{MemoryStorage, Storage};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    Category, Expense, ExpenseRange, ExpenseSummary, LoginRequest, LoginResponse, MonthlyStatistics,
    SortOrder, UpdateProfile, UserProfile,
};
