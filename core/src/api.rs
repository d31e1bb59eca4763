//! Typed operations for the expense API.
//!
//! # Design
//! Each endpoint has a `build_*` function producing a `RequestDescriptor`
//! (pure, tested without I/O) and an `ApiClient` method that issues it and
//! applies any session bookkeeping: login and profile reads update the
//! cached profile.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::info;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::ledger;
use crate::request::RequestDescriptor;
use crate::transport::Transport;
use crate::types::{
    CreateExpense, Expense, ExpenseRange, LoginRequest, LoginResponse, MonthlyStatistics,
    SortOrder, UpdateProfile, UserProfile,
};

/// Period for `GET /expense/list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPeriod {
    Month { year: i32, month: u32 },
    /// Sent to the server as-is; results are also filtered to this day.
    Day(NaiveDate),
}

impl ListPeriod {
    fn as_query(self) -> Result<String, ApiError> {
        match self {
            ListPeriod::Month { year, month } => {
                let (first, _) = ledger::month_bounds(year, month)?;
                Ok(ledger::month_key(first))
            }
            ListPeriod::Day(day) => Ok(day.format("%Y-%m-%d").to_string()),
        }
    }
}

pub fn build_login(input: &LoginRequest) -> Result<RequestDescriptor, ApiError> {
    RequestDescriptor::post("/auth/login", input)
}

pub fn build_get_user_info() -> RequestDescriptor {
    RequestDescriptor::get("/user/info")
}

pub fn build_update_user_info(profile: &UserProfile) -> Result<RequestDescriptor, ApiError> {
    RequestDescriptor::put("/user/info", profile)
}

pub fn build_create_expense(raw_text: &str) -> Result<RequestDescriptor, ApiError> {
    RequestDescriptor::post(
        "/expense",
        &CreateExpense {
            raw_text: raw_text.to_string(),
        },
    )
}

pub fn build_expense_range(start: NaiveDate, end: NaiveDate) -> RequestDescriptor {
    RequestDescriptor::get(format!(
        "/expense/range?startDate={}&endDate={}",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    ))
}

pub fn build_list_expenses(period: ListPeriod, sort: SortOrder) -> Result<RequestDescriptor, ApiError> {
    Ok(RequestDescriptor::get(format!(
        "/expense/list?month={}&sort={}",
        period.as_query()?,
        sort.as_query()
    )))
}

pub fn build_monthly_statistics(year: i32, month: u32) -> Result<RequestDescriptor, ApiError> {
    let (first, _) = ledger::month_bounds(year, month)?;
    Ok(RequestDescriptor::get(format!("/static?month={}", ledger::month_key(first))))
}

impl<T: Transport> ApiClient<T> {
    /// Exchange a platform authorization code for a session and cache the
    /// resulting profile.
    pub async fn login(&self, input: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self.call(&build_login(input)?).await?;
        if response.token.is_empty() {
            return Err(ApiError::Deserialization("login returned an empty token".to_string()));
        }

        let mut profile = UserProfile {
            openid: Some(response.openid.clone()),
            nick_name: input.nick_name.clone(),
            avatar_url: input.avatar_url.clone(),
        };
        // Server-side values win over what the login form sent.
        if let Some(returned) = &response.user_info {
            profile.merge(&UpdateProfile {
                nick_name: returned.nick_name.clone(),
                avatar_url: returned.avatar_url.clone(),
            });
            if returned.openid.is_some() {
                profile.openid = returned.openid.clone();
            }
        }

        self.session().set_token(&response.token);
        self.session().set_profile(&profile);
        info!(openid = %response.openid, "Logged in");
        Ok(response)
    }

    /// Forget the local session. The server is not contacted.
    pub fn logout(&self) {
        self.session().clear();
        info!("Logged out");
    }

    pub async fn user_info(&self) -> Result<UserProfile, ApiError> {
        let profile: UserProfile = self.call(&build_get_user_info()).await?;
        self.session().set_profile(&profile);
        Ok(profile)
    }

    /// Merge `update` into the cached profile, send the result, and cache it
    /// once the server accepts it.
    pub async fn update_user_info(&self, update: &UpdateProfile) -> Result<UserProfile, ApiError> {
        let mut profile = self.session().profile().unwrap_or_default();
        profile.merge(update);
        self.call_value(&build_update_user_info(&profile)?).await?;
        self.session().set_profile(&profile);
        Ok(profile)
    }

    /// Record an expense from free text; the server extracts the fields.
    pub async fn create_expense(&self, raw_text: &str) -> Result<Expense, ApiError> {
        if raw_text.trim().is_empty() {
            return Err(ApiError::InvalidRequest("expense text is empty".to_string()));
        }
        self.call(&build_create_expense(raw_text)?).await
    }

    pub async fn expenses_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<ExpenseRange, ApiError> {
        self.call(&build_expense_range(start, end)).await
    }

    pub async fn expenses_on(&self, day: NaiveDate) -> Result<ExpenseRange, ApiError> {
        self.expenses_in_range(day, day).await
    }

    pub async fn list_expenses(&self, period: ListPeriod, sort: SortOrder) -> Result<Vec<Expense>, ApiError> {
        let expenses: Option<Vec<Expense>> = self.call(&build_list_expenses(period, sort)?).await?;
        let expenses = expenses.unwrap_or_default();
        Ok(match period {
            ListPeriod::Day(day) => ledger::on_day(expenses, day),
            ListPeriod::Month { .. } => expenses,
        })
    }

    pub async fn monthly_statistics(&self, year: i32, month: u32) -> Result<MonthlyStatistics, ApiError> {
        self.call(&build_monthly_statistics(year, month)?).await
    }

    /// Per-day totals for every day with spending in the month.
    pub async fn month_daily_totals(&self, year: i32, month: u32) -> Result<BTreeMap<NaiveDate, f64>, ApiError> {
        let (first, last) = ledger::month_bounds(year, month)?;
        let range = self.expenses_in_range(first, last).await?;
        Ok(ledger::daily_totals(&range.expenses))
    }
}
