//! Domain DTOs for the expense API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Wire names are camelCase. Integration tests catch any schema drift between
//! the two crates.

use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// One-time authorization code issued by the host platform.
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Payload of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub openid: String,
    #[serde(default)]
    pub user_info: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshResponse {
    pub token: String,
}

/// Display-only profile cached in session storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Overlay the fields present in `update` onto `self`.
    pub fn merge(&mut self, update: &UpdateProfile) {
        if let Some(nick_name) = update.nick_name.as_ref().filter(|s| !s.is_empty()) {
            self.nick_name = Some(nick_name.clone());
        }
        if let Some(avatar_url) = update.avatar_url.as_ref().filter(|s| !s.is_empty()) {
            self.avatar_url = Some(avatar_url.clone());
        }
    }
}

/// Partial profile update. Omitted or empty fields leave the cached value
/// unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Body of `POST /expense`. The server extracts amount and category from the
/// free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpense {
    pub raw_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A single recorded expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    /// ISO-8601 timestamp or date; the first ten characters are the day.
    pub date: String,
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total_amount: f64,
}

/// Payload of `GET /expense/range`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRange {
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub summary: ExpenseSummary,
}

/// Payload of `GET /static`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyStatistics {
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

/// Ordering for `GET /expense/list`. `Asc` and `Desc` sort by amount; the
/// default leaves ordering to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Default,
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_query(self) -> &'static str {
        match self {
            SortOrder::Default => "",
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_omits_absent_fields() {
        let req = LoginRequest {
            code: "abc".to_string(),
            nick_name: Some("Wei".to_string()),
            avatar_url: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"code": "abc", "nickName": "Wei"}));
    }

    #[test]
    fn expense_range_tolerates_missing_summary() {
        let range: ExpenseRange = serde_json::from_str(
            r#"{"expenses":[{"id":"1","description":"lunch","amount":32.5,"date":"2025-09-11T04:00:00.000Z"}]}"#,
        )
        .unwrap();
        assert_eq!(range.expenses.len(), 1);
        assert!(range.expenses[0].category.is_none());
        assert_eq!(range.summary.total_amount, 0.0);
    }

    #[test]
    fn merge_skips_empty_fields() {
        let mut profile = UserProfile {
            openid: Some("o-1".to_string()),
            nick_name: Some("old".to_string()),
            avatar_url: Some("http://a/1.png".to_string()),
        };
        profile.merge(&UpdateProfile {
            nick_name: Some("new".to_string()),
            avatar_url: Some(String::new()),
        });
        assert_eq!(profile.nick_name.as_deref(), Some("new"));
        assert_eq!(profile.avatar_url.as_deref(), Some("http://a/1.png"));
        assert_eq!(profile.openid.as_deref(), Some("o-1"));
    }

    #[test]
    fn sort_order_query_values() {
        assert_eq!(SortOrder::default().as_query(), "");
        assert_eq!(SortOrder::Desc.as_query(), "desc");
    }
}
