use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const SUCCESS: i64 = 200;
pub const UNAUTHORIZED: i64 = 401;
pub const TOKEN_EXPIRED: i64 = 1001;
pub const INVALID_PARAMS: i64 = 1002;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    pub color: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub code: String,
    pub nick_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Deserialize)]
pub struct RefreshInput {
    pub token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpense {
    pub raw_text: String,
    /// Overrides the server clock; lets tests place expenses on fixed days.
    pub date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
    pub sort: Option<String>,
}

struct Session {
    openid: String,
    expired: bool,
}

/// Everything the mock API remembers, plus knobs and counters for tests.
#[derive(Default)]
pub struct Store {
    sessions: HashMap<String, Session>,
    users: HashMap<String, UserProfile>,
    expenses: HashMap<String, Vec<Expense>>,
    /// Number of `/auth/refresh` requests received.
    pub refresh_calls: usize,
    /// Answer expired tokens with HTTP 401 instead of business code 1001.
    pub http_401_for_expired: bool,
}

impl Store {
    /// Mark every issued token as expired.
    pub fn expire_tokens(&mut self) {
        for session in self.sessions.values_mut() {
            session.expired = true;
        }
    }

    /// Forget every issued token, as if the server restarted.
    pub fn revoke_tokens(&mut self) {
        self.sessions.clear();
    }
}

pub type Db = Arc<RwLock<Store>>;

type Reply = (StatusCode, Json<Value>);

fn ok(data: impl Serialize) -> Reply {
    (
        StatusCode::OK,
        Json(json!({"code": SUCCESS, "message": "success", "data": data})),
    )
}

fn fail(code: i64, message: &str) -> Reply {
    (
        StatusCode::OK,
        Json(json!({"code": code, "message": message, "data": null})),
    )
}

pub fn new_db() -> Db {
    Arc::new(RwLock::new(Store::default()))
}

pub fn app() -> Router {
    app_with_db(new_db())
}

pub fn app_with_db(db: Db) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/user/info", get(get_user_info).put(update_user_info))
        .route("/expense", post(create_expense))
        .route("/expense/range", get(expense_range))
        .route("/expense/list", get(expense_list))
        .route("/static", get(monthly_statistics));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_db(listener, new_db()).await
}

pub async fn run_with_db(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

/// Resolve the bearer token to an openid, or the reply to send instead.
fn authenticate(store: &Store, headers: &HeaderMap) -> Result<String, Reply> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| fail(UNAUTHORIZED, "not logged in"))?;
    let session = store
        .sessions
        .get(token)
        .ok_or_else(|| fail(UNAUTHORIZED, "invalid token"))?;
    if session.expired {
        if store.http_401_for_expired {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"code": TOKEN_EXPIRED, "message": "token expired", "data": null})),
            ));
        }
        return Err(fail(TOKEN_EXPIRED, "token expired"));
    }
    Ok(session.openid.clone())
}

fn issue_token(store: &mut Store, openid: &str) -> String {
    let token = Uuid::new_v4().to_string();
    store.sessions.insert(
        token.clone(),
        Session {
            openid: openid.to_string(),
            expired: false,
        },
    );
    token
}

async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> Reply {
    if input.code.trim().is_empty() {
        return fail(INVALID_PARAMS, "code is required");
    }
    let openid = format!("openid-{}", input.code);
    let mut store = db.write().await;
    let profile = store.users.entry(openid.clone()).or_insert_with(|| UserProfile {
        openid: Some(openid.clone()),
        ..UserProfile::default()
    });
    if let Some(nick_name) = input.nick_name.filter(|s| !s.is_empty()) {
        profile.nick_name = Some(nick_name);
    }
    if let Some(avatar_url) = input.avatar_url.filter(|s| !s.is_empty()) {
        profile.avatar_url = Some(avatar_url);
    }
    let profile = profile.clone();
    let token = issue_token(&mut store, &openid);
    info!(%openid, "login");
    ok(json!({"token": token, "openid": openid, "userInfo": profile}))
}

async fn refresh(State(db): State<Db>, Json(input): Json<RefreshInput>) -> Reply {
    let mut store = db.write().await;
    store.refresh_calls += 1;
    let Some(session) = store.sessions.remove(&input.token) else {
        debug!("refresh with unknown token");
        return fail(UNAUTHORIZED, "invalid token");
    };
    let token = issue_token(&mut store, &session.openid);
    info!(openid = %session.openid, "token refreshed");
    ok(json!({"token": token}))
}

async fn get_user_info(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    let openid = match authenticate(&store, &headers) {
        Ok(openid) => openid,
        Err(reply) => return reply,
    };
    match store.users.get(&openid) {
        Some(profile) => ok(profile),
        None => fail(404, "user not found"),
    }
}

async fn update_user_info(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(update): Json<UserProfile>,
) -> Reply {
    let mut store = db.write().await;
    let openid = match authenticate(&store, &headers) {
        Ok(openid) => openid,
        Err(reply) => return reply,
    };
    let profile = store.users.entry(openid.clone()).or_default();
    if update.nick_name.is_some() {
        profile.nick_name = update.nick_name;
    }
    if update.avatar_url.is_some() {
        profile.avatar_url = update.avatar_url;
    }
    profile.openid = Some(openid);
    ok(profile.clone())
}

/// First number in the text, e.g. `"taxi 23.5 home"` -> `23.5`.
pub fn extract_amount(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    rest[..end].trim_end_matches('.').parse().ok()
}

pub fn categorize(text: &str) -> Option<Category> {
    let lower = text.to_lowercase();
    let (name, color) = if ["coffee", "lunch", "dinner", "breakfast"].iter().any(|k| lower.contains(k)) {
        ("Food", "#ff9f43")
    } else if ["taxi", "bus", "metro", "train"].iter().any(|k| lower.contains(k)) {
        ("Transport", "#54a0ff")
    } else {
        return None;
    };
    Some(Category {
        name: name.to_string(),
        color: color.to_string(),
    })
}

async fn create_expense(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateExpense>,
) -> Reply {
    let mut store = db.write().await;
    let openid = match authenticate(&store, &headers) {
        Ok(openid) => openid,
        Err(reply) => return reply,
    };
    let text = input.raw_text.trim();
    if text.is_empty() {
        return fail(INVALID_PARAMS, "rawText is required");
    }
    let Some(amount) = extract_amount(text) else {
        return fail(INVALID_PARAMS, "no amount found in text");
    };
    let expense = Expense {
        id: Uuid::new_v4().to_string(),
        description: text.to_string(),
        amount,
        date: input
            .date
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        category: categorize(text),
    };
    store.expenses.entry(openid).or_default().push(expense.clone());
    ok(expense)
}

fn day_of(expense: &Expense) -> &str {
    expense.date.get(..10).unwrap_or(&expense.date)
}

async fn expense_range(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Reply {
    let store = db.read().await;
    let openid = match authenticate(&store, &headers) {
        Ok(openid) => openid,
        Err(reply) => return reply,
    };
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return fail(INVALID_PARAMS, "startDate and endDate are required");
    };
    let expenses: Vec<Expense> = store
        .expenses
        .get(&openid)
        .into_iter()
        .flatten()
        .filter(|e| day_of(e) >= start.as_str() && day_of(e) <= end.as_str())
        .cloned()
        .collect();
    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    ok(json!({"expenses": expenses, "summary": {"totalAmount": total}}))
}

fn in_month(store: &Store, openid: &str, month: &str) -> Vec<Expense> {
    store
        .expenses
        .get(openid)
        .into_iter()
        .flatten()
        .filter(|e| e.date.starts_with(month))
        .cloned()
        .collect()
}

async fn expense_list(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> Reply {
    let store = db.read().await;
    let openid = match authenticate(&store, &headers) {
        Ok(openid) => openid,
        Err(reply) => return reply,
    };
    let Some(month) = query.month else {
        return fail(INVALID_PARAMS, "month is required");
    };
    let mut expenses = in_month(&store, &openid, &month);
    match query.sort.as_deref() {
        Some("asc") => expenses.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
        Some("desc") => expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
        _ => expenses.sort_by(|a, b| b.date.cmp(&a.date)),
    }
    ok(expenses)
}

async fn monthly_statistics(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> Reply {
    let store = db.read().await;
    let openid = match authenticate(&store, &headers) {
        Ok(openid) => openid,
        Err(reply) => return reply,
    };
    let Some(month) = query.month else {
        return fail(INVALID_PARAMS, "month is required");
    };
    ok(json!({"expenses": in_month(&store, &openid, &month)}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_is_first_number() {
        assert_eq!(extract_amount("taxi 23.5 home"), Some(23.5));
        assert_eq!(extract_amount("lunch 30."), Some(30.0));
        assert_eq!(extract_amount("coffee12"), Some(12.0));
        assert_eq!(extract_amount("no numbers"), None);
    }

    #[test]
    fn categories_by_keyword() {
        assert_eq!(categorize("Coffee 18").unwrap().name, "Food");
        assert_eq!(categorize("metro card 50").unwrap().name, "Transport");
        assert!(categorize("book 40").is_none());
    }

    #[test]
    fn profile_serializes_camel_case() {
        let profile = UserProfile {
            openid: Some("o".to_string()),
            nick_name: Some("Lin".to_string()),
            avatar_url: None,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json, serde_json::json!({"openid": "o", "nickName": "Lin"}));
    }

    #[test]
    fn create_expense_date_is_optional() {
        let input: CreateExpense = serde_json::from_str(r#"{"rawText":"bus 2"}"#).unwrap();
        assert_eq!(input.raw_text, "bus 2");
        assert!(input.date.is_none());
    }

    #[test]
    fn login_input_rejects_missing_code() {
        let result: Result<LoginInput, _> = serde_json::from_str(r#"{"nickName":"x"}"#);
        assert!(result.is_err());
    }
}
