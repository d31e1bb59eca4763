//! Business envelope and the pure interpret step.
//!
//! Every API response is `{code, message, data}` inside an HTTP 200. The
//! business code, not the HTTP status, decides the outcome, except that an
//! HTTP 401 is treated like an expired token.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Business status codes carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    TokenExpired,
    InvalidParams,
    Other(i64),
}

impl ResponseCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            200 => ResponseCode::Success,
            401 => ResponseCode::Unauthorized,
            403 => ResponseCode::Forbidden,
            404 => ResponseCode::NotFound,
            500 => ResponseCode::ServerError,
            1001 => ResponseCode::TokenExpired,
            1002 => ResponseCode::InvalidParams,
            other => ResponseCode::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            ResponseCode::Success => 200,
            ResponseCode::Unauthorized => 401,
            ResponseCode::Forbidden => 403,
            ResponseCode::NotFound => 404,
            ResponseCode::ServerError => 500,
            ResponseCode::TokenExpired => 1001,
            ResponseCode::InvalidParams => 1002,
            ResponseCode::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// What the client should do with a response.
#[derive(Debug)]
pub enum Outcome {
    /// Success; the envelope's `data`.
    Data(Value),
    /// The token was rejected as expired; refresh and retry.
    Refresh,
    Fail(ApiError),
}

pub fn interpret(response: &HttpResponse) -> Outcome {
    if response.status == 401 {
        return Outcome::Refresh;
    }
    if response.status != 200 {
        return Outcome::Fail(ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        });
    }

    let envelope: Envelope = match serde_json::from_str(&response.body) {
        Ok(envelope) => envelope,
        Err(e) => return Outcome::Fail(ApiError::Deserialization(e.to_string())),
    };

    let message = envelope.message;
    match ResponseCode::from_code(envelope.code) {
        ResponseCode::Success => Outcome::Data(envelope.data),
        ResponseCode::TokenExpired => Outcome::Refresh,
        ResponseCode::Unauthorized => Outcome::Fail(ApiError::SessionExpired { message }),
        ResponseCode::Forbidden => Outcome::Fail(ApiError::Forbidden { message }),
        ResponseCode::NotFound => Outcome::Fail(ApiError::NotFound { message }),
        ResponseCode::InvalidParams => Outcome::Fail(ApiError::InvalidParams { message }),
        ResponseCode::ServerError => Outcome::Fail(ApiError::Server { message }),
        ResponseCode::Other(code) => Outcome::Fail(ApiError::UnknownApi { code, message }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(body: Value) -> HttpResponse {
        HttpResponse::new(200, body.to_string())
    }

    #[test]
    fn success_strips_envelope() {
        match interpret(&ok(json!({"code": 200, "message": "ok", "data": {"foo": 1}}))) {
            Outcome::Data(data) => assert_eq!(data, json!({"foo": 1})),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn success_without_data_is_null() {
        match interpret(&ok(json!({"code": 200}))) {
            Outcome::Data(data) => assert!(data.is_null()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn expired_token_and_http_401_request_refresh() {
        assert!(matches!(
            interpret(&ok(json!({"code": 1001, "message": "token expired"}))),
            Outcome::Refresh
        ));
        assert!(matches!(
            interpret(&HttpResponse::new(401, "")),
            Outcome::Refresh
        ));
    }

    #[test]
    fn business_codes_map_to_errors() {
        let cases = [
            (401, "SessionExpired"),
            (403, "Forbidden"),
            (404, "NotFound"),
            (500, "Server"),
            (1002, "InvalidParams"),
            (7, "UnknownApi"),
        ];
        for (code, kind) in cases {
            let outcome = interpret(&ok(json!({"code": code, "message": "m", "data": null})));
            let Outcome::Fail(err) = outcome else {
                panic!("code {code}: expected failure");
            };
            let matched = match kind {
                "SessionExpired" => matches!(err, ApiError::SessionExpired { .. }),
                "Forbidden" => matches!(err, ApiError::Forbidden { .. }),
                "NotFound" => matches!(err, ApiError::NotFound { .. }),
                "Server" => matches!(err, ApiError::Server { .. }),
                "InvalidParams" => matches!(err, ApiError::InvalidParams { .. }),
                "UnknownApi" => matches!(err, ApiError::UnknownApi { code: 7, .. }),
                _ => false,
            };
            assert!(matched, "code {code}: got {err:?}");
            assert_eq!(err.user_message(), "m");
        }
    }

    #[test]
    fn other_http_status_is_http_error() {
        let outcome = interpret(&HttpResponse::new(502, "bad gateway"));
        assert!(matches!(
            outcome,
            Outcome::Fail(ApiError::Http { status: 502, .. })
        ));
    }

    #[test]
    fn malformed_envelope() {
        let outcome = interpret(&HttpResponse::new(200, "<html>"));
        assert!(matches!(outcome, Outcome::Fail(ApiError::Deserialization(_))));
    }

    #[test]
    fn code_roundtrip() {
        for code in [200, 401, 403, 404, 500, 1001, 1002, 418] {
            assert_eq!(ResponseCode::from_code(code).code(), code);
        }
    }
}
