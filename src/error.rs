use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

// Errors surfaced to the caller before any streaming has started. A failure
// after the response body begins cannot become a status code any more; the
// relay handles that case in-band instead.
#[derive(Debug)]
pub enum ApiError {
    RateLimitExceeded { max: u32, window_secs: u64 },
    Upstream(String),
}

impl ApiError {
    pub fn message(&self) -> String {
        match self {
            ApiError::RateLimitExceeded { max, window_secs } => format!(
                "Rate limit exceeded. Maximum {max} requests per {window_secs} seconds."
            ),
            ApiError::Upstream(msg) => msg.clone(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_cites_the_configured_quota() {
        let err = ApiError::RateLimitExceeded {
            max: 10,
            window_secs: 60,
        };
        let msg = err.message();
        assert!(msg.contains("10"));
        assert!(msg.contains("60"));
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let err = ApiError::RateLimitExceeded {
            max: 10,
            window_secs: 60,
        };
        assert_eq!(err.into_response().status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn upstream_maps_to_500() {
        let err = ApiError::Upstream("connect refused".to_string());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
