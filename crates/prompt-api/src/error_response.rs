//! Maps `DomainError` onto the HTTP surface (spec.md §7). Each of the
//! six categories has its own status-code rule; LLM timeouts and other
//! provider failures are distinguished because only the former maps to
//! 504.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use prompt_types::ids;
use prompt_types::{DomainError, ErrorCategory};
use serde_json::json;

/// Renders a `DomainError` as the JSON envelope the HTTP routes use:
/// `{"error": ..., "detail": ..., "degradation_flags": [...]}`
/// with `degradation_flags` present only for provider failures.
pub fn render(error: &DomainError) -> Response {
    let (status, label) = match error.category() {
        ErrorCategory::Validation => (StatusCode::BAD_REQUEST, "Invalid input"),
        ErrorCategory::LlmProvider => {
            if error.error_id() == ids::LLM_TIMEOUT {
                (StatusCode::GATEWAY_TIMEOUT, "LLM provider timed out")
            } else {
                (StatusCode::SERVICE_UNAVAILABLE, "LLM provider unavailable")
            }
        }
        ErrorCategory::CacheOperation => (StatusCode::OK, "cache degraded"),
        ErrorCategory::Database => {
            if error.error_id() == ids::DB_CORRUPTION {
                (StatusCode::INTERNAL_SERVER_ERROR, "database corrupted")
            } else {
                (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
            }
        }
        ErrorCategory::FileIo => {
            if error.error_id() == ids::FILE_NOT_FOUND {
                (StatusCode::NOT_FOUND, "resource not found")
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, "file access failed")
            }
        }
        ErrorCategory::DataCorruption => (StatusCode::INTERNAL_SERVER_ERROR, "data corrupted"),
    };

    let mut body = json!({
        "error": label,
        "detail": error.to_string(),
    });

    if matches!(error.category(), ErrorCategory::LlmProvider) {
        body["degradation_flags"] = json!({"provider_unavailable": true});
    }

    (status, Json(body)).into_response()
}

impl IntoResponse for crate::ApiError {
    fn into_response(self) -> Response {
        render(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_types::ids as pids;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let response = render(&DomainError::validation("idea must be a non-empty string"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn llm_timeout_maps_to_gateway_timeout() {
        let error = DomainError::llm_provider("timed out", pids::LLM_TIMEOUT, None, None, None);
        let response = render(&error);
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn llm_connection_failure_maps_to_service_unavailable() {
        let error = DomainError::llm_provider(
            "connection refused",
            pids::LLM_CONNECTION_FAILED,
            None,
            None,
            None,
        );
        let response = render(&error);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn db_corruption_maps_to_internal_server_error() {
        let error = DomainError::database("bad page", pids::DB_CORRUPTION, None, None);
        let response = render(&error);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn file_not_found_maps_to_404() {
        let error = DomainError::file_io("missing catalog", pids::FILE_NOT_FOUND);
        let response = render(&error);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
