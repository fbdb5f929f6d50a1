//! Request-ID middleware (spec.md §6). A provided `X-Request-ID` value
//! is preserved when non-empty and alphanumeric; otherwise an
//! 8-character lowercase-hex identifier is generated. Every response
//! carries the header, regardless of how the request was handled.

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

const HEADER_NAME: &str = "x-request-id";

fn generate_request_id() -> String {
    prompt_types::new_id().simple().to_string()[..8].to_string()
}

fn is_acceptable(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_alphanumeric())
}

pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let incoming = request
        .headers()
        .get(HEADER_NAME)
        .and_then(|value| value.to_str().ok())
        .filter(|value| is_acceptable(value))
        .map(str::to_string);

    let request_id = incoming.unwrap_or_else(generate_request_id);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(HEADER_NAME, value.clone());
        let mut response = next.run(request).await;
        response.headers_mut().insert(HEADER_NAME, value);
        response
    } else {
        next.run(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(axum::middleware::from_fn(request_id))
    }

    #[tokio::test]
    async fn generates_an_eight_char_hex_id_when_absent() {
        let response = app()
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers().get(HEADER_NAME).unwrap().to_str().unwrap();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn preserves_a_provided_non_empty_value() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/ping")
                    .header(HEADER_NAME, "abc123XY")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let id = response.headers().get(HEADER_NAME).unwrap().to_str().unwrap();
        assert_eq!(id, "abc123XY");
    }

    #[tokio::test]
    async fn rejects_a_non_alphanumeric_value_and_generates_one_instead() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/ping")
                    .header(HEADER_NAME, "not valid!")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let id = response.headers().get(HEADER_NAME).unwrap().to_str().unwrap();
        assert_eq!(id.len(), 8);
    }

    #[tokio::test]
    async fn two_independent_requests_get_different_generated_ids() {
        let router = app();
        let first = router
            .clone()
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let second = router
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let first_id = first.headers().get(HEADER_NAME).unwrap().to_str().unwrap().to_string();
        let second_id = second.headers().get(HEADER_NAME).unwrap().to_str().unwrap().to_string();
        assert_ne!(first_id, second_id);
    }
}
