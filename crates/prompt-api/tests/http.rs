//! End-to-end HTTP scenario tests (spec.md §8) driven through
//! `tower::ServiceExt::oneshot` against a real router and an
//! in-memory metrics database.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use prompt_api::{build_router, AppState};
use prompt_core::{Selector, SelectorMode};
use prompt_infra::MetricsRepository;
use prompt_types::{DomainError, PromptServiceConfig};
use tower::ServiceExt;

async fn test_state() -> Arc<AppState> {
    let selector = Selector::new(
        SelectorMode::Nlac,
        Err(DomainError::validation("no catalog in tests")),
        Err(DomainError::validation("no trainset in tests")),
        None,
    );
    let metrics = MetricsRepository::new_in_memory().await.unwrap();
    metrics.initialize().await.unwrap();
    let config = PromptServiceConfig::default();
    AppState::new(&config, selector, metrics, 0.7, false)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn improve_prompt_returns_the_full_response_shape() {
    let router = build_router(test_state().await);
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/improve-prompt")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "idea": "write a python function to validate email addresses",
                        "context": "backend utility",
                        "mode": "legacy",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["improved_prompt"].as_str().unwrap().len() > 0);
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
    assert!(body["quality_gate"].is_object());
    assert!(body["degradation_flags"].is_array());
}

#[tokio::test]
async fn improve_prompt_merges_caller_supplied_guardrails() {
    let router = build_router(test_state().await);
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/improve-prompt")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "idea": "write a python function to validate email addresses",
                        "mode": "legacy",
                        "guardrails": ["no external deps"],
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let guardrails: Vec<String> = body["guardrails"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert!(guardrails.contains(&"no external deps".to_string()));
}

#[tokio::test]
async fn improve_prompt_with_no_llm_configured_and_default_mode_is_service_unavailable() {
    let router = build_router(test_state().await);
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/improve-prompt")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "idea": "generate marketing copy",
                        "guardrails": [],
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "service_unavailable");
    assert_eq!(body["message"], "LLM provider not configured or circuit breaker open");
    let flags: Vec<String> = body["degradation_flags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert!(flags.contains(&"provider_unavailable".to_string()));
}

#[tokio::test]
async fn improve_prompt_rejects_an_empty_idea() {
    let router = build_router(test_state().await);
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/improve-prompt")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({"idea": ""}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_degraded_when_catalog_dependencies_are_unavailable() {
    let router = build_router(test_state().await);
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["dspy_configured"], false);
}

#[tokio::test]
async fn metrics_summary_reports_zero_for_an_empty_database() {
    let router = build_router(test_state().await);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/metrics/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_prompts"], 0);
}

#[tokio::test]
async fn metrics_trends_rejects_a_non_positive_days_parameter() {
    let router = build_router(test_state().await);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/metrics/trends?days=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_parameter");
}

#[tokio::test]
async fn metrics_trends_returns_a_non_empty_periods_list() {
    let router = build_router(test_state().await);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/metrics/trends?days=30")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["periods"].as_array().unwrap().len() > 0);
    assert!(body["trends"].is_object());
}

#[tokio::test]
async fn every_response_carries_a_request_id_header() {
    let router = build_router(test_state().await);
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
