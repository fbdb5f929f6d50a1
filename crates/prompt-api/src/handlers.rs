//! HTTP route handlers (spec.md §6). Each handler is a thin adapter:
//! validate the request, call into `prompt-core`/`prompt-infra`
//! through `AppState`, and shape the JSON response the route table
//! specifies.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use prompt_core::ifeval;
use prompt_core::metrics::{analyzer, evaluator};
use prompt_core::SelectorMode;

use crate::error_response;
use crate::state::AppState;
use crate::ApiError;

#[derive(Debug, Deserialize)]
pub struct ImprovePromptRequest {
    pub idea: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub guardrails: Option<Vec<String>>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Parses the request body's `mode` field (`"legacy"` / `"nlac"`, case
/// insensitive). An absent or unrecognized value falls back to the
/// server's configured default rather than erroring, since spec.md §6
/// marks the field optional.
fn parse_mode(raw: &str) -> Option<SelectorMode> {
    match raw.to_ascii_lowercase().as_str() {
        "legacy" => Some(SelectorMode::Legacy),
        "nlac" => Some(SelectorMode::Nlac),
        _ => None,
    }
}

/// The 503 envelope spec.md §8 scenario 3 mandates when a request
/// needs the NLaC strategy (its default, or an explicit `mode:
/// "nlac"`) but no LLM client is configured. NLaC's own OPRO loop
/// degrades gracefully for LLM failures *during* a call (§4.9); this
/// is the "never configured at all" case, caught before any selector
/// work happens.
fn provider_unavailable(state: &AppState) -> Response {
    let mut flags: Vec<String> = state
        .selector
        .flags()
        .to_map()
        .into_iter()
        .filter(|(_, active)| *active)
        .map(|(name, _)| name)
        .collect();
    flags.push("provider_unavailable".to_string());

    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": "service_unavailable",
            "message": "LLM provider not configured or circuit breaker open",
            "degradation_flags": flags,
        })),
    )
        .into_response()
}

pub async fn improve_prompt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImprovePromptRequest>,
) -> Response {
    if request.idea.trim().is_empty() {
        return error_response::render(&prompt_types::DomainError::validation(
            "idea must be a non-empty string",
        ));
    }

    let mode = request
        .mode
        .as_deref()
        .and_then(parse_mode)
        .unwrap_or_else(|| state.selector.default_mode());

    if mode == SelectorMode::Nlac && !state.llm_configured {
        return provider_unavailable(&state);
    }

    let cache_key = prompt_core::cache::memo_key(&request.idea, &format!("{:?}|{}", mode, request.context));
    let cached_prediction: Option<prompt_core::Prediction> = state
        .cache
        .get(&cache_key)
        .and_then(|value| serde_json::from_value(value).ok());
    state.telemetry.record_cache_hit(cached_prediction.is_some(), &cache_key);

    let started = std::time::Instant::now();
    let prediction = match cached_prediction {
        Some(prediction) => prediction,
        None => {
            let prediction = match state.selector.route_with_mode(&request.idea, &request.context, mode) {
                Ok(prediction) => prediction,
                Err(error) => return error_response::render(&error),
            };
            if let Ok(value) = serde_json::to_value(&prediction) {
                state.cache.set(&cache_key, value, prompt_core::cache::DEFAULT_TTL_SECONDS);
            }
            prediction
        }
    };
    let latency_ms = started.elapsed().as_millis() as u64;
    state
        .telemetry
        .record_knn_hit(!state.selector.flags().knn_disabled, &request.idea);

    let quality_gate = ifeval::validate(
        &prediction.improved_prompt,
        &ifeval::default_constraints(),
        ifeval::DEFAULT_MIN_CHARS,
        state.ifeval_threshold,
    );
    state.telemetry.record_ifeval_result(
        quality_gate.score,
        quality_gate.passed,
        &prediction.improved_prompt,
    );
    state.telemetry.record_latency("improve_prompt", latency_ms as f64);

    let degradation_flags: Vec<String> = state
        .selector
        .flags()
        .to_map()
        .into_iter()
        .filter(|(_, active)| *active)
        .map(|(name, _)| name)
        .collect();

    let metrics = evaluator::calculate(
        &request.idea,
        &prediction,
        evaluator::RawPerformance {
            latency_ms,
            total_tokens: None,
            cost_usd: None,
            provider: state.provider.clone(),
            model: state.model.clone(),
            backend: prediction.framework.clone(),
        },
        None,
    );

    if let Err(error) = state.metrics.save(&metrics).await {
        tracing::warn!(error_id = error.error_id(), "failed to persist prompt metrics");
    }

    // Caller-supplied guardrails (spec.md §6 request contract) are
    // appended to the strategy's own, not substituted for them.
    let mut guardrails = prediction.guardrails.clone();
    if let Some(extra) = &request.guardrails {
        for guardrail in extra {
            if !guardrails.contains(guardrail) {
                guardrails.push(guardrail.clone());
            }
        }
    }

    Json(json!({
        "improved_prompt": prediction.improved_prompt,
        "role": prediction.role,
        "directive": prediction.directive,
        "framework": prediction.framework,
        "guardrails": guardrails,
        "reasoning": prediction.reasoning,
        "confidence": prediction.confidence.unwrap_or(0.0),
        "quality_gate": quality_gate,
        "degradation_flags": degradation_flags,
        "backend": prediction.framework,
    }))
    .into_response()
}

pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let flags = state.selector.flags();
    let status = if flags.knn_disabled && flags.complex_strategy_disabled {
        "degraded"
    } else {
        "healthy"
    };

    Json(json!({
        "status": status,
        "provider": state.provider,
        "model": state.model,
        "dspy_configured": state.llm_configured,
    }))
    .into_response()
}

pub async fn metrics_summary(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let all = state.metrics.get_all(10_000, 0).await?;
    let summary = analyzer::summarize(&all);

    Ok(Json(json!({
        "total_prompts": summary.count,
        "average_quality": summary.quality.mean,
        "average_performance": summary.performance.mean,
        "average_impact": summary.impact.mean,
        "grade_distribution": summary.grade_distribution,
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

pub async fn metrics_trends(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendsQuery>,
) -> Response {
    if query.days <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_parameter",
                "detail": "days must be a positive integer",
            })),
        )
            .into_response();
    }

    let end = Utc::now();
    let start = end - Duration::days(query.days);
    let rows = match state.metrics.get_by_date_range(start, end, 10_000).await {
        Ok(rows) => rows,
        Err(error) => return error_response::render(&error),
    };

    let report = analyzer::analyze_trends(&rows);

    let midpoint = rows.len() / 2;
    let periods = vec![
        json!({"label": "earlier", "count": midpoint}),
        json!({"label": "recent", "count": rows.len() - midpoint}),
    ];

    Json(json!({
        "periods": periods,
        "trends": {
            "quality": report.quality.to_string(),
            "performance": report.performance.to_string(),
            "impact": report.impact.to_string(),
            "recommendations": report.recommendations,
        },
    }))
    .into_response()
}
