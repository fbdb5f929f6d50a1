//! Shared process-wide state handed to every request handler. Built
//! once at startup (spec.md §5: the Selector and its dependencies are
//! constructed once and are read-only thereafter) and wrapped in an
//! `Arc` by the caller.

use std::sync::Arc;

use prompt_core::{CachePort, Selector, TelemetryPort};
use prompt_infra::telemetry::PrometheusTelemetry;
use prompt_infra::{InMemoryCache, MetricsRepository};
use prompt_types::PromptServiceConfig;

pub struct AppState {
    pub selector: Selector,
    pub metrics: MetricsRepository,
    pub cache: Arc<dyn CachePort>,
    pub telemetry: Arc<dyn TelemetryPort>,
    pub ifeval_threshold: f64,
    pub provider: String,
    pub model: String,
    pub llm_configured: bool,
}

impl AppState {
    pub fn new(
        config: &PromptServiceConfig,
        selector: Selector,
        metrics: MetricsRepository,
        ifeval_threshold: f64,
        llm_configured: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            selector,
            metrics,
            cache: Arc::new(InMemoryCache::new()),
            telemetry: Arc::new(PrometheusTelemetry::new()),
            ifeval_threshold,
            provider: config.llm.provider.clone(),
            model: config.llm.model.clone(),
            llm_configured,
        })
    }
}
