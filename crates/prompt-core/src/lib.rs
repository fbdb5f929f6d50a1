//! Pure domain logic for the prompt-improvement service: complexity
//! analysis, intent classification, the bigram vectorizer, KNN
//! few-shot retrieval, the strategy family, IFEval validation, the
//! OPRO optimizer, and the metrics evaluator/analyzer. No I/O; every
//! boundary to infrastructure is a trait (`CatalogSource`, `LlmClient`,
//! `CachePort`, `TelemetryPort`).

pub mod cache;
pub mod catalog;
pub mod complexity;
pub mod domain;
pub mod ifeval;
pub mod intent;
pub mod knn;
pub mod metrics;
pub mod metrics_registry;
pub mod opro;
pub mod strategy;
pub mod telemetry;
pub mod vectorizer;

pub use cache::CachePort;
pub use catalog::CatalogSource;
pub use domain::*;
pub use opro::LlmClient;
pub use strategy::{Selector, SelectorMode, SharedLlmClient, Strategy};
pub use telemetry::TelemetryPort;
