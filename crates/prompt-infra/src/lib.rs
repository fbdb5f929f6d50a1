//! Infrastructure layer for the prompt-improvement service: concrete
//! implementations of the domain-layer ports (`CatalogSource`,
//! `LlmClient`, `CachePort`, `TelemetryPort`), SQLite-backed metrics
//! persistence, configuration loading, exception mapping, and tracing
//! bootstrap. Everything here does I/O; `prompt-core` never does.

pub mod cache;
pub mod calibration;
pub mod catalog_repository;
pub mod config;
pub mod exception_mapper;
pub mod llm_client;
pub mod logging;
pub mod metrics_repository;
pub mod telemetry;

pub use cache::InMemoryCache;
pub use calibration::{load_threshold, CalibrationArtifact};
pub use catalog_repository::FileSystemCatalogRepository;
pub use config::{ConfigLoader, Validate};
pub use llm_client::HttpLlmClient;
pub use metrics_repository::MetricsRepository;
pub use telemetry::PrometheusTelemetry;
