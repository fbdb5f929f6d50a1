//! Error taxonomy for the prompt-improvement service.
//!
//! `DomainError` is the single error type domain components return.
//! Infrastructure exceptions (`sqlx::Error`, `reqwest::Error`,
//! `std::io::Error`, `serde_json::Error`) are converted to `DomainError`
//! only at the infrastructure boundary (see `prompt-infra::exception_mapper`) —
//! `prompt-core` never sees those types directly.

use std::collections::HashMap;
use thiserror::Error;

/// The registry of `PREFIX-NNN` error identifiers.
///
/// Every `DomainError` carries one of these. The registry is exhaustive:
/// a unit test in this module checks that every constant matches
/// `^[A-Z]+-\d+$` and that none repeats.
pub mod ids {
    pub const LLM_CONNECTION_FAILED: &str = "LLM-001";
    pub const LLM_TIMEOUT: &str = "LLM-002";
    pub const LLM_UNKNOWN_ERROR: &str = "LLM-003";

    pub const CACHE_GET_FAILED: &str = "CACHE-001";
    pub const CACHE_SET_FAILED: &str = "CACHE-002";
    pub const CACHE_UPDATE_FAILED: &str = "CACHE-003";
    pub const CACHE_CONSTRAINT_VIOLATION: &str = "CACHE-004";

    pub const DATA_CORRUPTION_METRICS: &str = "DATA-001";
    pub const DATA_CORRUPTION_GUARDRAILS: &str = "DATA-002";
    pub const DATA_CORRUPTION_CATALOG: &str = "DATA-003";

    pub const DB_QUERY_FAILED: &str = "DB-001";
    pub const DB_OPERATIONAL_ERROR: &str = "DB-002";
    pub const DB_CORRUPTION: &str = "DB-003";
    pub const DB_PERMISSION_DENIED: &str = "DB-004";
    pub const DB_INIT_FAILED: &str = "DB-005";
    pub const MIGRATION_FAILED: &str = "DB-006";

    pub const FILE_READ_FAILED: &str = "IO-001";
    pub const FILE_NOT_FOUND: &str = "IO-002";
    pub const FILE_PERMISSION_DENIED: &str = "IO-003";
    pub const FILE_UNICODE_ERROR: &str = "IO-004";

    pub const VALIDATION_FAILED: &str = "VAL-001";

    pub const ALL: &[&str] = &[
        LLM_CONNECTION_FAILED,
        LLM_TIMEOUT,
        LLM_UNKNOWN_ERROR,
        CACHE_GET_FAILED,
        CACHE_SET_FAILED,
        CACHE_UPDATE_FAILED,
        CACHE_CONSTRAINT_VIOLATION,
        DATA_CORRUPTION_METRICS,
        DATA_CORRUPTION_GUARDRAILS,
        DATA_CORRUPTION_CATALOG,
        DB_QUERY_FAILED,
        DB_OPERATIONAL_ERROR,
        DB_CORRUPTION,
        DB_PERMISSION_DENIED,
        DB_INIT_FAILED,
        MIGRATION_FAILED,
        FILE_READ_FAILED,
        FILE_NOT_FOUND,
        FILE_PERMISSION_DENIED,
        FILE_UNICODE_ERROR,
        VALIDATION_FAILED,
    ];
}

/// The six top-level error categories from the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    LlmProvider,
    CacheOperation,
    DataCorruption,
    Database,
    FileIo,
    Validation,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::LlmProvider => "LLM_PROVIDER",
            ErrorCategory::CacheOperation => "CACHE_OPERATION",
            ErrorCategory::DataCorruption => "DATA_CORRUPTION",
            ErrorCategory::Database => "DATABASE",
            ErrorCategory::FileIo => "FILE_IO",
            ErrorCategory::Validation => "VALIDATION",
        };
        write!(f, "{s}")
    }
}

/// Domain-level error. Each variant maps to one of the six categories
/// in the data model and carries a stable `error_id` plus a bounded
/// structured context map (truncated to at most 10 entries by
/// convention at construction sites, mirroring the mapper's
/// bounded-stack-trace rule).
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("{message}")]
    LlmProvider {
        message: String,
        error_id: &'static str,
        provider: Option<String>,
        model: Option<String>,
        original_exception: Option<String>,
        context: HashMap<String, String>,
    },

    #[error("{message}")]
    CacheOperation {
        message: String,
        error_id: &'static str,
        cache_key: Option<String>,
        operation: Option<String>,
        context: HashMap<String, String>,
    },

    #[error("{message}")]
    DataCorruption {
        message: String,
        error_id: &'static str,
        context: HashMap<String, String>,
    },

    #[error("{message}")]
    Database {
        message: String,
        error_id: &'static str,
        entity_type: Option<String>,
        operation: Option<String>,
        context: HashMap<String, String>,
    },

    #[error("{message}")]
    FileIo {
        message: String,
        error_id: &'static str,
        context: HashMap<String, String>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        error_id: &'static str,
        context: HashMap<String, String>,
    },
}

impl DomainError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::LlmProvider { .. } => ErrorCategory::LlmProvider,
            DomainError::CacheOperation { .. } => ErrorCategory::CacheOperation,
            DomainError::DataCorruption { .. } => ErrorCategory::DataCorruption,
            DomainError::Database { .. } => ErrorCategory::Database,
            DomainError::FileIo { .. } => ErrorCategory::FileIo,
            DomainError::Validation { .. } => ErrorCategory::Validation,
        }
    }

    pub fn error_id(&self) -> &'static str {
        match self {
            DomainError::LlmProvider { error_id, .. }
            | DomainError::CacheOperation { error_id, .. }
            | DomainError::DataCorruption { error_id, .. }
            | DomainError::Database { error_id, .. }
            | DomainError::FileIo { error_id, .. }
            | DomainError::Validation { error_id, .. } => error_id,
        }
    }

    pub fn context(&self) -> &HashMap<String, String> {
        match self {
            DomainError::LlmProvider { context, .. }
            | DomainError::CacheOperation { context, .. }
            | DomainError::DataCorruption { context, .. }
            | DomainError::Database { context, .. }
            | DomainError::FileIo { context, .. }
            | DomainError::Validation { context, .. } => context,
        }
    }

    pub fn llm_provider(
        message: impl Into<String>,
        error_id: &'static str,
        provider: Option<String>,
        model: Option<String>,
        original_exception: Option<String>,
    ) -> Self {
        DomainError::LlmProvider {
            message: message.into(),
            error_id,
            provider,
            model,
            original_exception,
            context: HashMap::new(),
        }
    }

    pub fn cache_operation(
        message: impl Into<String>,
        error_id: &'static str,
        cache_key: Option<String>,
        operation: Option<String>,
    ) -> Self {
        DomainError::CacheOperation {
            message: message.into(),
            error_id,
            cache_key: cache_key.map(|k| k.chars().take(8).collect()),
            operation,
            context: HashMap::new(),
        }
    }

    pub fn data_corruption(message: impl Into<String>, error_id: &'static str) -> Self {
        DomainError::DataCorruption {
            message: message.into(),
            error_id,
            context: HashMap::new(),
        }
    }

    pub fn database(
        message: impl Into<String>,
        error_id: &'static str,
        entity_type: Option<String>,
        operation: Option<String>,
    ) -> Self {
        DomainError::Database {
            message: message.into(),
            error_id,
            entity_type,
            operation,
            context: HashMap::new(),
        }
    }

    pub fn file_io(message: impl Into<String>, error_id: &'static str) -> Self {
        DomainError::FileIo {
            message: message.into(),
            error_id,
            context: HashMap::new(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation {
            message: message.into(),
            error_id: ids::VALIDATION_FAILED,
            context: HashMap::new(),
        }
    }

    /// Attach context entries, bounded to 10 total (mirrors the
    /// mapper's bounded stack trace rule for structured context).
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let ctx = match &mut self {
            DomainError::LlmProvider { context, .. }
            | DomainError::CacheOperation { context, .. }
            | DomainError::DataCorruption { context, .. }
            | DomainError::Database { context, .. }
            | DomainError::FileIo { context, .. }
            | DomainError::Validation { context, .. } => context,
        };
        if ctx.len() < 10 {
            ctx.insert(key.into(), value.into());
        }
        self
    }
}

/// Result type for domain components.
pub type Result<T> = std::result::Result<T, DomainError>;

/// `Success`/`Failure` wrapper carrying cross-cutting degradation flags.
///
/// Kept distinct from `Option`/bare `Result` on purpose: the
/// degradation flags are surfaced by the HTTP boundary as part of a
/// successful response, so collapsing this into `Result<T, DomainError>`
/// would lose that channel. Exactly one of `Success`/`Failure` holds at
/// a time.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Success {
        value: T,
        degradation_flags: HashMap<String, bool>,
    },
    Failure {
        error: DomainError,
    },
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success {
            value,
            degradation_flags: HashMap::new(),
        }
    }

    pub fn success_with_flags(value: T, degradation_flags: HashMap<String, bool>) -> Self {
        Outcome::Success {
            value,
            degradation_flags,
        }
    }

    pub fn failure(error: DomainError) -> Self {
        Outcome::Failure { error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure { .. })
    }

    pub fn degradation_flags(&self) -> Option<&HashMap<String, bool>> {
        match self {
            Outcome::Success {
                degradation_flags, ..
            } => Some(degradation_flags),
            Outcome::Failure { .. } => None,
        }
    }
}
