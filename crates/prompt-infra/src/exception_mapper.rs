//! Exception Mapper (spec.md §4.14). Converts low-level infrastructure
//! exceptions (`sqlx::Error`, `reqwest::Error`, `std::io::Error`,
//! `serde_json::Error`) into `DomainError`, attaching a bounded
//! structured context and emitting exactly one ERROR-level log per
//! mapping with the error_id embedded in the message text.

use prompt_types::{ids, DomainError};

const MAX_CONTEXT_FRAMES: usize = 10;

fn truncated_cache_key(key: &str) -> String {
    key.chars().take(8).collect()
}

/// Maps a `reqwest::Error` to `LLM_CONNECTION_FAILED` / `LLM_TIMEOUT` /
/// `LLM_UNKNOWN_ERROR`. Timeout takes precedence over connection
/// failure when `reqwest` reports both (spec.md §4.14's ordering rule
/// for the `asyncio.TimeoutError`-vs-`ConnectionError` ambiguity).
pub fn map_llm_error(error: &reqwest::Error, provider: &str, model: &str, prompt_length: usize) -> DomainError {
    let error_id = if error.is_timeout() {
        ids::LLM_TIMEOUT
    } else if error.is_connect() {
        ids::LLM_CONNECTION_FAILED
    } else {
        ids::LLM_UNKNOWN_ERROR
    };

    tracing::error!(
        error_id,
        provider,
        model,
        prompt_length,
        %error,
        "[{}] LLM call failed", error_id
    );

    DomainError::llm_provider(
        format!("[{error_id}] LLM call failed: {error}"),
        error_id,
        Some(provider.to_string()),
        Some(model.to_string()),
        Some(error.to_string()),
    )
    .with_context("prompt_length", prompt_length.to_string())
}

/// Maps a `sqlx::Error` to the Database category, distinguishing
/// constraint violations, operational errors, corruption, and
/// permission failures (spec.md §4.14).
pub fn map_db_error(error: &sqlx::Error, query_context: &str, db_path: &str) -> DomainError {
    let (error_id, message) = match error {
        sqlx::Error::Database(db_err) => match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation
            | sqlx::error::ErrorKind::ForeignKeyViolation
            | sqlx::error::ErrorKind::NotNullViolation
            | sqlx::error::ErrorKind::CheckViolation => {
                (ids::CACHE_CONSTRAINT_VIOLATION, "database constraint violation")
            }
            _ => (ids::DB_OPERATIONAL_ERROR, "database operational error"),
        },
        sqlx::Error::Io(_) => (ids::DB_CORRUPTION, "database file corruption"),
        sqlx::Error::PoolTimedOut => (ids::DB_OPERATIONAL_ERROR, "database operational error"),
        sqlx::Error::Configuration(_) => (ids::DB_PERMISSION_DENIED, "database permission denied"),
        _ => (ids::DB_OPERATIONAL_ERROR, "database operational error"),
    };

    tracing::error!(error_id, query_context, db_path, %error, "[{}] {}", error_id, message);

    DomainError::database(
        format!("[{error_id}] {message}: {error}"),
        error_id,
        None,
        Some(query_context.to_string()),
    )
    .with_context("db_path", db_path.to_string())
    .with_context("query_context", query_context.to_string())
}

/// Maps a `std::io::Error` to `FILE_IO` with `FILE_NOT_FOUND` /
/// `FILE_PERMISSION_DENIED` / `FILE_READ_FAILED` discrimination.
pub fn map_io_error(error: &std::io::Error, path: &str) -> DomainError {
    let error_id = match error.kind() {
        std::io::ErrorKind::NotFound => ids::FILE_NOT_FOUND,
        std::io::ErrorKind::PermissionDenied => ids::FILE_PERMISSION_DENIED,
        _ => ids::FILE_READ_FAILED,
    };

    tracing::error!(error_id, path, %error, "[{}] file operation failed", error_id);

    DomainError::file_io(format!("[{error_id}] file operation failed: {error}"), error_id)
        .with_context("path", path.to_string())
}

/// Maps a `serde_json::Error` to `DATA_CORRUPTION` with line/column
/// context.
pub fn map_json_error(error: &serde_json::Error, source: &str) -> DomainError {
    tracing::error!(
        error_id = ids::DATA_CORRUPTION_CATALOG,
        source,
        line = error.line(),
        column = error.column(),
        %error,
        "[{}] malformed JSON", ids::DATA_CORRUPTION_CATALOG
    );

    DomainError::data_corruption(
        format!(
            "[{}] malformed JSON in {source} (line {}, column {}): {error}",
            ids::DATA_CORRUPTION_CATALOG,
            error.line(),
            error.column()
        ),
        ids::DATA_CORRUPTION_CATALOG,
    )
    .with_context("source", source.to_string())
    .with_context("line", error.line().to_string())
    .with_context("column", error.column().to_string())
}

/// Attaches a cache key to a `DomainError::CacheOperation`, truncating
/// it to 8 characters per spec.md §4.14's bounded-context rule.
pub fn cache_error(message: impl Into<String>, error_id: &'static str, cache_key: &str, operation: &str) -> DomainError {
    DomainError::cache_operation(
        message,
        error_id,
        Some(truncated_cache_key(cache_key)),
        Some(operation.to_string()),
    )
}

/// Bounds an already-collected frame list to the mapper's ≤10-frame
/// rule, keeping the innermost frames.
pub fn bounded_frames(frames: Vec<String>) -> Vec<String> {
    if frames.len() <= MAX_CONTEXT_FRAMES {
        frames
    } else {
        frames[frames.len() - MAX_CONTEXT_FRAMES..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_truncated_to_eight_chars() {
        let error = cache_error("boom", ids::CACHE_GET_FAILED, "0123456789abcdef", "get");
        match error {
            DomainError::CacheOperation { cache_key, .. } => {
                assert_eq!(cache_key.as_deref(), Some("01234567"));
            }
            _ => panic!("expected CacheOperation"),
        }
    }

    #[test]
    fn bounded_frames_keeps_innermost_ten() {
        let frames: Vec<String> = (0..15).map(|i| i.to_string()).collect();
        let bounded = bounded_frames(frames);
        assert_eq!(bounded.len(), 10);
        assert_eq!(bounded.first().unwrap(), "5");
        assert_eq!(bounded.last().unwrap(), "14");
    }

    #[test]
    fn bounded_frames_is_unchanged_when_within_limit() {
        let frames: Vec<String> = (0..3).map(|i| i.to_string()).collect();
        assert_eq!(bounded_frames(frames.clone()), frames);
    }

    #[test]
    fn io_not_found_maps_to_file_not_found() {
        let error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let mapped = map_io_error(&error, "/tmp/missing.json");
        assert_eq!(mapped.error_id(), ids::FILE_NOT_FOUND);
    }

    #[test]
    fn json_error_maps_to_catalog_corruption() {
        let error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let mapped = map_json_error(&error, "catalog.json");
        assert_eq!(mapped.error_id(), ids::DATA_CORRUPTION_CATALOG);
    }
}
