//! Configuration loading. Grounded in the teacher's `BrainConfig`
//! loader: environment-variable overrides layered over `Default`,
//! a TOML file loader/saver, and a `validate` pass. The config data
//! types themselves live in `prompt_types` (no I/O there); this module
//! is the only place that touches the filesystem or environment.

use std::path::Path;

use prompt_types::{
    ids, CacheConfig, CalibrationConfig, CatalogConfig, DatabaseConfig, DomainError, LlmConfig,
    PromptServiceConfig, Result, ServerConfig,
};

/// Loads and validates a [`PromptServiceConfig`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Starts from [`PromptServiceConfig::default`] and overrides each
    /// field with its environment variable, if set. Parse failures
    /// become `DomainError::validation` rather than panicking.
    pub fn from_env() -> Result<PromptServiceConfig> {
        let mut config = PromptServiceConfig::default();

        if let Ok(v) = std::env::var("PROMPT_SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = std::env::var("PROMPT_SERVER_PORT") {
            config.server.port = parse_env("PROMPT_SERVER_PORT", &v)?;
        }
        if let Ok(v) = std::env::var("PROMPT_SERVER_REQUEST_TIMEOUT_SECONDS") {
            config.server.request_timeout_seconds =
                parse_env("PROMPT_SERVER_REQUEST_TIMEOUT_SECONDS", &v)?;
        }

        if let Ok(v) = std::env::var("PROMPT_DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = std::env::var("PROMPT_DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections = parse_env("PROMPT_DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = std::env::var("PROMPT_DATABASE_ACQUIRE_TIMEOUT_SECONDS") {
            config.database.acquire_timeout_seconds =
                parse_env("PROMPT_DATABASE_ACQUIRE_TIMEOUT_SECONDS", &v)?;
        }

        if let Ok(v) = std::env::var("PROMPT_CATALOG_PATH") {
            config.catalog.path = v;
        }

        if let Ok(v) = std::env::var("PROMPT_CALIBRATION_PATH") {
            config.calibration.path = v;
        }
        if let Ok(v) = std::env::var("PROMPT_CALIBRATION_FALLBACK_THRESHOLD") {
            config.calibration.fallback_threshold =
                parse_env("PROMPT_CALIBRATION_FALLBACK_THRESHOLD", &v)?;
        }

        if let Ok(v) = std::env::var("PROMPT_LLM_PROVIDER") {
            config.llm.provider = v;
        }
        if let Ok(v) = std::env::var("PROMPT_LLM_MODEL") {
            config.llm.model = v;
        }
        if let Ok(v) = std::env::var("PROMPT_LLM_API_BASE") {
            config.llm.api_base = Some(v);
        }
        if let Ok(v) = std::env::var("PROMPT_LLM_TIMEOUT_SECONDS") {
            config.llm.timeout_seconds = parse_env("PROMPT_LLM_TIMEOUT_SECONDS", &v)?;
        }
        if let Ok(v) = std::env::var("PROMPT_LLM_ENABLED") {
            config.llm.enabled = parse_env("PROMPT_LLM_ENABLED", &v)?;
        }

        if let Ok(v) = std::env::var("PROMPT_CACHE_TTL_SECONDS") {
            config.cache.ttl_seconds = parse_env("PROMPT_CACHE_TTL_SECONDS", &v)?;
        }
        if let Ok(v) = std::env::var("PROMPT_CACHE_MAX_ENTRIES") {
            config.cache.max_entries = parse_env("PROMPT_CACHE_MAX_ENTRIES", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads a `PromptServiceConfig` from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<PromptServiceConfig> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::file_io(
                format!("failed to read config file {}: {e}", path.display()),
                ids::FILE_READ_FAILED,
            )
        })?;
        let config: PromptServiceConfig = toml::from_str(&contents).map_err(|e| {
            DomainError::validation(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes `config` to TOML and writes it to `path`, creating
    /// parent directories as needed.
    pub fn save_to_file(config: &PromptServiceConfig, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::file_io(
                    format!("failed to create config directory {}: {e}", parent.display()),
                    ids::FILE_PERMISSION_DENIED,
                )
            })?;
        }
        let toml = toml::to_string_pretty(config).map_err(|e| {
            DomainError::validation(format!("failed to serialize config: {e}"))
        })?;
        std::fs::write(path, toml).map_err(|e| {
            DomainError::file_io(
                format!("failed to write config file {}: {e}", path.display()),
                ids::FILE_PERMISSION_DENIED,
            )
        })
    }

    /// Field-level sanity checks beyond what the type system already
    /// enforces. Mirrors the teacher's `BrainConfig::validate`.
    pub fn validate(config: &PromptServiceConfig) -> Result<()> {
        config.validate()
    }
}

/// Validation extension for `PromptServiceConfig`, kept alongside the
/// loader since validation is only ever invoked on a config that was
/// just loaded from the environment or a file.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for PromptServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_server(&self.server)?;
        validate_database(&self.database)?;
        validate_catalog(&self.catalog)?;
        validate_calibration(&self.calibration)?;
        validate_llm(&self.llm)?;
        validate_cache(&self.cache)?;
        Ok(())
    }
}

fn validate_server(server: &ServerConfig) -> Result<()> {
    if server.host.trim().is_empty() {
        return Err(DomainError::validation("server.host must not be empty"));
    }
    if server.port == 0 {
        return Err(DomainError::validation("server.port must be nonzero"));
    }
    if server.request_timeout_seconds == 0 {
        return Err(DomainError::validation(
            "server.request_timeout_seconds must be nonzero",
        ));
    }
    Ok(())
}

fn validate_database(database: &DatabaseConfig) -> Result<()> {
    if database.url.trim().is_empty() {
        return Err(DomainError::validation("database.url must not be empty"));
    }
    if database.max_connections == 0 {
        return Err(DomainError::validation(
            "database.max_connections must be nonzero",
        ));
    }
    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<()> {
    if catalog.path.trim().is_empty() {
        return Err(DomainError::validation("catalog.path must not be empty"));
    }
    Ok(())
}

fn validate_calibration(calibration: &CalibrationConfig) -> Result<()> {
    if !(0.0..=1.0).contains(&calibration.fallback_threshold) {
        return Err(DomainError::validation(
            "calibration.fallback_threshold must be within [0.0, 1.0]",
        ));
    }
    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<()> {
    if llm.enabled && llm.provider.trim().is_empty() {
        return Err(DomainError::validation(
            "llm.provider must be set when llm.enabled is true",
        ));
    }
    Ok(())
}

fn validate_cache(cache: &CacheConfig) -> Result<()> {
    if cache.max_entries == 0 {
        return Err(DomainError::validation("cache.max_entries must be nonzero"));
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| DomainError::validation(format!("invalid value for {name}: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PromptServiceConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_port_fails_validation() {
        let mut config = PromptServiceConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_fallback_threshold_fails_validation() {
        let mut config = PromptServiceConfig::default();
        config.calibration.fallback_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn llm_enabled_without_provider_fails_validation() {
        let mut config = PromptServiceConfig::default();
        config.llm.enabled = true;
        config.llm.provider = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_a_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = PromptServiceConfig::default();
        config.server.port = 9090;
        config.llm.provider = "anthropic".to_string();

        ConfigLoader::save_to_file(&config, &path).unwrap();
        let loaded = ConfigLoader::from_file(&path).unwrap();

        assert_eq!(loaded.server.port, 9090);
        assert_eq!(loaded.llm.provider, "anthropic");
    }

    #[test]
    fn from_file_rejects_a_missing_path() {
        let result = ConfigLoader::from_file("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn from_env_overrides_the_default_timeout() {
        std::env::set_var("PROMPT_SERVER_REQUEST_TIMEOUT_SECONDS", "45");
        let config = ConfigLoader::from_env().unwrap();
        std::env::remove_var("PROMPT_SERVER_REQUEST_TIMEOUT_SECONDS");
        assert_eq!(config.server.request_timeout_seconds, 45);
    }

    #[test]
    fn from_env_rejects_an_unparseable_override() {
        std::env::set_var("PROMPT_CACHE_MAX_ENTRIES", "not-a-number");
        let result = ConfigLoader::from_env();
        std::env::remove_var("PROMPT_CACHE_MAX_ENTRIES");
        assert!(result.is_err());
    }
}
