//! Catalog Repository (spec.md §4.1). Pure I/O: reads the catalog
//! artifact from disk and hands back the raw JSON array, unwrapping
//! the `{"examples": [...]}` shape when present. Domain validation
//! (parsing into `Exemplar`, skip-rate policy) happens in
//! `prompt_core::catalog`/`prompt_core::knn`, not here. Grounded in
//! the teacher's `FileSystemManager` read path.

use std::path::{Path, PathBuf};

use prompt_types::{ids, DomainError, Result};
use prompt_core::CatalogSource;
use serde_json::Value;

pub struct FileSystemCatalogRepository {
    path: PathBuf,
}

impl FileSystemCatalogRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogSource for FileSystemCatalogRepository {
    fn load_catalog(&self) -> Result<Vec<Value>> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            let error_id = if e.kind() == std::io::ErrorKind::NotFound {
                ids::FILE_NOT_FOUND
            } else {
                ids::FILE_READ_FAILED
            };
            DomainError::file_io(
                format!("failed to read catalog file {}: {e}", self.path.display()),
                error_id,
            )
            .with_context("path", self.path.display().to_string())
        })?;

        let document: Value = serde_json::from_str(&raw).map_err(|e| {
            DomainError::data_corruption(
                format!(
                    "catalog file {} is not valid JSON (line {}, column {}): {e}",
                    self.path.display(),
                    e.line(),
                    e.column()
                ),
                ids::DATA_CORRUPTION_CATALOG,
            )
            .with_context("path", self.path.display().to_string())
            .with_context("line", e.line().to_string())
            .with_context("column", e.column().to_string())
        })?;

        match document {
            Value::Array(entries) => Ok(entries),
            Value::Object(mut map) => match map.remove("examples") {
                Some(Value::Array(entries)) => Ok(entries),
                _ => Err(DomainError::data_corruption(
                    format!(
                        "catalog file {} is an object without an \"examples\" array",
                        self.path.display()
                    ),
                    ids::DATA_CORRUPTION_CATALOG,
                )),
            },
            other => Err(DomainError::data_corruption(
                format!(
                    "catalog file {} has unsupported shape {}",
                    self.path.display(),
                    other
                ),
                ids::DATA_CORRUPTION_CATALOG,
            )),
        }
    }
}
