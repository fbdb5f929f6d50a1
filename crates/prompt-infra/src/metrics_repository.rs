//! Metrics Repository (spec.md §4.11). A single SQLite table keyed by
//! `prompt_id`, sub-metrics stored verbatim as JSON columns. Grounded
//! in the teacher's `DatabaseManager`: a `SqlitePool` behind a small
//! wrapper that owns schema creation and exposes typed operations.
//! Concurrent callers are serialized by the pool itself (spec.md §5);
//! no additional locking is needed since each operation is one
//! statement.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use prompt_core::{
    ImpactMetrics, PerformanceMetrics, PromptMetrics, QualityMetrics,
};
use prompt_types::{ids, DomainError, FrameworkType, Id, Result};

use crate::exception_mapper::map_db_error;

pub struct MetricsRepository {
    pool: SqlitePool,
}

impl MetricsRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| map_db_error(&e, "connect", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    /// Creates the metrics table if absent. Idempotent; safe to call
    /// on every startup.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prompt_metrics (
                prompt_id TEXT PRIMARY KEY,
                original_idea TEXT NOT NULL,
                improved_prompt TEXT NOT NULL,
                quality_json TEXT NOT NULL,
                performance_json TEXT NOT NULL,
                impact_json TEXT NOT NULL,
                measured_at TEXT NOT NULL,
                framework TEXT NOT NULL,
                provider TEXT NOT NULL,
                model TEXT NOT NULL,
                backend TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(&e, "initialize_schema", "prompt_metrics"))?;

        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Upserts `metrics` by `prompt_id`.
    pub async fn save(&self, metrics: &PromptMetrics) -> Result<()> {
        let quality_json = serde_json::to_string(&metrics.quality)
            .map_err(|e| DomainError::data_corruption(e.to_string(), ids::DATA_CORRUPTION_METRICS))?;
        let performance_json = serde_json::to_string(&metrics.performance)
            .map_err(|e| DomainError::data_corruption(e.to_string(), ids::DATA_CORRUPTION_METRICS))?;
        let impact_json = serde_json::to_string(&metrics.impact)
            .map_err(|e| DomainError::data_corruption(e.to_string(), ids::DATA_CORRUPTION_METRICS))?;

        sqlx::query(
            r#"
            INSERT INTO prompt_metrics
                (prompt_id, original_idea, improved_prompt, quality_json, performance_json,
                 impact_json, measured_at, framework, provider, model, backend)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(prompt_id) DO UPDATE SET
                original_idea = excluded.original_idea,
                improved_prompt = excluded.improved_prompt,
                quality_json = excluded.quality_json,
                performance_json = excluded.performance_json,
                impact_json = excluded.impact_json,
                measured_at = excluded.measured_at,
                framework = excluded.framework,
                provider = excluded.provider,
                model = excluded.model,
                backend = excluded.backend
            "#,
        )
        .bind(metrics.prompt_id.to_string())
        .bind(&metrics.original_idea)
        .bind(&metrics.improved_prompt)
        .bind(quality_json)
        .bind(performance_json)
        .bind(impact_json)
        .bind(metrics.measured_at.to_rfc3339())
        .bind(metrics.framework.to_string())
        .bind(&metrics.provider)
        .bind(&metrics.model)
        .bind(&metrics.backend)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(&e, "save", "prompt_metrics"))?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: Id) -> Result<Option<PromptMetrics>> {
        let row = sqlx::query("SELECT * FROM prompt_metrics WHERE prompt_id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(&e, "get_by_id", "prompt_metrics"))?;

        row.map(row_to_metrics).transpose()
    }

    pub async fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<PromptMetrics>> {
        let rows = sqlx::query(
            "SELECT * FROM prompt_metrics ORDER BY measured_at DESC LIMIT ?1 OFFSET ?2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(&e, "get_all", "prompt_metrics"))?;

        rows.into_iter().map(row_to_metrics).collect()
    }

    pub async fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PromptMetrics>> {
        let rows = sqlx::query(
            "SELECT * FROM prompt_metrics WHERE measured_at >= ?1 AND measured_at <= ?2 ORDER BY measured_at DESC LIMIT ?3",
        )
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(&e, "get_by_date_range", "prompt_metrics"))?;

        rows.into_iter().map(row_to_metrics).collect()
    }
}

fn row_to_metrics(row: sqlx::sqlite::SqliteRow) -> Result<PromptMetrics> {
    let prompt_id: String = row.get("prompt_id");
    let quality_json: String = row.get("quality_json");
    let performance_json: String = row.get("performance_json");
    let impact_json: String = row.get("impact_json");
    let measured_at: String = row.get("measured_at");
    let framework: String = row.get("framework");

    let quality: QualityMetrics = serde_json::from_str(&quality_json)
        .map_err(|e| DomainError::data_corruption(e.to_string(), ids::DATA_CORRUPTION_METRICS))?;
    let performance: PerformanceMetrics = serde_json::from_str(&performance_json)
        .map_err(|e| DomainError::data_corruption(e.to_string(), ids::DATA_CORRUPTION_METRICS))?;
    let impact: ImpactMetrics = serde_json::from_str(&impact_json)
        .map_err(|e| DomainError::data_corruption(e.to_string(), ids::DATA_CORRUPTION_METRICS))?;

    Ok(PromptMetrics {
        prompt_id: prompt_id
            .parse()
            .map_err(|_| DomainError::data_corruption("invalid prompt_id in row", ids::DATA_CORRUPTION_METRICS))?,
        original_idea: row.get("original_idea"),
        improved_prompt: row.get("improved_prompt"),
        quality,
        performance,
        impact,
        measured_at: DateTime::parse_from_rfc3339(&measured_at)
            .map_err(|e| DomainError::data_corruption(e.to_string(), ids::DATA_CORRUPTION_METRICS))?
            .with_timezone(&Utc),
        framework: FrameworkType::from_str_lenient(&framework),
        provider: row.get("provider"),
        model: row.get("model"),
        backend: row.get("backend"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use prompt_types::new_id;

    fn sample_metrics() -> PromptMetrics {
        PromptMetrics {
            prompt_id: new_id(),
            original_idea: "write a function".to_string(),
            improved_prompt: "## Role\nYou are...".to_string(),
            quality: QualityMetrics {
                coherence_score: 0.8,
                relevance_score: 0.8,
                completeness_score: 0.8,
                clarity_score: 0.8,
                guardrails_count: 3,
                has_required_structure: true,
            },
            performance: PerformanceMetrics {
                latency_ms: 500,
                total_tokens: 200,
                cost_usd: 0.01,
                provider: "openai".to_string(),
                model: "gpt-4".to_string(),
                backend: "nlac".to_string(),
            },
            impact: ImpactMetrics::default(),
            measured_at: Utc::now(),
            framework: FrameworkType::ChainOfThought,
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            backend: "nlac".to_string(),
        }
    }

    #[tokio::test]
    async fn save_then_get_by_id_round_trips() {
        let repo = MetricsRepository::new_in_memory().await.unwrap();
        repo.initialize().await.unwrap();

        let metrics = sample_metrics();
        repo.save(&metrics).await.unwrap();

        let fetched = repo.get_by_id(metrics.prompt_id).await.unwrap().unwrap();
        assert_eq!(fetched.original_idea, metrics.original_idea);
        assert_eq!(fetched.quality.guardrails_count, 3);
    }

    #[tokio::test]
    async fn save_is_an_upsert_by_prompt_id() {
        let repo = MetricsRepository::new_in_memory().await.unwrap();
        repo.initialize().await.unwrap();

        let mut metrics = sample_metrics();
        repo.save(&metrics).await.unwrap();

        metrics.original_idea = "a different idea".to_string();
        repo.save(&metrics).await.unwrap();

        let all = repo.get_all(10, 0).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].original_idea, "a different idea");
    }

    #[tokio::test]
    async fn get_by_id_returns_none_for_unknown_id() {
        let repo = MetricsRepository::new_in_memory().await.unwrap();
        repo.initialize().await.unwrap();
        assert!(repo.get_by_id(new_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_by_date_range_excludes_out_of_range_rows() {
        let repo = MetricsRepository::new_in_memory().await.unwrap();
        repo.initialize().await.unwrap();

        let mut old = sample_metrics();
        old.measured_at = Utc::now() - ChronoDuration::days(30);
        repo.save(&old).await.unwrap();

        let recent = sample_metrics();
        repo.save(&recent).await.unwrap();

        let start = Utc::now() - ChronoDuration::days(1);
        let end = Utc::now() + ChronoDuration::days(1);
        let rows = repo.get_by_date_range(start, end, 10).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].prompt_id, recent.prompt_id);
    }

    #[tokio::test]
    async fn get_all_honors_limit_and_offset() {
        let repo = MetricsRepository::new_in_memory().await.unwrap();
        repo.initialize().await.unwrap();

        for _ in 0..3 {
            repo.save(&sample_metrics()).await.unwrap();
        }

        let page = repo.get_all(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
    }
}
