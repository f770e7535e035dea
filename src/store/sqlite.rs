//! SQLite store implementation.
//!
//! The durable side of the pipeline: one `jobs` table plus a `job_hashtags`
//! side table (the multi-value hashtag index) and an FTS5 table over title,
//! description, and company name. Index set:
//!
//! - unique `(source, job_url)` — the dedup invariant
//! - `source`, `posted_date DESC`, `scraped_at DESC`, `location`, `is_active`
//! - `job_hashtags(tag)` for hashtag intersection queries
//!
//! Nested values (company, contact, skills, hashtags) are stored as JSON
//! text; timestamps as RFC 3339 strings.

use crate::error::StoreError;
use crate::models::{JobPosting, SearchPage};
use crate::store::{page_from, JobStore};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Row};
use tracing::{debug, info};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and run migrations. A failure here is fatal to the caller;
    /// the core does not retry startup connectivity.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connect {
                url: database_url.to_string(),
                source: e,
            })?;

        let store = SqliteStore { pool };
        store.run_migrations().await?;
        info!(url = %database_url, "connected to job store");
        Ok(store)
    }

    /// Private in-memory database, used by tests.
    ///
    /// A single connection keeps every query on the same memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Connect {
                url: "sqlite::memory:".to_string(),
                source: e,
            })?;
        let store = SqliteStore { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                company TEXT NOT NULL,
                location TEXT NOT NULL,
                job_type TEXT NOT NULL,
                experience_level TEXT NOT NULL,
                skills_required TEXT NOT NULL DEFAULT '[]',
                posted_date TEXT NOT NULL,
                job_url TEXT NOT NULL,
                source TEXT NOT NULL,
                contact_info TEXT,
                hashtags TEXT NOT NULL DEFAULT '[]',
                scraped_at TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_jobs_source_url ON jobs(source, job_url);
            CREATE INDEX IF NOT EXISTS idx_jobs_source ON jobs(source);
            CREATE INDEX IF NOT EXISTS idx_jobs_posted_date ON jobs(posted_date DESC);
            CREATE INDEX IF NOT EXISTS idx_jobs_scraped_at ON jobs(scraped_at DESC);
            CREATE INDEX IF NOT EXISTS idx_jobs_location ON jobs(location);
            CREATE INDEX IF NOT EXISTS idx_jobs_is_active ON jobs(is_active);

            CREATE TABLE IF NOT EXISTS job_hashtags (
                job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
                tag TEXT NOT NULL,
                PRIMARY KEY (job_id, tag)
            );
            CREATE INDEX IF NOT EXISTS idx_job_hashtags_tag ON job_hashtags(tag);
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE VIRTUAL TABLE IF NOT EXISTS jobs_fts USING fts5(
                title,
                description,
                company_name
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn find_id_by_key(&self, source: &str, job_url: &str) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT id FROM jobs WHERE source = ? AND job_url = ?")
            .bind(source)
            .bind(job_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<i64, _>("id")))
    }

    async fn fetch_page(
        &self,
        count_sql: &str,
        rows_sql: &str,
        binds: &[String],
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, StoreError> {
        let mut count_query = sqlx::query(count_sql);
        for b in binds {
            count_query = count_query.bind(b);
        }
        let total_count = count_query
            .fetch_one(&self.pool)
            .await?
            .get::<i64, _>(0) as u64;

        let mut rows_query = sqlx::query_as::<_, JobRow>(rows_sql);
        for b in binds {
            rows_query = rows_query.bind(b);
        }
        let rows = rows_query
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        let jobs = rows
            .into_iter()
            .map(JobRow::into_posting)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(page_from(jobs, total_count, offset))
    }
}

#[async_trait]
impl JobStore for SqliteStore {
    async fn save(&self, job: &JobPosting) -> Result<String, StoreError> {
        let mut record = job.clone();
        record.normalize();

        let source = record.source.as_str();
        if let Some(id) = self.find_id_by_key(source, &record.job_url).await? {
            debug!(%source, url = %record.job_url, id, "duplicate posting, keeping existing");
            return Ok(id.to_string());
        }

        let company = serde_json::to_string(&record.company)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let skills = serde_json::to_string(&record.skills_required)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let contact = record
            .contact_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let hashtags = serde_json::to_string(&record.hashtags)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        let insert = sqlx::query(
            r#"
            INSERT INTO jobs (
                title, description, company, location, job_type, experience_level,
                skills_required, posted_date, job_url, source, contact_info,
                hashtags, scraped_at, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.title)
        .bind(&record.description)
        .bind(&company)
        .bind(&record.location)
        .bind(record.job_type.as_str())
        .bind(record.experience_level.as_str())
        .bind(&skills)
        .bind(record.posted_date.to_rfc3339())
        .bind(&record.job_url)
        .bind(source)
        .bind(&contact)
        .bind(&hashtags)
        .bind(record.scraped_at.to_rfc3339())
        .bind(record.is_active)
        .execute(&mut *tx)
        .await;

        let id = match insert {
            Ok(done) => done.last_insert_rowid(),
            Err(e) => {
                // Lost a race with a concurrent save of the same listing.
                let unique = e
                    .as_database_error()
                    .is_some_and(|d| d.is_unique_violation());
                if unique {
                    tx.rollback().await?;
                    return match self.find_id_by_key(source, &record.job_url).await? {
                        Some(id) => Ok(id.to_string()),
                        None => Err(StoreError::Corrupt(format!(
                            "unique violation without a row for {source} {}",
                            record.job_url
                        ))),
                    };
                }
                return Err(e.into());
            }
        };

        for tag in &record.hashtags {
            sqlx::query("INSERT OR IGNORE INTO job_hashtags (job_id, tag) VALUES (?, ?)")
                .bind(id)
                .bind(tag)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "INSERT INTO jobs_fts (rowid, title, description, company_name) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.company.name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id.to_string())
    }

    async fn search(
        &self,
        hashtags: &[String],
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, StoreError> {
        let tags = crate::models::normalize_hashtags(hashtags);
        if tags.is_empty() {
            return Ok(page_from(Vec::new(), 0, offset));
        }

        let placeholders = vec!["?"; tags.len()].join(", ");
        let count_sql = format!(
            "SELECT COUNT(DISTINCT j.id) FROM jobs j \
             JOIN job_hashtags h ON h.job_id = j.id \
             WHERE j.is_active = 1 AND h.tag IN ({placeholders})"
        );
        let rows_sql = format!(
            "SELECT DISTINCT j.* FROM jobs j \
             JOIN job_hashtags h ON h.job_id = j.id \
             WHERE j.is_active = 1 AND h.tag IN ({placeholders}) \
             ORDER BY j.posted_date DESC LIMIT ? OFFSET ?"
        );

        self.fetch_page(&count_sql, &rows_sql, &tags, limit, offset)
            .await
    }

    async fn search_text(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, StoreError> {
        let count_sql = "SELECT COUNT(*) FROM jobs j \
             JOIN jobs_fts ON jobs_fts.rowid = j.id \
             WHERE j.is_active = 1 AND jobs_fts MATCH ?";
        let rows_sql = "SELECT j.* FROM jobs j \
             JOIN jobs_fts ON jobs_fts.rowid = j.id \
             WHERE j.is_active = 1 AND jobs_fts MATCH ? \
             ORDER BY j.posted_date DESC LIMIT ? OFFSET ?";

        let binds = vec![query.to_string()];
        self.fetch_page(count_sql, rows_sql, &binds, limit, offset)
            .await
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<(), StoreError> {
        let row_id: i64 = id
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("malformed posting id {id}")))?;
        let done = sqlx::query("UPDATE jobs SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(row_id)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::Corrupt(format!("no posting with id {id}")));
        }
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: i64,
    title: String,
    description: String,
    company: String,
    location: String,
    job_type: String,
    experience_level: String,
    skills_required: String,
    posted_date: String,
    job_url: String,
    source: String,
    contact_info: Option<String>,
    hashtags: String,
    scraped_at: String,
    is_active: bool,
}

impl JobRow {
    fn into_posting(self) -> Result<JobPosting, StoreError> {
        let posted_date = chrono::DateTime::parse_from_rfc3339(&self.posted_date)
            .map_err(|e| StoreError::Corrupt(format!("invalid posted_date: {e}")))?
            .with_timezone(&Utc);
        let scraped_at = chrono::DateTime::parse_from_rfc3339(&self.scraped_at)
            .map_err(|e| StoreError::Corrupt(format!("invalid scraped_at: {e}")))?
            .with_timezone(&Utc);

        Ok(JobPosting {
            id: Some(self.id.to_string()),
            title: self.title,
            description: self.description,
            company: serde_json::from_str(&self.company)
                .map_err(|e| StoreError::Corrupt(format!("invalid company JSON: {e}")))?,
            location: self.location,
            job_type: self
                .job_type
                .parse()
                .map_err(StoreError::Corrupt)?,
            experience_level: self
                .experience_level
                .parse()
                .map_err(StoreError::Corrupt)?,
            skills_required: serde_json::from_str(&self.skills_required)
                .map_err(|e| StoreError::Corrupt(format!("invalid skills JSON: {e}")))?,
            posted_date,
            job_url: self.job_url,
            source: self.source.parse().map_err(StoreError::Corrupt)?,
            contact_info: self
                .contact_info
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .map_err(|e| StoreError::Corrupt(format!("invalid contact JSON: {e}")))?,
            hashtags: serde_json::from_str(&self.hashtags)
                .map_err(|e| StoreError::Corrupt(format!("invalid hashtags JSON: {e}")))?,
            scraped_at,
            is_active: self.is_active,
        })
    }
}
