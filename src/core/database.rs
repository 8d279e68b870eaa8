// src/core/database.rs
//! SQLite-backed job store: discovered postings, scrape sessions and
//! caller-owned job tables.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::job_aggregation::store::{DedupScope, JobStore, ScrapeSession, SessionStatus};
use crate::job_aggregation::types::{JobPosting, Platform};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS job_links (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_url TEXT NOT NULL,
        job_url_hash TEXT NOT NULL UNIQUE,
        job_title TEXT,
        company_name TEXT,
        ats_platform TEXT NOT NULL,
        location TEXT,
        posting_date TEXT,
        search_query TEXT,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS scrape_sessions (
        id TEXT PRIMARY KEY,
        query TEXT NOT NULL,
        platforms TEXT NOT NULL,
        requested_limit INTEGER NOT NULL,
        jobs_found INTEGER NOT NULL DEFAULT 0,
        duplicates_filtered INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        completed_at TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_job_tables (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_table_jobs (
        table_id TEXT NOT NULL REFERENCES user_job_tables(id) ON DELETE CASCADE,
        job_url_hash TEXT NOT NULL,
        job_url TEXT NOT NULL,
        job_title TEXT,
        company_name TEXT,
        ats_platform TEXT NOT NULL,
        location TEXT,
        posting_date TEXT,
        created_at TEXT NOT NULL,
        PRIMARY KEY (table_id, job_url_hash)
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_scrape_sessions_created_at ON scrape_sessions(created_at);",
    "CREATE INDEX IF NOT EXISTS idx_job_links_ats_platform ON job_links(ats_platform);",
];

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_path.display()))?;

        info!("Database connection established: {}", database_path.display());

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Single-connection in-memory store; the data lives as long as the pool.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Database migration failed")?;
        }
        debug!("Database migrations completed");
        Ok(())
    }

    pub fn tables(&self) -> JobTableRepository<'_> {
        JobTableRepository::new(&self.pool)
    }

    pub async fn find_session(&self, session_id: &str) -> Result<Option<ScrapeSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, query, platforms, requested_limit, jobs_found, duplicates_filtered,
                   status, created_at, completed_at
            FROM scrape_sessions
            WHERE id = ?
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn table_exists(&self, table_id: &str) -> Result<bool> {
        let found: Option<(String,)> = sqlx::query_as("SELECT id FROM user_job_tables WHERE id = ?")
            .bind(table_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    query: String,
    platforms: String,
    requested_limit: i64,
    jobs_found: i64,
    duplicates_filtered: i64,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    fn into_session(self) -> Result<ScrapeSession> {
        let platforms: Vec<Platform> =
            serde_json::from_str(&self.platforms).context("Corrupt platform list on scrape session")?;
        Ok(ScrapeSession {
            id: self.id,
            query: self.query,
            platforms,
            requested_limit: u32::try_from(self.requested_limit).unwrap_or_default(),
            jobs_found: u64::try_from(self.jobs_found).unwrap_or_default(),
            duplicates_filtered: u64::try_from(self.duplicates_filtered).unwrap_or_default(),
            status: SessionStatus::from_str(&self.status)?,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

#[async_trait]
impl JobStore for Database {
    async fn load_existing_hashes(&self, scope: &DedupScope) -> Result<HashSet<String>> {
        let rows: Vec<(String,)> = match scope {
            DedupScope::Global => {
                sqlx::query_as("SELECT job_url_hash FROM job_links")
                    .fetch_all(&self.pool)
                    .await?
            }
            DedupScope::Table(table_id) => {
                sqlx::query_as("SELECT job_url_hash FROM user_table_jobs WHERE table_id = ?")
                    .bind(table_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        debug!("Loaded {} existing hashes for {}", rows.len(), scope);
        Ok(rows.into_iter().map(|(hash,)| hash).collect())
    }

    async fn create_session(&self, query: &str, platforms: &[Platform], requested_limit: u32) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let platforms = serde_json::to_string(platforms)?;

        sqlx::query(
            r#"
            INSERT INTO scrape_sessions (id, query, platforms, requested_limit, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(query)
        .bind(platforms)
        .bind(i64::from(requested_limit))
        .bind(SessionStatus::InProgress.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to create scrape session")?;

        Ok(id)
    }

    async fn insert_postings(&self, postings: &[JobPosting], scope: &DedupScope, search_query: &str) -> Result<u64> {
        if postings.is_empty() {
            return Ok(0);
        }
        if let DedupScope::Table(table_id) = scope {
            if !self.table_exists(table_id).await? {
                anyhow::bail!("Job table '{}' does not exist", table_id);
            }
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for posting in postings {
            let result = match scope {
                DedupScope::Global => {
                    sqlx::query(
                        r#"
                        INSERT OR IGNORE INTO job_links
                            (job_url, job_url_hash, job_title, company_name, ats_platform,
                             location, posting_date, search_query, created_at)
                        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(&posting.url)
                    .bind(&posting.url_hash)
                    .bind(&posting.title)
                    .bind(&posting.company)
                    .bind(posting.platform.id())
                    .bind(&posting.location)
                    .bind(posting.posted_at)
                    .bind(search_query)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?
                }
                DedupScope::Table(table_id) => {
                    sqlx::query(
                        r#"
                        INSERT OR IGNORE INTO user_table_jobs
                            (table_id, job_url_hash, job_url, job_title, company_name,
                             ats_platform, location, posting_date, created_at)
                        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(table_id)
                    .bind(&posting.url_hash)
                    .bind(&posting.url)
                    .bind(&posting.title)
                    .bind(&posting.company)
                    .bind(posting.platform.id())
                    .bind(&posting.location)
                    .bind(posting.posted_at)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?
                }
            };
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        debug!(
            "Stored {} new of {} postings into {}",
            inserted,
            postings.len(),
            scope
        );
        Ok(inserted)
    }

    async fn complete_session(&self, session_id: &str, jobs_found: usize, duplicates_filtered: usize) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE scrape_sessions
            SET status = ?, jobs_found = ?, duplicates_filtered = ?, completed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(SessionStatus::Completed.as_str())
        .bind(i64::try_from(jobs_found).unwrap_or(i64::MAX))
        .bind(i64::try_from(duplicates_filtered).unwrap_or(i64::MAX))
        .bind(Utc::now())
        .bind(session_id)
        .execute(&self.pool)
        .await
        .context("Failed to complete scrape session")?;

        if result.rows_affected() == 0 {
            warn!("No scrape session {} to complete", session_id);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== Job tables =====

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobTable {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub job_count: i64,
}

pub struct JobTableRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobTableRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str) -> Result<JobTable> {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Table name must not be empty");
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query("INSERT INTO user_job_tables (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(now)
            .execute(self.pool)
            .await
            .with_context(|| format!("Failed to create job table '{}'", name))?;

        info!("Created job table '{}' ({})", name, id);
        Ok(JobTable {
            id,
            name: name.to_string(),
            created_at: now,
            job_count: 0,
        })
    }

    pub async fn list(&self) -> Result<Vec<JobTable>> {
        let tables = sqlx::query_as::<_, JobTable>(
            r#"
            SELECT t.id, t.name, t.created_at, COUNT(j.job_url_hash) AS job_count
            FROM user_job_tables t
            LEFT JOIN user_table_jobs j ON j.table_id = t.id
            GROUP BY t.id, t.name, t.created_at
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(tables)
    }

    /// Accepts either the table id or its name.
    pub async fn delete(&self, id_or_name: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let found: Option<(String,)> = sqlx::query_as("SELECT id FROM user_job_tables WHERE id = ? OR name = ?")
            .bind(id_or_name)
            .bind(id_or_name)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((table_id,)) = found else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM user_table_jobs WHERE table_id = ?")
            .bind(&table_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_job_tables WHERE id = ?")
            .bind(&table_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Deleted job table {}", table_id);
        Ok(true)
    }
}
