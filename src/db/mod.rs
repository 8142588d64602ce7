use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::checks::{CachedCheck, NewCheck};

use crate::entities::{idea_checks, user_profiles, user_searches};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to an in-memory SQLite database is
        // a separate database; the pool must stay at one connection.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn check_repo(&self) -> repositories::checks::CheckRepository {
        repositories::checks::CheckRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profiles::ProfileRepository {
        repositories::profiles::ProfileRepository::new(self.conn.clone())
    }

    fn search_repo(&self) -> repositories::searches::SearchRepository {
        repositories::searches::SearchRepository::new(self.conn.clone())
    }

    fn analytics_repo(&self) -> repositories::analytics::AnalyticsRepository {
        repositories::analytics::AnalyticsRepository::new(self.conn.clone())
    }

    pub async fn find_check(&self, fingerprint: &str) -> Result<Option<CachedCheck>> {
        self.check_repo().find(fingerprint).await
    }

    pub async fn record_check_hit(&self, fingerprint: &str) -> Result<()> {
        self.check_repo().record_hit(fingerprint).await
    }

    pub async fn insert_check(&self, check: NewCheck<'_>) -> Result<CachedCheck> {
        self.check_repo().insert(check).await
    }

    pub async fn popular_checks(&self, limit: u64) -> Result<Vec<idea_checks::Model>> {
        self.check_repo().popular(limit).await
    }

    pub async fn count_checks(&self) -> Result<u64> {
        self.check_repo().count().await
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<user_profiles::Model>> {
        self.profile_repo().get(user_id).await
    }

    pub async fn bump_profile_search_stats(&self, user_id: &str, today: &str) -> Result<()> {
        self.profile_repo().bump_search_stats(user_id, today).await
    }

    pub async fn insert_profile(&self, profile: user_profiles::Model) -> Result<()> {
        self.profile_repo().insert(profile).await
    }

    pub async fn record_user_search(
        &self,
        user_id: &str,
        idea_check_id: &str,
        idea: &str,
        overall_score: i32,
        verdict: &str,
    ) -> Result<()> {
        self.search_repo()
            .record(user_id, idea_check_id, idea, overall_score, verdict)
            .await
    }

    pub async fn user_search_history(
        &self,
        user_id: &str,
        limit: u64,
    ) -> Result<Vec<user_searches::Model>> {
        self.search_repo().history(user_id, limit).await
    }

    pub async fn record_event(
        &self,
        event_name: &str,
        event_data: &str,
        user_id: Option<&str>,
    ) -> Result<()> {
        self.analytics_repo()
            .record(event_name, event_data, user_id)
            .await
    }
}
