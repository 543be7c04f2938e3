use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod comment_repo;
pub mod like_repo;
pub mod playlist_repo;
pub mod subscription_repo;
pub mod tweet_repo;
pub mod user_repo;
pub mod video_repo;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../migrations").run(pool).await
}

/// Result of a toggle on a relationship edge: the edge either came into
/// existence or was removed. Two consecutive toggles always return the edge
/// to its original existence state.
#[derive(Debug, Clone)]
pub enum ToggleOutcome<T> {
    Created(T),
    Removed,
}

impl<T> ToggleOutcome<T> {
    pub fn created(&self) -> bool {
        matches!(self, ToggleOutcome::Created(_))
    }
}
