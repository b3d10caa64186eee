use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connection pool for the log store. Schema is managed externally, so no
/// migrations run here.
pub async fn create_pool(database_url: &str, max_connections: u32) -> PgPool {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await
        .expect("Failed to create database pool")
}
