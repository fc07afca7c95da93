use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

pub type Database = Pool<Postgres>;

pub async fn create_database_pool(database_url: &str) -> anyhow::Result<Database> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    // Test the connection
    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    log::info!("Connected to database and applied migrations");
    Ok(pool)
}
