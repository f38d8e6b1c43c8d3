use std::time::Duration;

use anyhow::Context;
use photonic_core::models::{AssetMetadata, OwnerRef};
use photonic_db::PgMediaRepository;
use sqlx::postgres::PgPoolOptions;

/// Build an owner reference from the `--owner-kind` / `--owner-id` pair.
/// Both or neither must be given.
pub fn owner_from_args(kind: Option<String>, id: Option<i64>) -> anyhow::Result<Option<OwnerRef>> {
    match (kind, id) {
        (Some(kind), Some(id)) => Ok(Some(OwnerRef::new(kind, id)?)),
        (None, None) => Ok(None),
        _ => anyhow::bail!("--owner-kind and --owner-id must be given together"),
    }
}

/// Metadata from optional flags. Blank values are dropped.
pub fn metadata_from_args(
    alt: Option<String>,
    title: Option<String>,
    description: Option<String>,
    caption: Option<String>,
) -> AssetMetadata {
    let keep = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    AssetMetadata {
        alt: keep(alt),
        title: keep(title),
        description: keep(description),
        caption: keep(caption),
    }
}

/// Connect to the media table and make sure it exists.
pub async fn connect_repository(
    database_url: &str,
    table: &str,
) -> anyhow::Result<PgMediaRepository> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .context("Failed to connect to DATABASE_URL")?;

    let repository = PgMediaRepository::new(pool, table)?;
    repository
        .ensure_schema()
        .await
        .context("Failed to prepare media table")?;
    Ok(repository)
}

/// Initialize tracing for the CLI. Logs go to stderr so JSON output stays clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
