//! Photonic CLI: build CDN URLs, upload and delete assets, resolve stored media.
//!
//! Configuration comes from PHOTONIC_* environment variables (and `.env`).
//! `resolve` and upload recording need DATABASE_URL.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use photonic_api_client::ApiClient;
use photonic_cli::{connect_repository, init_tracing, metadata_from_args, owner_from_args};
use photonic_core::models::Preset;
use photonic_core::{AppError, AssetUrlBuilder, ErrorMetadata, PhotonicConfig, UploadMode};
use photonic_db::{InMemoryMediaRepository, MediaRepository};
use photonic_services::{FileSource, InMemoryCacheStore, Photonic, UploadRequest};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "photonic", about = "Photonic image asset CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a CDN URL without calling any service
    Url {
        /// Asset UUID assigned by the image API
        asset_uuid: String,
        /// Stored filename
        filename: String,
        /// Preset name ("original" for the untouched upload)
        #[arg(long, default_value = "original")]
        preset: String,
        /// CDN base URL (defaults to PHOTONIC_CDN_ENDPOINT)
        #[arg(long)]
        cdn: Option<String>,
        /// Site UUID (defaults to PHOTONIC_SITE_UUID)
        #[arg(long)]
        site: Option<String>,
    },
    /// Upload an image file
    Upload {
        /// Path to the image
        file: PathBuf,
        #[arg(long)]
        alt: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        caption: Option<String>,
        /// Upload flow: direct or signed (defaults to PHOTONIC_UPLOAD_MODE)
        #[arg(long)]
        mode: Option<UploadMode>,
        /// Owner type to attach the recorded media to
        #[arg(long)]
        owner_kind: Option<String>,
        /// Owner ID to attach the recorded media to
        #[arg(long)]
        owner_id: Option<i64>,
        /// Skip recording the upload in the media table
        #[arg(long)]
        no_record: bool,
    },
    /// Delete an asset from the image API
    Delete {
        /// Asset UUID
        asset_uuid: String,
    },
    /// Resolve a stored media ID to its details and URL
    Resolve {
        /// Media ID
        id: i64,
        #[arg(long, default_value = "original")]
        preset: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

async fn repository(
    config: &PhotonicConfig,
    required: bool,
) -> anyhow::Result<Arc<dyn MediaRepository>> {
    match database_url() {
        Some(url) => Ok(Arc::new(
            connect_repository(&url, &config.media_table).await?,
        )),
        None if required => anyhow::bail!("DATABASE_URL is required for this command"),
        None => {
            tracing::warn!("DATABASE_URL not set; uploads are recorded in memory only");
            Ok(Arc::new(InMemoryMediaRepository::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let result = run(cli).await;

    if let Err(err) = &result {
        if let Some(app_err) = err.downcast_ref::<AppError>() {
            tracing::error!(
                code = app_err.error_code(),
                recoverable = app_err.is_recoverable(),
                "{}",
                app_err.detailed_message()
            );
        }
    }
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = PhotonicConfig::from_env().context("Invalid Photonic configuration")?;

    match cli.command {
        Commands::Url {
            asset_uuid,
            filename,
            preset,
            cdn,
            site,
        } => {
            let urls = AssetUrlBuilder::new(
                cdn.unwrap_or_else(|| config.cdn_endpoint.clone()),
                site.unwrap_or_else(|| config.site_uuid.clone()),
            );
            let preset = Preset::parse(&preset);
            let url = urls.url(&asset_uuid, &filename, &preset);
            print_json(&serde_json::json!({ "preset": preset, "url": url }))?;
        }
        Commands::Upload {
            file,
            alt,
            title,
            description,
            caption,
            mode,
            owner_kind,
            owner_id,
            no_record,
        } => {
            if let Some(mode) = mode {
                config.upload_mode = mode;
            }
            if no_record {
                config.record_uploads = false;
            }

            let request = UploadRequest::new(FileSource::path(file))
                .with_metadata(metadata_from_args(alt, title, description, caption));
            let request = match owner_from_args(owner_kind, owner_id)? {
                Some(owner) => request.with_owner(owner),
                None => request,
            };

            let repository = repository(&config, false).await?;
            let photonic = Photonic::new(
                config,
                repository,
                Arc::new(InMemoryCacheStore::default()),
            )?;
            let outcome = photonic.media.upload(request).await?;
            print_json(&outcome)?;
        }
        Commands::Delete { asset_uuid } => {
            let client = ApiClient::from_config(&config)?;
            let deleted = client
                .delete_asset(&asset_uuid)
                .await
                .map_err(AppError::from)?;
            print_json(&serde_json::json!({
                "asset_uuid": asset_uuid,
                "deleted": deleted,
            }))?;
        }
        Commands::Resolve { id, preset } => {
            let repository = repository(&config, true).await?;
            let photonic = Photonic::new(
                config,
                repository,
                Arc::new(InMemoryCacheStore::default()),
            )?;
            let info = photonic
                .resolver
                .for_id(id)
                .preset(preset)
                .info()
                .await?
                .with_context(|| format!("Media {} not found", id))?;
            print_json(&info)?;
        }
    }

    Ok(())
}
