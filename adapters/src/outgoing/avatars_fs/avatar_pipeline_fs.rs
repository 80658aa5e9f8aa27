use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_LENGTH;
use tokio::{fs, task};
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use domain::account::AccountId;
use social_accounts_application::{
    error::{AppError, AppResult},
    infrastructure_config::AvatarConfig,
    ports::outgoing::avatar_pipeline::AvatarPipelinePort,
};

use crate::outgoing::image_rs::webp_avatar_image::{WebpAvatarConfig, WebpAvatarEncoder};

const AVATARS_DIR: &str = "avatars";
const DOWNLOADS_DIR: &str = "tmp";

/// Stores avatars as WebP files under `storage_dir/avatars/<account-id>/`.
///
/// Downloads land in `storage_dir/tmp/` and are re-encoded on upload, so
/// whatever the source served, only bounded WebP files are ever published.
pub struct FilesystemAvatarPipeline {
    storage_dir: PathBuf,
    public_url_prefix: String,
    max_download_bytes: usize,
    http_client: reqwest::Client,
    encoder: Arc<WebpAvatarEncoder>,
}

fn ingestion_error(message: impl Into<String>) -> AppError {
    AppError::AvatarIngestion {
        message: message.into(),
    }
}

impl FilesystemAvatarPipeline {
    pub fn new(config: &AvatarConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(|e| AppError::ConfigError {
                message: format!("Failed to build avatar HTTP client: {e}"),
            })?;

        Ok(Self {
            storage_dir: PathBuf::from(&config.storage_dir),
            public_url_prefix: config.public_url_prefix.trim_end_matches('/').to_string(),
            max_download_bytes: config.max_download_bytes,
            http_client,
            encoder: Arc::new(WebpAvatarEncoder::new(WebpAvatarConfig {
                max_dimension: config.max_dimension,
            })),
        })
    }

    fn parse_source_url(url: &str) -> AppResult<Url> {
        let parsed =
            Url::parse(url).map_err(|e| ingestion_error(format!("Invalid avatar URL: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(ingestion_error(format!(
                "Unsupported avatar URL scheme: {scheme}"
            ))),
        }
    }

    /// Maps a URL returned by `upload` back to its file. Only
    /// `<prefix>/avatars/<uuid>/<uuid>.webp` is accepted.
    fn published_path(&self, avatar_url: &str) -> Option<PathBuf> {
        let relative = avatar_url
            .strip_prefix(&self.public_url_prefix)?
            .strip_prefix('/')?
            .strip_prefix(AVATARS_DIR)?
            .strip_prefix('/')?;
        let (owner, file_name) = relative.split_once('/')?;
        let stem = file_name.strip_suffix(".webp")?;
        Uuid::parse_str(owner).ok()?;
        Uuid::parse_str(stem).ok()?;

        Some(self.storage_dir.join(AVATARS_DIR).join(owner).join(file_name))
    }

    async fn fetch_bounded(&self, url: Url) -> AppResult<Vec<u8>> {
        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ingestion_error(format!("Avatar download failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ingestion_error(format!(
                "Avatar download returned {}",
                response.status()
            )));
        }

        let declared_len = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<usize>().ok());
        if declared_len.is_some_and(|len| len > self.max_download_bytes) {
            return Err(ingestion_error("Avatar exceeds the download size limit"));
        }

        let mut body = Vec::with_capacity(declared_len.unwrap_or_default());
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ingestion_error(format!("Avatar download failed: {e}")))?
        {
            if body.len() + chunk.len() > self.max_download_bytes {
                return Err(ingestion_error("Avatar exceeds the download size limit"));
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            return Err(ingestion_error("Avatar download returned an empty body"));
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl AvatarPipelinePort for FilesystemAvatarPipeline {
    #[instrument(skip(self))]
    async fn download_from_url(&self, url: &str) -> AppResult<PathBuf> {
        let source = Self::parse_source_url(url)?;
        let body = self.fetch_bounded(source).await?;

        let downloads_dir = self.storage_dir.join(DOWNLOADS_DIR);
        fs::create_dir_all(&downloads_dir)
            .await
            .map_err(|e| ingestion_error(format!("Cannot prepare download directory: {e}")))?;
        let local_path = downloads_dir.join(format!("{}.download", Uuid::new_v4()));
        fs::write(&local_path, &body)
            .await
            .map_err(|e| ingestion_error(format!("Cannot save avatar download: {e}")))?;

        debug!("Downloaded avatar ({} bytes) to {}", body.len(), local_path.display());
        Ok(local_path)
    }

    #[instrument(skip(self), fields(owner = %owner))]
    async fn upload(&self, owner: &AccountId, local_path: &Path) -> AppResult<String> {
        let source_bytes = fs::read(local_path)
            .await
            .map_err(|e| ingestion_error(format!("Cannot read avatar source: {e}")))?;

        let encoder = Arc::clone(&self.encoder);
        let webp_bytes = task::spawn_blocking(move || encoder.encode(&source_bytes))
            .await
            .map_err(|e| ingestion_error(format!("Avatar encoding task failed: {e}")))??;

        let owner_dir = self.storage_dir.join(AVATARS_DIR).join(owner.to_string());
        fs::create_dir_all(&owner_dir)
            .await
            .map_err(|e| ingestion_error(format!("Cannot prepare avatar directory: {e}")))?;
        let file_name = format!("{}.webp", Uuid::new_v4());
        fs::write(owner_dir.join(&file_name), &webp_bytes)
            .await
            .map_err(|e| ingestion_error(format!("Cannot store avatar: {e}")))?;

        let public_url = format!(
            "{}/{AVATARS_DIR}/{owner}/{file_name}",
            self.public_url_prefix
        );
        debug!("Stored avatar at {}", public_url);
        Ok(public_url)
    }

    async fn discard(&self, local_path: &Path) {
        remove_quietly(local_path).await;
    }

    async fn unpublish(&self, avatar_url: &str) {
        match self.published_path(avatar_url) {
            Some(path) => remove_quietly(&path).await,
            None => debug!("Not a published avatar, nothing to remove: {}", avatar_url),
        }
    }
}

async fn remove_quietly(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}
