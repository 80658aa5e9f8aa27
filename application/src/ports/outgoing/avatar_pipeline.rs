use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AppResult;
use domain::account::AccountId;

#[async_trait::async_trait]
pub trait AvatarPipelinePort: Send + Sync {
    /// Fetches a remote image into a local file owned by the pipeline.
    async fn download_from_url(&self, url: &str) -> AppResult<PathBuf>;
    /// Stores a local image for `owner` and returns its stable public URL.
    /// Bytes that do not decode as an image yield `UnsupportedImage`.
    async fn upload(&self, owner: &AccountId, local_path: &Path) -> AppResult<String>;
    /// Removes a file produced by `download_from_url`.
    async fn discard(&self, local_path: &Path);
    /// Deletes an avatar previously returned by `upload`. Unknown URLs are ignored.
    async fn unpublish(&self, avatar_url: &str);
}

pub type DynAvatarPipelinePort = Arc<dyn AvatarPipelinePort>;
