use crate::domain::context::Context;
use crate::domain::errors::DownloadError;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Downloads `url` to `dest`. On any failure nothing is left at `dest`.
    async fn download_file(&self, ctx: &Context, url: &str, dest: &Path) -> Result<(), DownloadError>;

    async fn fetch_text(&self, ctx: &Context, url: &str) -> Result<String, DownloadError>;
}
