use crate::domain::context::Context;
use crate::domain::entities::InstallerConfig;
use crate::domain::errors::DownloadError;
use crate::domain::ports::NetworkClient;
use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};

const WRITE_BUFFER_SIZE: usize = 32 * 1024;
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Downloads over HTTP(S) with a fixed user agent.
///
/// Transfers stream into `<dest>.part` and only appear at `dest` once
/// complete. Callers without a deadline get the configured default.
pub struct HttpNetworkClient {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HttpNetworkClient {
    pub fn new(config: &InstallerConfig) -> anyhow::Result<Self> {
        Self::with_settings(&config.user_agent, config.download_timeout())
    }

    pub fn with_settings(user_agent: &str, default_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            default_timeout,
        })
    }

    fn scoped(&self, ctx: &Context) -> Context {
        if ctx.has_deadline() {
            ctx.clone()
        } else {
            ctx.with_timeout(self.default_timeout)
        }
    }

    fn part_path(dest: &Path) -> PathBuf {
        let mut name = dest
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        dest.with_file_name(name)
    }

    fn transport(url: &str, error: reqwest::Error) -> DownloadError {
        DownloadError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    fn write_error(url: &str, path: &Path, error: std::io::Error) -> DownloadError {
        DownloadError::Write {
            url: url.to_string(),
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }

    async fn send(&self, url: &str, accept: Option<&str>) -> Result<reqwest::Response, DownloadError> {
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }
        let response = request.send().await.map_err(|e| Self::transport(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn stream_to(&self, url: &str, part: &Path) -> Result<u64, DownloadError> {
        let mut response = self.send(url, None).await?;

        if let Some(parent) = part.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::write_error(url, part, e))?;
        }
        let file = tokio::fs::File::create(part)
            .await
            .map_err(|e| Self::write_error(url, part, e))?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| Self::transport(url, e))? {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| Self::write_error(url, part, e))?;
            written += chunk.len() as u64;
        }
        writer
            .flush()
            .await
            .map_err(|e| Self::write_error(url, part, e))?;
        Ok(written)
    }
}

#[async_trait]
impl NetworkClient for HttpNetworkClient {
    async fn download_file(&self, ctx: &Context, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let ctx = self.scoped(ctx);
        let part = Self::part_path(dest);
        tracing::debug!("Downloading {} to {}", url, dest.display());

        let outcome = match ctx.run(self.stream_to(url, &part)).await {
            Ok(result) => result,
            Err(reason) => Err(DownloadError::Interrupted {
                url: url.to_string(),
                reason,
            }),
        };

        let written = match outcome {
            Ok(written) => written,
            Err(e) => {
                // the writer is dropped by now, so the partial file can go
                let _ = tokio::fs::remove_file(&part).await;
                tracing::debug!("Download of {} failed: {}", url, e);
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&part, dest).await {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(Self::write_error(url, dest, e));
        }
        tracing::debug!("Downloaded {} bytes from {}", written, url);
        Ok(())
    }

    async fn fetch_text(&self, ctx: &Context, url: &str) -> Result<String, DownloadError> {
        let ctx = self.scoped(ctx);
        let fetch = async {
            let response = self.send(url, Some(GITHUB_ACCEPT)).await?;
            response.text().await.map_err(|e| Self::transport(url, e))
        };

        match ctx.run(fetch).await {
            Ok(result) => result,
            Err(reason) => Err(DownloadError::Interrupted {
                url: url.to_string(),
                reason,
            }),
        }
    }
}
