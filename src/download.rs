//! HTTP(S) archive download that follows redirect chains by hand, so every hop
//! is logged and bounded.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::LOCATION;
use reqwest::{redirect, Client, StatusCode, Url};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::contract::ArchiveFetcher;
use crate::error::{Error, Result};

pub const MAX_REDIRECTS: usize = 10;

pub struct HttpFetcher {
    client: Client,
    max_redirects: usize,
}

impl HttpFetcher {
    /// `timeout` bounds each request from connect to the last body byte.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Download {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            max_redirects: MAX_REDIRECTS,
        })
    }

    async fn fetch_inner(&self, url: &str, dest: &Path) -> Result<u64> {
        let download_error = |reason: String| Error::Download {
            url: url.to_string(),
            reason,
        };

        let mut current = Url::parse(url).map_err(|e| download_error(format!("invalid URL: {e}")))?;
        let mut hops = 0;

        let response = loop {
            debug!(url = %current, hop = hops, "Requesting archive");
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| download_error(e.to_string()))?;

            let status = response.status();
            if !is_redirect(status) {
                break response;
            }
            if hops == self.max_redirects {
                return Err(download_error(format!(
                    "gave up after {} redirects",
                    self.max_redirects
                )));
            }
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| download_error(format!("{status} without a Location header")))?;
            let next = current
                .join(location)
                .map_err(|e| download_error(format!("bad Location {location:?}: {e}")))?;
            info!(status = %status, from = %current, to = %next, "Following redirect");
            current = next;
            hops += 1;
        };

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("server answered {status}")));
        }

        let mut file = File::create(dest).await?;
        let mut written: u64 = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| download_error(e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        info!(url = %current, bytes = written, dest = %dest.display(), "Archive downloaded");
        Ok(written)
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        match self.fetch_inner(url, dest).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                error!(error = %e, url = url, dest = %dest.display(), "Download failed, removing partial file");
                if let Err(rm) = tokio::fs::remove_file(dest).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        error!(error = ?rm, dest = %dest.display(), "Failed to remove partial download");
                    }
                }
                Err(e)
            }
        }
    }
}
