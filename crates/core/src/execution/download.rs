//! In-process file downloads

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::types::{DoableError, DoableResult};

/// Fetches URLs over HTTP(S) and writes the body to disk
#[derive(Debug, Clone, Default)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// The body is written to `<dest>.part` and renamed into place, so an
    /// interrupted download never leaves a file that looks complete.
    pub async fn download(&self, url: &str, dest: &Path) -> DoableResult<u64> {
        info!("Downloading {} to {}", url, dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DoableError::Download(format!("Failed to download {}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_msg = if status == reqwest::StatusCode::NOT_FOUND {
                format!(
                    "Failed to download {}: HTTP 404 Not Found\n\n\
                    The installer may have moved; check the URL in a browser",
                    url
                )
            } else {
                format!("Failed to download {}: HTTP {}", url, status)
            };
            return Err(DoableError::Download(error_msg));
        }

        let bytes = response.bytes().await.map_err(|e| {
            DoableError::Download(format!("Failed to read response body from {}: {}", url, e))
        })?;

        if bytes.is_empty() {
            return Err(DoableError::Download(format!(
                "Downloaded file from {} is empty",
                url
            )));
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut partial = dest.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        if let Err(e) = write_then_rename(&partial, &bytes, dest).await {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                debug!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e);
        }

        debug!(url, bytes = bytes.len(), "download complete");
        Ok(bytes.len() as u64)
    }
}

async fn write_then_rename(partial: &Path, bytes: &[u8], dest: &Path) -> DoableResult<()> {
    let mut file = File::create(partial).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);
    tokio::fs::rename(partial, dest).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serve `response` verbatim to a single connection and return a URL for it
    pub(crate) async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}/Miniconda3-latest-Linux-x86_64.sh", addr)
    }

    pub(crate) const INSTALLER_RESPONSE: &str =
        "HTTP/1.1 200 OK\r\nContent-Length: 10\r\nConnection: close\r\n\r\n#!/bin/sh\n";

    fn part_path(dest: &Path) -> PathBuf {
        let mut partial = dest.as_os_str().to_owned();
        partial.push(".part");
        PathBuf::from(partial)
    }

    #[tokio::test]
    async fn test_body_written_to_dest() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cache").join("installer.sh");
        let url = serve_once(INSTALLER_RESPONSE).await;

        let bytes = Downloader::new().download(&url, &dest).await.unwrap();
        assert_eq!(bytes, 10);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "#!/bin/sh\n");
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_empty_body_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("installer.sh");
        let url =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;

        let err = Downloader::new().download(&url, &dest).await.unwrap_err();
        assert!(matches!(err, DoableError::Download(_)));
        assert!(err.to_string().contains("is empty"));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("installer.sh");
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let err = Downloader::new().download(&url, &dest).await.unwrap_err();
        assert!(matches!(err, DoableError::Download(_)));
        assert!(err.to_string().contains("404"));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file
        let dest = dir.path().join("installer.sh");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("keep"), "x").unwrap();
        let url = serve_once(INSTALLER_RESPONSE).await;

        assert!(Downloader::new().download(&url, &dest).await.is_err());
        assert!(!part_path(&dest).exists());
        assert!(dest.join("keep").exists());
    }

    #[tokio::test]
    async fn test_connection_failure_is_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("installer.sh");
        // port 9 (discard) on localhost is not expected to serve HTTP
        let err = Downloader::new()
            .download("http://127.0.0.1:9/installer.sh", &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, DoableError::Download(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let err = Downloader::new()
            .download("not a url", &dir.path().join("x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }
}
