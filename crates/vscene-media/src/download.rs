//! Streaming video download with size and time budgets.
//!
//! Downloads are streamed to disk chunk by chunk so the size cap can be
//! enforced mid-transfer. Any failure deletes the partial file; on success
//! exactly one video file is left in the target directory.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;

use crate::error::{MediaError, MediaResult};

/// File extensions accepted as direct video URLs.
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mkv", ".mov", ".webm", ".flv", ".wmv"];

/// A downloaded video file, exclusively owned by one run.
#[derive(Debug, Clone)]
pub struct DownloadedVideo {
    /// Local path of the downloaded file
    pub path: PathBuf,
    /// Size in bytes
    pub bytes: u64,
}

/// Download a video from a direct URL into `output_dir`.
///
/// Rejects non-http/https schemes before any network access. The body is
/// streamed and aborted the moment cumulative bytes exceed `max_bytes` or
/// the overall `timeout` elapses; the partial file is removed on every
/// failure path.
pub async fn download_video(
    client: &Client,
    url: &str,
    output_dir: &Path,
    max_bytes: u64,
    timeout: Duration,
) -> MediaResult<DownloadedVideo> {
    let parsed = Url::parse(url).map_err(|e| MediaError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(MediaError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                other
            )))
        }
    }

    fs::create_dir_all(output_dir).await?;
    let filepath = output_dir.join(filename_for(&parsed));

    info!("Downloading video from {} to {}", url, filepath.display());

    let deadline = Instant::now() + timeout;
    match stream_to_file(client, &parsed, &filepath, max_bytes, deadline, timeout).await {
        Ok(bytes) => Ok(DownloadedVideo {
            path: filepath,
            bytes,
        }),
        Err(e) => {
            remove_partial(&filepath).await;
            Err(e)
        }
    }
}

async fn stream_to_file(
    client: &Client,
    url: &Url,
    filepath: &Path,
    max_bytes: u64,
    deadline: Instant,
    timeout: Duration,
) -> MediaResult<u64> {
    let response = tokio::time::timeout(
        deadline.saturating_duration_since(Instant::now()),
        client.get(url.clone()).send(),
    )
    .await
    .map_err(|_| MediaError::DownloadTimeout(timeout.as_secs()))?
    .map_err(|e| MediaError::download_failed(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(MediaError::download_failed(format!(
            "server returned {}",
            response.status()
        )));
    }

    // A declared Content-Length over the cap fails before streaming the body.
    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(MediaError::SizeExceeded { limit: max_bytes });
        }
    }

    if let Some(ct) = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        let ct = ct.to_lowercase();
        let looks_like_video = ["video", "octet-stream", "mp4", "avi", "mov"]
            .iter()
            .any(|t| ct.contains(t));
        if !looks_like_video {
            warn!("Content-Type may not be video: {}", ct);
        }
    }

    let mut file = fs::File::create(filepath).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(MediaError::DownloadTimeout(timeout.as_secs()));
        }

        let chunk = match tokio::time::timeout(remaining, stream.next()).await {
            Err(_) => return Err(MediaError::DownloadTimeout(timeout.as_secs())),
            Ok(None) => break,
            Ok(Some(chunk)) => {
                chunk.map_err(|e| MediaError::download_failed(format!("stream error: {}", e)))?
            }
        };

        downloaded += chunk.len() as u64;
        if downloaded > max_bytes {
            return Err(MediaError::SizeExceeded { limit: max_bytes });
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    drop(file);

    if downloaded == 0 {
        return Err(MediaError::EmptyDownload);
    }

    info!(
        "Video downloaded: {} ({:.1} MB)",
        filepath.display(),
        downloaded as f64 / (1024.0 * 1024.0)
    );
    Ok(downloaded)
}

/// Derive a local filename from the URL path, defaulting to `video.mp4`.
fn filename_for(url: &Url) -> String {
    let name = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|s| !s.is_empty())
        .unwrap_or("video.mp4")
        .to_string();

    let lower = name.to_lowercase();
    if VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        name
    } else {
        format!("{}.mp4", name)
    }
}

async fn remove_partial(filepath: &Path) {
    if let Err(e) = fs::remove_file(filepath).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove partial download {}: {}", filepath.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        Client::new()
    }

    #[tokio::test]
    async fn downloads_small_body_to_named_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clip.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1024]))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/clip.mp4", server.uri());
        let video = download_video(&client(), &url, dir.path(), 10_000, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(video.bytes, 1024);
        assert_eq!(video.path.file_name().unwrap(), "clip.mp4");
        assert!(video.path.exists());
    }

    #[tokio::test]
    async fn appends_mp4_extension_when_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/stream", server.uri());
        let video = download_video(&client(), &url, dir.path(), 10_000, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(video.path.file_name().unwrap(), "stream.mp4");
    }

    #[tokio::test]
    async fn rejects_bad_scheme_before_network() {
        let dir = TempDir::new().unwrap();
        let err = download_video(
            &client(),
            "ftp://example.com/clip.mp4",
            dir.path(),
            10_000,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::InvalidUrl(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn declared_content_length_over_cap_fails_early() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/big.mp4", server.uri());
        let err = download_video(&client(), &url, dir.path(), 1024, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::SizeExceeded { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn mid_stream_size_overflow_deletes_partial_file() {
        let server = MockServer::start().await;
        // Chunked response without Content-Length so the cap trips mid-stream.
        Mock::given(method("GET"))
            .and(path("/chunked.mp4"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0u8; 8192], "video/mp4"),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/chunked.mp4", server.uri());
        let err = download_video(&client(), &url, dir.path(), 100, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::SizeExceeded { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn empty_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::new()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/empty.mp4", server.uri());
        let err = download_video(&client(), &url, dir.path(), 10_000, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::EmptyDownload));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn http_error_status_is_download_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/missing.mp4", server.uri());
        let err = download_video(&client(), &url, dir.path(), 10_000, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::DownloadFailed { .. }));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0u8; 64])
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/slow.mp4", server.uri());
        let err = download_video(&client(), &url, dir.path(), 10_000, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::DownloadTimeout(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
