//! Per-run scoped temporary storage.
//!
//! Every run owns an isolated directory tree under the configured temp
//! root. Cleanup is a single idempotent routine; the `Drop` impl is the
//! backstop for cancellation paths, so no exit path leaks files.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

/// Scoped temporary directory tree for one run.
///
/// Layout: `<root>/video/` for the downloaded file, `<root>/frames/` for
/// extracted frames. The tree is removed exactly once; later calls are
/// no-ops.
#[derive(Debug)]
pub struct RunWorkspace {
    root: PathBuf,
    cleaned: bool,
}

impl RunWorkspace {
    /// Create a fresh workspace under `temp_root`.
    pub async fn create(temp_root: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(temp_root).await?;

        let dir = tempfile::Builder::new()
            .prefix("vscene_run_")
            .tempdir_in(temp_root)?;
        // Ownership of deletion moves to this struct.
        let root = dir.keep();

        fs::create_dir_all(root.join("video")).await?;
        fs::create_dir_all(root.join("frames")).await?;

        Ok(Self {
            root,
            cleaned: false,
        })
    }

    /// Root of the workspace tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the video is downloaded into.
    pub fn video_dir(&self) -> PathBuf {
        self.root.join("video")
    }

    /// Directory frames are extracted into.
    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }

    /// Remove the whole tree. Idempotent; failures are logged, never
    /// escalated, so cleanup can never mask the run's outcome.
    pub async fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;

        match fs::remove_dir_all(&self.root).await {
            Ok(()) => info!("Cleaned up run workspace {}", self.root.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to clean up run workspace {}: {}",
                self.root.display(),
                e
            ),
        }
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        // Cancellation path: the async cleanup never ran.
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to clean up run workspace {} on drop: {}",
                    self.root.display(),
                    e
                );
            }
        }
    }
}
