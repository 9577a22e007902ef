//! Per-run staging directory holding the candidate file and downloaded payloads.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use uhf_common::error::{IoContext, Result};

const CANDIDATE_FILE: &str = "hosts";
const WEB_PAYLOAD_DIR: &str = "web";

/// Isolated working directory that lives for exactly one run.
///
/// Dropping it removes the directory. [`StagingArea::remove`] does the same
/// but reports failures, and [`StagingArea::keep`] leaves it on disk.
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Creates `<root>/<unix-ts>-<random>` with an empty `web/` payload directory.
    pub fn create(root: &Path) -> Result<Self> {
        let prefix = format!("{}-", chrono::Utc::now().timestamp());
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(root)
            .io_context(|| format!("failed to create staging directory in {}", root.display()))?;

        let payloads = dir.path().join(WEB_PAYLOAD_DIR);
        std::fs::create_dir(&payloads)
            .io_context(|| format!("failed to create {}", payloads.display()))?;

        debug!("Staging directory created at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn candidate_path(&self) -> PathBuf {
        self.path().join(CANDIDATE_FILE)
    }

    /// Where the payload of web module `name` is downloaded to.
    pub fn payload_path(&self, name: &str) -> PathBuf {
        self.path().join(WEB_PAYLOAD_DIR).join(name)
    }

    pub fn remove(self) -> Result<()> {
        let path = self.path().to_path_buf();
        self.dir
            .close()
            .io_context(|| format!("failed to remove staging directory {}", path.display()))
    }

    /// Removes the directory, downgrading a failure to a warning.
    pub fn cleanup(self) {
        if let Err(e) = self.remove() {
            warn!("{}", e);
        }
    }

    /// Leaves the directory on disk and returns its path.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}
