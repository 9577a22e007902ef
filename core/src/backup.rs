//! # Backup Manager
//!
//! Keeps timestamped snapshots of the hosts file in the backup directory.
//!
//! * [`BackupManager::rotate`] bounds the number of snapshots, oldest first.
//! * [`BackupManager::snapshot`] records the current target content.
//! * [`BackupManager::restore`] moves a snapshot back over the target.
//!
//! Rotation is always called before the snapshot of the same run, so a fresh
//! snapshot is never a rotation candidate.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Local;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use uhf_common::error::{Error, IoContext, Result};

use crate::commit;

pub const BACKUP_EXTENSION: &str = "BACKUP";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
const MAX_NAME_COLLISIONS: usize = 64;

/// One retained snapshot of the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub filename: String,
    pub path: PathBuf,
}

pub struct BackupManager {
    dir: PathBuf,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deletes the oldest snapshots (by modification time) until at most
    /// `max_count` remain. Returns the removed paths, oldest first.
    pub fn rotate(&self, max_count: usize) -> Result<Vec<PathBuf>> {
        let mut snapshots = self.list_snapshots()?;
        if snapshots.len() <= max_count {
            return Ok(Vec::new());
        }

        snapshots.sort_by(|(a_path, a_time), (b_path, b_time)| {
            a_time.cmp(b_time).then_with(|| a_path.cmp(b_path))
        });

        let excess = snapshots.len() - max_count;
        let mut removed = Vec::with_capacity(excess);
        for (path, _) in snapshots.into_iter().take(excess) {
            fs::remove_file(&path)
                .io_context(|| format!("failed to remove backup file {}", path.display()))?;
            info!("Removed backup file {}", path.display());
            removed.push(path);
        }

        Ok(removed)
    }

    /// Copies `target` into `<yyyy-MM-dd-HH-mm-ss>.BACKUP`.
    ///
    /// The copy is written to a temporary file first and only appears under its
    /// final name once complete. A second snapshot in the same second gets a
    /// `-N` suffix.
    pub fn snapshot(&self, target: &Path) -> Result<BackupRecord> {
        let meta = match fs::metadata(target) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::SourceMissing(target.to_path_buf()));
            }
            Err(e) => {
                return Err(Error::io(format!("failed to inspect {}", target.display()), e));
            }
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).io_context(|| {
            format!("failed to create backup file in {}", self.dir.display())
        })?;
        let mut src = File::open(target)
            .io_context(|| format!("failed to open {}", target.display()))?;
        io::copy(&mut src, tmp.as_file_mut())
            .io_context(|| format!("failed to copy {} to backup file", target.display()))?;
        tmp.as_file()
            .sync_all()
            .io_context(|| "failed to flush backup file")?;
        fs::set_permissions(tmp.path(), meta.permissions())
            .io_context(|| "failed to copy permissions to backup file")?;

        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let mut attempt = 0;
        loop {
            let filename = if attempt == 0 {
                format!("{stamp}.{BACKUP_EXTENSION}")
            } else {
                format!("{stamp}-{attempt}.{BACKUP_EXTENSION}")
            };
            let path = self.dir.join(&filename);

            match tmp.persist_noclobber(&path) {
                Ok(_) => {
                    info!("Current {} backed up as {}", target.display(), filename);
                    return Ok(BackupRecord { filename, path });
                }
                Err(e)
                    if e.error.kind() == io::ErrorKind::AlreadyExists
                        && attempt < MAX_NAME_COLLISIONS =>
                {
                    tmp = e.file;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(Error::io(
                        format!("failed to write backup file {}", path.display()),
                        e.error,
                    ));
                }
            }
        }
    }

    /// Moves the snapshot back onto `target`, replacing it. A symlinked
    /// target is resolved first, so the link survives.
    ///
    /// Falls back to copy-then-remove when the rename is refused, e.g. the
    /// backup directory and the target live on different filesystems.
    pub fn restore(&self, record: &BackupRecord, target: &Path) -> Result<()> {
        let target = commit::resolve_target(target)?;
        match fs::rename(&record.path, &target) {
            Ok(()) => Ok(()),
            Err(e) if commit::needs_copy(&e) => {
                debug!(
                    "Cannot rename onto {} ({}), copying {}",
                    target.display(),
                    e,
                    record.path.display()
                );
                commit::replace_contents(&record.path, &target)?;
                fs::remove_file(&record.path).io_context(|| {
                    format!("failed to remove restored backup {}", record.path.display())
                })
            }
            Err(e) => Err(Error::io(
                format!(
                    "failed to restore backup {} onto {}",
                    record.filename,
                    target.display()
                ),
                e,
            )),
        }
    }

    fn list_snapshots(&self) -> Result<Vec<(PathBuf, SystemTime)>> {
        let entries = fs::read_dir(&self.dir)
            .io_context(|| format!("failed to read backup directory {}", self.dir.display()))?;

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry.io_context(|| "failed to read backup directory entry")?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }

            let meta = entry
                .metadata()
                .io_context(|| format!("failed to inspect {}", path.display()))?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta
                .modified()
                .io_context(|| format!("failed to read mtime of {}", path.display()))?;
            snapshots.push((path, modified));
        }

        Ok(snapshots)
    }
}
