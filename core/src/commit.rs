//! Commit stage: makes the candidate file the new hosts file.
//!
//! The candidate is copied next to the target and renamed over it, so a crash
//! mid-copy leaves the previous target in place instead of an empty file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use uhf_common::error::{Error, IoContext, Result};

/// Replaces `target` with the candidate and returns the number of lines the
/// target now holds.
pub fn commit(candidate: &Path, target: &Path) -> Result<usize> {
    replace_contents(candidate, target)?;
    let lines = count_lines(target)?;
    info!("{} now holds {} lines", target.display(), lines);
    Ok(lines)
}

/// Atomically replaces `target` with a copy of `source`.
///
/// A symlinked `target` is resolved first, so the file it points to is
/// replaced and the link stays. Keeps the permissions of the file being
/// replaced; if there is none, the source's permissions are used. When the
/// rename is refused (other filesystem, bind-mounted file) the content is
/// written through the existing file instead.
pub fn replace_contents(source: &Path, target: &Path) -> Result<()> {
    let target = resolve_target(target)?;
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let permissions = match fs::metadata(&target) {
        Ok(meta) => meta.permissions(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => fs::metadata(source)
            .io_context(|| format!("failed to inspect {}", source.display()))?
            .permissions(),
        Err(e) => return Err(Error::io(format!("failed to inspect {}", target.display()), e)),
    };

    let mut tmp = NamedTempFile::new_in(parent)
        .io_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    let mut src =
        File::open(source).io_context(|| format!("failed to open {}", source.display()))?;
    io::copy(&mut src, tmp.as_file_mut()).io_context(|| {
        format!("failed to copy {} next to {}", source.display(), target.display())
    })?;
    tmp.as_file()
        .sync_all()
        .io_context(|| format!("failed to flush replacement for {}", target.display()))?;
    fs::set_permissions(tmp.path(), permissions).io_context(|| {
        format!("failed to set permissions on replacement for {}", target.display())
    })?;

    match tmp.persist(&target) {
        Ok(_) => Ok(()),
        Err(e) if needs_copy(&e.error) => {
            debug!("Cannot rename over {} ({}), writing in place", target.display(), e.error);
            write_through(source, &target)
        }
        Err(e) => Err(Error::io(format!("failed to replace {}", target.display()), e.error)),
    }
}

/// Path the content of `target` lives at: symlinks are followed, a missing
/// target resolves to itself.
pub(crate) fn resolve_target(target: &Path) -> Result<PathBuf> {
    match fs::canonicalize(target) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(target.to_path_buf()),
        Err(e) => Err(Error::io(format!("failed to resolve {}", target.display()), e)),
    }
}

/// Rename failures that a plain copy can still get around.
pub(crate) fn needs_copy(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::CrossesDevices | io::ErrorKind::ResourceBusy
    )
}

/// Truncates `target` and copies `source` into it, keeping its inode and mode.
fn write_through(source: &Path, target: &Path) -> Result<()> {
    let mut src =
        File::open(source).io_context(|| format!("failed to open {}", source.display()))?;
    let mut dst = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(target)
        .io_context(|| format!("failed to open {} for writing", target.display()))?;
    io::copy(&mut src, &mut dst)
        .io_context(|| format!("failed to write {}", target.display()))?;
    dst.sync_all()
        .io_context(|| format!("failed to flush {}", target.display()))
}

fn count_lines(path: &Path) -> Result<usize> {
    let file = File::open(path).io_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut lines = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .io_context(|| format!("failed to read {}", path.display()))?;
        if read == 0 {
            break;
        }
        lines += 1;
    }
    Ok(lines)
}
