//! # Module Repository
//!
//! Bookkeeping over the two module trees. Definitions live in `available/`;
//! enabling a module links it into `enabled/`, disabling removes the link.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use uhf_common::config::Layout;
use uhf_common::error::{Error, IoContext, Result};
use uhf_common::module::{EnabledModule, ModuleKind, ModuleStatus};

/// Result of an enable/disable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Changed,
    AlreadyEnabled,
    AlreadyDisabled,
}

pub struct ModuleRepository {
    layout: Layout,
}

impl ModuleRepository {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Available modules of `kind`, sorted by name.
    pub fn list(&self, kind: ModuleKind) -> Result<Vec<ModuleStatus>> {
        let names = sorted_names(&self.layout.available_dir(kind))?;
        let enabled_dir = self.layout.enabled_dir(kind);

        names
            .into_iter()
            .map(|name| {
                let enabled = link_exists(&enabled_dir.join(&name))?;
                Ok(ModuleStatus {
                    name,
                    kind,
                    enabled,
                })
            })
            .collect()
    }

    /// Entries of `enabled/`, in directory-listing (name) order.
    pub fn enabled(&self, kind: ModuleKind) -> Result<Vec<EnabledModule>> {
        let dir = self.layout.enabled_dir(kind);
        let names = sorted_names(&dir)?;

        Ok(names
            .into_iter()
            .map(|name| EnabledModule {
                path: dir.join(&name),
                name,
                kind,
            })
            .collect())
    }

    pub fn available_path(&self, kind: ModuleKind, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.layout.available_dir(kind).join(name))
    }

    /// Path of an existing definition.
    pub fn existing_path(&self, kind: ModuleKind, name: &str) -> Result<PathBuf> {
        let path = self.available_path(kind, name)?;
        if !link_exists(&path)? {
            return Err(Error::module(name, format!("no {kind} module with that name")));
        }
        Ok(path)
    }

    /// Path for a new definition; fails if one already exists.
    pub fn vacant_path(&self, kind: ModuleKind, name: &str) -> Result<PathBuf> {
        let path = self.available_path(kind, name)?;
        if link_exists(&path)? {
            return Err(Error::module(name, "already exists"));
        }
        Ok(path)
    }

    pub fn enable(&self, kind: ModuleKind, name: &str) -> Result<Toggle> {
        let available = self.existing_path(kind, name)?;
        let enabled = self.layout.enabled_dir(kind).join(name);

        if link_exists(&enabled)? {
            return Ok(Toggle::AlreadyEnabled);
        }

        symlink(&available, &enabled)
            .io_context(|| format!("failed to link {} into the enabled set", name))?;
        info!("Enabled {} module '{}'", kind, name);
        Ok(Toggle::Changed)
    }

    pub fn disable(&self, kind: ModuleKind, name: &str) -> Result<Toggle> {
        self.existing_path(kind, name)?;
        let enabled = self.layout.enabled_dir(kind).join(name);

        if !link_exists(&enabled)? {
            return Ok(Toggle::AlreadyDisabled);
        }

        fs::remove_file(&enabled)
            .io_context(|| format!("failed to remove link {}", enabled.display()))?;
        info!("Disabled {} module '{}'", kind, name);
        Ok(Toggle::Changed)
    }

    /// Disables the module if needed, then deletes its definition.
    pub fn remove(&self, kind: ModuleKind, name: &str) -> Result<()> {
        let available = self.existing_path(kind, name)?;
        if self.disable(kind, name)? == Toggle::AlreadyDisabled {
            debug!("Module '{}' was already disabled", name);
        }

        fs::remove_file(&available)
            .io_context(|| format!("failed to remove module file {}", available.display()))?;
        info!("Removed {} module '{}'", kind, name);
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(Error::module(name, "not a valid module name"));
    }
    Ok(())
}

fn sorted_names(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .io_context(|| format!("failed to read modules directory {}", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.io_context(|| format!("failed to read entry of {}", dir.display()))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// True if `path` exists, including dangling symlinks.
fn link_exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(format!("failed to inspect {}", path.display()), e)),
    }
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(not(unix))]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    fs::copy(original, link).map(|_| ())
}
