use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::module::ModuleKind;

pub const DEFAULT_PROGRAM_DIR: &str = "/usr/share/update-hosts-file";
pub const DEFAULT_HOSTS_FILE: &str = "/etc/hosts";

/// On-disk layout the updater works against.
///
/// Every collaborator resolves its paths through this struct, so a run can be
/// pointed at a scratch tree instead of the real system locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub program_dir: PathBuf,
    /// The live hosts file that gets replaced.
    pub hosts_file: PathBuf,
    /// Parent directory for per-run staging directories.
    pub staging_root: PathBuf,
}

impl Layout {
    pub fn new(program_dir: impl Into<PathBuf>, hosts_file: impl Into<PathBuf>) -> Self {
        Self {
            program_dir: program_dir.into(),
            hosts_file: hosts_file.into(),
            staging_root: std::env::temp_dir(),
        }
    }

    pub fn with_staging_root(mut self, staging_root: impl Into<PathBuf>) -> Self {
        self.staging_root = staging_root.into();
        self
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.program_dir.join("modules")
    }

    /// Root of one module tree (`modules/local` or `modules/web`).
    pub fn module_root(&self, kind: ModuleKind) -> PathBuf {
        self.modules_dir().join(kind.dir_name())
    }

    pub fn available_dir(&self, kind: ModuleKind) -> PathBuf {
        self.module_root(kind).join("available")
    }

    pub fn enabled_dir(&self, kind: ModuleKind) -> PathBuf {
        self.module_root(kind).join("enabled")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.program_dir.join("config")
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.config_dir().join("preferences")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.program_dir.join("backup")
    }

    pub fn hosts_file(&self) -> &Path {
        &self.hosts_file
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM_DIR, DEFAULT_HOSTS_FILE)
    }
}

/// Settings for one update run.
#[derive(Debug, Clone)]
pub struct Config {
    pub layout: Layout,
    /// Upper bound for the reachability probe.
    pub probe_timeout: Duration,
    /// Upper bound for each web module download.
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            probe_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}
