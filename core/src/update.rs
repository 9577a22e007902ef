//! # Update Service
//!
//! Runs one update of the hosts file as a linear sequence:
//!
//! `ConnectivityCheck → StagingCreated → IntegrityVerified → BackedUp →
//! CandidateBuilt → Committed → Cleanup`
//!
//! Nothing is mutated before `BackedUp`. Any failure after it restores the
//! snapshot onto the target before the error is returned. The staging
//! directory is removed on every exit path except a failed restore, where it
//! is left behind for diagnosis.
//!
//! Runs are not locked against each other; callers must not start two runs
//! against the same target at once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use uhf_common::config::Config;
use uhf_common::error::{Error, IoContext, Result, Stage};
use uhf_common::fetch::SourceFetcher;
use uhf_common::module::ModuleKind;
use uhf_common::preferences::{IP_TEST, Preferences};
use uhf_common::system::SystemRepository;

use crate::assembly::{AssemblyPipeline, AssemblyReport, SkippedModule};
use crate::backup::{BackupManager, BackupRecord};
use crate::commit;
use crate::modules::ModuleRepository;
use crate::staging::StagingArea;

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Lines the target holds after the commit.
    pub lines_written: usize,
    pub backup: BackupRecord,
    /// Snapshots deleted by retention before this run's backup.
    pub rotated: Vec<PathBuf>,
    pub loaded: Vec<(ModuleKind, String)>,
    pub skipped: Vec<SkippedModule>,
}

pub struct UpdateService {
    config: Config,
    system: Box<dyn SystemRepository>,
    fetcher: Box<dyn SourceFetcher>,
}

impl UpdateService {
    pub fn new(
        config: Config,
        system: Box<dyn SystemRepository>,
        fetcher: Box<dyn SourceFetcher>,
    ) -> Self {
        Self {
            config,
            system,
            fetcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self) -> Result<UpdateReport> {
        let layout = &self.config.layout;

        let preferences = self
            .check_connectivity()
            .await
            .map_err(|e| Error::fatal(Stage::ConnectivityCheck, e))?;

        let staging = StagingArea::create(&layout.staging_root)
            .map_err(|e| Error::fatal(Stage::StagingCreated, e))?;

        if let Err(e) = self.verify_integrity() {
            staging.cleanup();
            return Err(Error::fatal(Stage::IntegrityVerified, e));
        }

        let backups = BackupManager::new(layout.backup_dir());
        let (rotated, backup) = match back_up(&backups, &preferences, layout.hosts_file()) {
            Ok(done) => done,
            Err(e) => {
                staging.cleanup();
                return Err(Error::fatal(Stage::BackedUp, e));
            }
        };

        match self.build_and_commit(&staging, &preferences).await {
            Ok((assembly, lines_written)) => {
                staging.cleanup();
                info!(
                    "Finished updating {}: {} lines written",
                    layout.hosts_file().display(),
                    lines_written
                );
                Ok(UpdateReport {
                    lines_written,
                    backup,
                    rotated,
                    loaded: assembly.loaded,
                    skipped: assembly.skipped,
                })
            }
            Err(cause) => Err(self.roll_back(&backups, &backup, staging, cause)),
        }
    }

    async fn check_connectivity(&self) -> Result<Preferences> {
        let preferences = Preferences::load(&self.config.layout.preferences_file())?;
        let address = preferences.get(IP_TEST)?;

        info!("Internet connection verification (IP/Hostname: {})", address);
        self.system
            .probe(address, self.config.probe_timeout)
            .await?;
        info!("Connection verified");

        Ok(preferences)
    }

    fn verify_integrity(&self) -> Result<()> {
        let layout = &self.config.layout;

        require_dir(&layout.module_root(ModuleKind::Local), "local modules directory")?;
        require_dir(&layout.module_root(ModuleKind::Web), "web modules directory")?;
        require_dir(&layout.config_dir(), "configuration directory")?;

        let backup_dir = layout.backup_dir();
        if !backup_dir.is_dir() {
            warn!(
                "Backup directory not found at {}. Creating one...",
                backup_dir.display()
            );
            fs::create_dir_all(&backup_dir)
                .io_context(|| format!("failed to create {}", backup_dir.display()))?;
        }

        info!("Program directories verified");
        Ok(())
    }

    async fn build_and_commit(
        &self,
        staging: &StagingArea,
        preferences: &Preferences,
    ) -> Result<(AssemblyReport, usize)> {
        let modules = ModuleRepository::new(self.config.layout.clone());
        let pipeline = AssemblyPipeline {
            modules: &modules,
            system: self.system.as_ref(),
            fetcher: self.fetcher.as_ref(),
            preferences,
        };

        let assembly = pipeline
            .build(staging)
            .await
            .map_err(|e| Error::fatal(Stage::CandidateBuilt, e))?;

        let lines = commit::commit(&assembly.candidate, self.config.layout.hosts_file())
            .map_err(|e| Error::fatal(Stage::Committed, e))?;

        Ok((assembly, lines))
    }

    /// Restores `backup` after `cause` and returns the error that ends the run.
    fn roll_back(
        &self,
        backups: &BackupManager,
        backup: &BackupRecord,
        staging: StagingArea,
        cause: Error,
    ) -> Error {
        let target = self.config.layout.hosts_file();
        warn!("An error has occurred. Backup will be restored.");

        match backups.restore(backup, target) {
            Ok(()) => {
                info!("{} restored from {}", target.display(), backup.filename);
                staging.cleanup();
                cause
            }
            Err(e) => {
                let kept = staging.keep();
                error!(
                    "Failed to restore backup {}; staging directory left at {}",
                    backup.path.display(),
                    kept.display()
                );
                Error::RollbackFailed {
                    cause: Box::new(cause),
                    source: Box::new(e),
                }
            }
        }
    }
}

fn back_up(
    backups: &BackupManager,
    preferences: &Preferences,
    target: &Path,
) -> Result<(Vec<PathBuf>, BackupRecord)> {
    let max = preferences.max_backup_files()?;
    info!("Cleaning up backup directory if needed (keeping {})", max);
    let rotated = backups.rotate(max)?;

    info!("Backing up {}", target.display());
    let record = backups.snapshot(target)?;
    Ok((rotated, record))
}

fn require_dir(path: &Path, what: &str) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    Err(Error::io(
        format!("{} not found at {}", what, path.display()),
        io::Error::from(io::ErrorKind::NotFound),
    ))
}
