//! # Assembly Pipeline
//!
//! Builds the candidate hosts file inside the staging area, always in this
//! order:
//!
//! 1. header
//! 2. hostname entry
//! 3. every enabled local module (name order)
//! 4. every enabled web module (name order)
//!
//! Later duplicates win when the file is consumed, so the order is part of the
//! contract. No deduplication or syntax validation happens here: module lines
//! that are neither blank nor comments are copied verbatim.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use uhf_common::PROGRAM_NAME;
use uhf_common::error::{Error, ErrorKind, IoContext, Result};
use uhf_common::fetch::SourceFetcher;
use uhf_common::module::{EnabledModule, ModuleKind};
use uhf_common::preferences::{KEEP_ON_HOST_UNREACHABLE, Preferences};
use uhf_common::system::SystemRepository;

use crate::modules::ModuleRepository;
use crate::staging::StagingArea;

pub const LOOPBACK_ADDR: &str = "127.0.0.1";

const HEADER_BLURB: &[&str] = &[
    "update-hosts-file is a program that automatically updates this file.",
    "It can be configured to pull host information from various sources,",
    "such as web-based and local blocklists files. It also automatically",
    "adds this machine's hostname to make sure any changes to it will be",
    "reflected here.",
];

/// Append-only writer for the candidate file.
pub struct CandidateFile {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: usize,
}

impl CandidateFile {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .io_context(|| format!("failed to create candidate file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    pub fn line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")
            .io_context(|| format!("failed to write to {}", self.path.display()))?;
        self.lines += 1;
        Ok(())
    }

    pub fn blank(&mut self) -> Result<()> {
        self.line("")
    }

    pub fn comment(&mut self, text: &str) -> Result<()> {
        self.line(&format!("# {text}"))
    }

    pub fn host(&mut self, ip: &str, hostname: &str) -> Result<()> {
        self.line(&format!("{ip} {hostname}"))
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flushes and syncs the file; it is read-only from here on.
    pub fn finish(self) -> Result<PathBuf> {
        let file = self.writer.into_inner().map_err(|e| {
            Error::io(format!("failed to flush {}", self.path.display()), e.into_error())
        })?;
        file.sync_all()
            .io_context(|| format!("failed to sync {}", self.path.display()))?;
        Ok(self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedModule {
    pub kind: ModuleKind,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub candidate: PathBuf,
    pub lines: usize,
    pub loaded: Vec<(ModuleKind, String)>,
    pub skipped: Vec<SkippedModule>,
}

impl AssemblyReport {
    fn skip(&mut self, module: &EnabledModule, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Skipping {} module '{}': {}", module.kind, module.name, reason);
        self.skipped.push(SkippedModule {
            kind: module.kind,
            name: module.name.clone(),
            reason,
        });
    }
}

pub struct AssemblyPipeline<'a> {
    pub modules: &'a ModuleRepository,
    pub system: &'a dyn SystemRepository,
    pub fetcher: &'a dyn SourceFetcher,
    pub preferences: &'a Preferences,
}

impl AssemblyPipeline<'_> {
    /// Writes the complete candidate file into `staging`.
    ///
    /// Per-module failures are logged and skipped. Errors returned from here
    /// end the run: candidate write failures, an unreadable `enabled/`
    /// directory, or an unreachable web module while
    /// `KEEP_ON_HOST_UNREACHABLE` is `false`.
    pub async fn build(&self, staging: &StagingArea) -> Result<AssemblyReport> {
        let mut candidate = CandidateFile::create(&staging.candidate_path())?;
        let mut report = AssemblyReport::default();

        write_header(&mut candidate, Local::now())?;
        self.write_hostname(&mut candidate)?;
        self.load_local_modules(&mut candidate, &mut report)?;
        self.load_web_modules(&mut candidate, staging, &mut report)
            .await?;

        report.lines = candidate.lines();
        report.candidate = candidate.finish()?;
        Ok(report)
    }

    fn write_hostname(&self, candidate: &mut CandidateFile) -> Result<()> {
        let hostname = match self.system.hostname() {
            Ok(name) if !name.trim().is_empty() => name,
            Ok(_) => {
                warn!("This machine reports an empty hostname, skipping the hostname entry");
                return Ok(());
            }
            Err(e) => {
                warn!("Could not resolve this machine's hostname, skipping: {}", e);
                return Ok(());
            }
        };

        candidate.blank()?;
        candidate.comment("Hostname")?;
        candidate.host(LOOPBACK_ADDR, hostname.trim())?;
        candidate.blank()?;
        info!("Inserted hostname '{}'", hostname.trim());
        Ok(())
    }

    fn load_local_modules(
        &self,
        candidate: &mut CandidateFile,
        report: &mut AssemblyReport,
    ) -> Result<()> {
        let enabled = self.modules.enabled(ModuleKind::Local)?;
        if enabled.is_empty() {
            warn!("No local module enabled");
        }

        for module in enabled {
            info!("Loading local module '{}'", module.name);
            let content = match read_lossy(&module.path) {
                Ok(content) => content,
                Err(e) => {
                    report.skip(&module, e.to_string());
                    continue;
                }
            };

            write_section(candidate, &module, &content)?;
            report.loaded.push((module.kind, module.name));
        }
        Ok(())
    }

    async fn load_web_modules(
        &self,
        candidate: &mut CandidateFile,
        staging: &StagingArea,
        report: &mut AssemblyReport,
    ) -> Result<()> {
        let enabled = self.modules.enabled(ModuleKind::Web)?;
        if enabled.is_empty() {
            warn!("No web module enabled");
        }

        for module in enabled {
            info!("Loading web module '{}'", module.name);
            let source = match fs::read_to_string(&module.path) {
                Ok(source) => source.trim().to_string(),
                Err(e) => {
                    report.skip(&module, format!("failed to read module source: {e}"));
                    continue;
                }
            };
            info!("Source: {}", source);

            let payload = staging.payload_path(&module.name);
            if let Err(e) = self.fetcher.fetch(&source, &payload).await {
                if e.kind() != ErrorKind::Network {
                    report.skip(&module, e.to_string());
                    continue;
                }

                match self.preferences.get_bool(KEEP_ON_HOST_UNREACHABLE) {
                    Ok(false) => {
                        return Err(Error::ModuleUnreachable {
                            module: module.name,
                            source: Box::new(e),
                        });
                    }
                    Ok(true) => report.skip(&module, e.to_string()),
                    Err(pref) => {
                        warn!("Invalid option in preferences file: {}", pref);
                        report.skip(&module, e.to_string());
                    }
                }
                continue;
            }

            let content = match read_lossy(&payload) {
                Ok(content) => content,
                Err(e) => {
                    report.skip(&module, e.to_string());
                    continue;
                }
            };

            write_section(candidate, &module, &content)?;
            report.loaded.push((module.kind, module.name));
        }
        Ok(())
    }
}

pub fn write_header(candidate: &mut CandidateFile, now: DateTime<Local>) -> Result<()> {
    candidate.comment(&format!(
        "This file was edited by {} (v{})",
        PROGRAM_NAME,
        env!("CARGO_PKG_VERSION")
    ))?;
    candidate.comment(&format!("Date: {}", now.format("%Y-%m-%d %H:%M:%S %:z")))?;
    for line in HEADER_BLURB {
        candidate.comment(line)?;
    }
    candidate.blank()
}

/// Lines of a module body that end up in the hosts file.
pub fn entries(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    })
}

fn write_section(
    candidate: &mut CandidateFile,
    module: &EnabledModule,
    content: &str,
) -> Result<()> {
    candidate.blank()?;
    candidate.comment(&format!("Hosts from {} module '{}'", module.kind, module.name))?;
    let mut count = 0;
    for line in entries(content) {
        candidate.line(line)?;
        count += 1;
    }
    candidate.blank()?;
    info!("Added {} entries from '{}'", count, module.name);
    Ok(())
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).io_context(|| format!("failed to open {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
