//! # Error Model
//!
//! A single error type shared by every layer of the updater. Each variant keeps
//! its underlying cause as a `source`, so callers can walk the chain instead of
//! parsing messages.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of an [`Error`], used where policy depends on the
/// failure family (e.g. network vs. local I/O while fetching a web module).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    Network,
    RetentionConfig,
    SourceMissing,
    Module,
    RunFatal,
    RollbackFailed,
}

/// Steps of an update run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ConnectivityCheck,
    StagingCreated,
    IntegrityVerified,
    BackedUp,
    CandidateBuilt,
    Committed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ConnectivityCheck => "connectivity check",
            Stage::StagingCreated => "staging area creation",
            Stage::IntegrityVerified => "integrity verification",
            Stage::BackedUp => "backup",
            Stage::CandidateBuilt => "candidate assembly",
            Stage::Committed => "commit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A preference is missing, unreadable or holds an invalid value.
    #[error("preference `{key}`: {reason}")]
    Config { key: String, reason: String },

    /// Filesystem read/write/copy/remove failure.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A remote source could not be reached or answered with a failure status.
    #[error("source `{address}` could not be reached: {reason}")]
    Network {
        address: String,
        reason: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("MAX_BACKUP_FILES must be a non-negative integer, got `{0}`")]
    RetentionConfig(String),

    /// There is no target file to protect, so no baseline can be recorded.
    #[error("nothing to back up: {} does not exist", .0.display())]
    SourceMissing(PathBuf),

    /// Module repository bookkeeping failure (unknown module, duplicate, ...).
    #[error("module `{name}`: {reason}")]
    Module { name: String, reason: String },

    /// A web module could not be fetched and the preferences forbid skipping it.
    #[error("web module `{module}` is unreachable and KEEP_ON_HOST_UNREACHABLE is false")]
    ModuleUnreachable {
        module: String,
        #[source]
        source: Box<Error>,
    },

    /// A failure that ends the run. Past the backup point it also triggers rollback.
    #[error("{stage} failed: {source}")]
    RunFatal {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    /// Restoring the backup after a failed run did not succeed either.
    #[error("rollback failed after `{cause}`: {source}")]
    RollbackFailed {
        cause: Box<Error>,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } => ErrorKind::Config,
            Error::Io { .. } => ErrorKind::Io,
            Error::Network { .. } | Error::ModuleUnreachable { .. } => ErrorKind::Network,
            Error::RetentionConfig(_) => ErrorKind::RetentionConfig,
            Error::SourceMissing(_) => ErrorKind::SourceMissing,
            Error::Module { .. } => ErrorKind::Module,
            Error::RunFatal { .. } => ErrorKind::RunFatal,
            Error::RollbackFailed { .. } => ErrorKind::RollbackFailed,
        }
    }

    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub fn network<E>(address: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Network {
            address: address.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Network failure without an underlying error value, e.g. a non-success status.
    pub fn network_status(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Network {
            address: address.into(),
            reason: reason.into(),
            source: None,
        }
    }

    pub fn module(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Module {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn fatal(stage: Stage, source: Error) -> Self {
        Error::RunFatal {
            stage,
            source: Box::new(source),
        }
    }

    /// Stage at which a run stopped, if this error ended one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::RunFatal { stage, .. } => Some(*stage),
            Error::RollbackFailed { cause, .. } => cause.stage(),
            _ => None,
        }
    }
}

/// Attaches context to `io::Result`s at the call site.
pub trait IoContext<T> {
    fn io_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| Error::io(context(), source))
    }
}
