//! # Module Model
//!
//! A module is a named, independently toggleable source of host entries.
//! *Local* modules hold literal `ip hostname` lines, *web* modules hold the
//! address of a remote list that is downloaded at update time.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleKind {
    Local,
    Web,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 2] = [ModuleKind::Local, ModuleKind::Web];

    /// Directory name of this kind's tree under `modules/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            ModuleKind::Local => "local",
            ModuleKind::Web => "web",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for ModuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(ModuleKind::Local),
            "web" => Ok(ModuleKind::Web),
            _ => Err(format!("invalid module kind: {s}")),
        }
    }
}

/// An available module and whether it is linked into the enabled set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatus {
    pub name: String,
    pub kind: ModuleKind,
    pub enabled: bool,
}

/// An entry of an `enabled/` directory, resolved for reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledModule {
    pub name: String,
    pub kind: ModuleKind,
    pub path: PathBuf,
}
