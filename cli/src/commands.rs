pub mod about;
pub mod modules;
pub mod service;
pub mod update;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uhf_common::config::{DEFAULT_HOSTS_FILE, DEFAULT_PROGRAM_DIR};
use uhf_common::module::ModuleKind;

#[derive(Parser)]
#[command(name = "update-hosts-file", version)]
#[command(
    about = "Manage and update your /etc/hosts file with local and web sourced blocklists"
)]
pub struct CommandLine {
    /// Program directory holding modules, config and backups
    #[arg(long, global = true, default_value = DEFAULT_PROGRAM_DIR)]
    pub prefix: PathBuf,

    /// Hosts file to rebuild
    #[arg(long, global = true, default_value = DEFAULT_HOSTS_FILE)]
    pub hosts_file: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Updates the hosts file according to enabled modules
    #[command(alias = "u")]
    Update {
        /// Skip the interactive finish program menu
        #[arg(long)]
        no_interactive: bool,
    },
    /// Manages the modules used to update the hosts file
    #[command(subcommand)]
    Modules(ModuleCommand),
    /// Enables or disables the systemd service
    #[command(subcommand)]
    Service(ServiceCommand),
    /// Shows program's version
    Version,
    /// Shows program's information
    About,
}

#[derive(Subcommand)]
pub enum ModuleCommand {
    /// Enables a module
    Enable(ModuleTarget),
    /// Disables a module
    Disable(ModuleTarget),
    /// Adds a module using the default editor
    Add(ModuleTarget),
    /// Removes a module
    Rm(ModuleTarget),
    /// Edits a module
    Edit(ModuleTarget),
    /// Views a module
    View(ModuleTarget),
    /// Lists modules
    List(ListTarget),
}

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// Enables the UpdateHostsFile systemd service
    Enable,
    /// Disables the UpdateHostsFile systemd service
    Disable,
}

#[derive(Args)]
#[group(id = "kind", required = true, multiple = false)]
pub struct KindFlags {
    /// Web module
    #[arg(short, long)]
    pub web: bool,
    /// Local module
    #[arg(short, long)]
    pub local: bool,
}

impl KindFlags {
    pub fn kind(&self) -> ModuleKind {
        if self.web {
            ModuleKind::Web
        } else {
            ModuleKind::Local
        }
    }
}

#[derive(Args)]
pub struct ModuleTarget {
    #[command(flatten)]
    pub kind: KindFlags,
    /// Module name
    #[arg(short, long = "module")]
    pub module: String,
}

#[derive(Args)]
#[group(id = "scope", required = true, multiple = false)]
pub struct ListTarget {
    /// List web modules
    #[arg(short, long)]
    pub web: bool,
    /// List local modules
    #[arg(short, long)]
    pub local: bool,
    /// List all modules
    #[arg(short, long)]
    pub all: bool,
}

impl ListTarget {
    pub fn kinds(&self) -> Vec<ModuleKind> {
        match (self.web, self.local, self.all) {
            (true, _, _) => vec![ModuleKind::Web],
            (_, true, _) => vec![ModuleKind::Local],
            _ => ModuleKind::ALL.to_vec(),
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
