//! Shared vocabulary of the hosts file updater: directory layout, preferences,
//! module model, error type and the outbound port traits implemented in
//! `uhf-core`.

pub mod config;
pub mod error;
pub mod fetch;
pub mod module;
pub mod preferences;
pub mod system;

pub const PROGRAM_NAME: &str = "update-hosts-file";
