//! # Hosts File Updater
//!
//! Rebuilds the hosts file from the machine's hostname and the enabled local
//! and web modules, replacing the live file only after a snapshot of it exists.
//!
//! * [`update::UpdateService`] sequences a run and rolls back on failure.
//! * [`assembly`] writes the candidate file inside a [`staging::StagingArea`].
//! * [`backup`] rotates, snapshots and restores the target.
//! * [`commit`] swaps the candidate in.
//! * [`modules`] manages the module trees.
//! * [`fetcher`] and [`system`] are the concrete outbound adapters.

pub mod assembly;
pub mod backup;
pub mod commit;
pub mod fetcher;
pub mod modules;
pub mod staging;
pub mod system;
pub mod update;
