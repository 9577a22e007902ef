use tracing::{info, warn};

use uhf_common::config::Config;
use uhf_common::module::ModuleKind;
use uhf_common::preferences::{DEFAULT_EDITOR, DEFAULT_VIEWER, Preferences};
use uhf_core::modules::{ModuleRepository, Toggle};

use crate::commands::{ListTarget, ModuleCommand, ModuleTarget};
use crate::terminal::{menu, print};

pub fn modules(cfg: &Config, command: ModuleCommand) -> anyhow::Result<()> {
    let repo = ModuleRepository::new(cfg.layout.clone());

    match command {
        ModuleCommand::Enable(target) => enable(&repo, &target),
        ModuleCommand::Disable(target) => disable(&repo, &target),
        ModuleCommand::Add(target) => add(cfg, &repo, &target),
        ModuleCommand::Rm(target) => {
            repo.remove(target.kind.kind(), &target.module)?;
            Ok(())
        }
        ModuleCommand::Edit(target) => {
            let path = repo.existing_path(target.kind.kind(), &target.module)?;
            menu::open_with(preference(cfg, DEFAULT_EDITOR)?.as_str(), &path)
        }
        ModuleCommand::View(target) => {
            let path = repo.existing_path(target.kind.kind(), &target.module)?;
            menu::open_with(preference(cfg, DEFAULT_VIEWER)?.as_str(), &path)
        }
        ModuleCommand::List(target) => list(&repo, &target),
    }
}

fn enable(repo: &ModuleRepository, target: &ModuleTarget) -> anyhow::Result<()> {
    let kind = target.kind.kind();
    if repo.enable(kind, &target.module)? == Toggle::AlreadyEnabled {
        warn!("{} module '{}' is already enabled", kind, target.module);
    }
    Ok(())
}

fn disable(repo: &ModuleRepository, target: &ModuleTarget) -> anyhow::Result<()> {
    let kind = target.kind.kind();
    if repo.disable(kind, &target.module)? == Toggle::AlreadyDisabled {
        warn!("{} module '{}' is already disabled", kind, target.module);
    }
    Ok(())
}

fn add(cfg: &Config, repo: &ModuleRepository, target: &ModuleTarget) -> anyhow::Result<()> {
    let kind = target.kind.kind();
    let path = repo.vacant_path(kind, &target.module)?;
    let editor = preference(cfg, DEFAULT_EDITOR)?;

    if kind == ModuleKind::Web {
        info!("Write the URL of the hosts source on the first line of the module");
    }
    menu::open_with(&editor, &path)?;

    if path.exists() {
        info!(
            "Added {} module '{}'. Run `update-hosts-file modules enable` to use it.",
            kind, target.module
        );
    } else {
        warn!("Module '{}' was not saved, nothing was added", target.module);
    }
    Ok(())
}

fn list(repo: &ModuleRepository, target: &ListTarget) -> anyhow::Result<()> {
    for kind in target.kinds() {
        print::header(&format!("{} modules", kind));
        let modules = repo.list(kind)?;
        if modules.is_empty() {
            print::print_status("No module found");
        }
        for module in modules {
            print::module_line(&module.name, module.enabled);
        }
    }
    Ok(())
}

fn preference(cfg: &Config, key: &str) -> anyhow::Result<String> {
    let preferences = Preferences::load(&cfg.layout.preferences_file())?;
    Ok(preferences.get(key)?.to_string())
}
