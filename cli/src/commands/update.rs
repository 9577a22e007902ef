use colored::*;
use console::Term;
use is_root::is_root;
use tracing::{info, warn};

use uhf_common::config::Config;
use uhf_common::preferences::{DEFAULT_EDITOR, DEFAULT_VIEWER, Preferences};
use uhf_core::fetcher::HttpFetcher;
use uhf_core::system::SystemRepo;
use uhf_core::update::{UpdateReport, UpdateService};

use crate::terminal::menu::{self, FinishChoice};
use crate::terminal::{colors, print};

pub async fn update(cfg: Config, no_interactive: bool) -> anyhow::Result<()> {
    if !is_root() {
        warn!(
            "Not running as root, replacing {} will probably fail",
            cfg.layout.hosts_file().display()
        );
    }

    let fetcher = HttpFetcher::new(cfg.fetch_timeout)?;
    let service = UpdateService::new(cfg, Box::new(SystemRepo), Box::new(fetcher));
    let report = service.run().await?;

    print_summary(&report);

    let layout = &service.config().layout;
    if no_interactive || !Term::stdout().is_term() {
        info!("Program finished");
        return Ok(());
    }

    let choice = menu::finish_menu(&Term::stdout(), layout.hosts_file())?;
    let key = match choice {
        FinishChoice::Finish => return Ok(()),
        FinishChoice::Edit => DEFAULT_EDITOR,
        FinishChoice::View => DEFAULT_VIEWER,
    };

    let preferences = Preferences::load(&layout.preferences_file())?;
    menu::open_with(preferences.get(key)?, layout.hosts_file())
}

fn print_summary(report: &UpdateReport) {
    print::fat_separator();
    let lines: ColoredString = report.lines_written.to_string().color(colors::SUCCESS).bold();
    print::centerln(&format!("{} lines were written", lines));
    print::fat_separator();

    print::print_status(format!("Backup: {}", report.backup.filename));
    if !report.rotated.is_empty() {
        print::print_status(format!("Old backups removed: {}", report.rotated.len()));
    }
    for (kind, name) in &report.loaded {
        print::print_status(format!("Loaded {} module '{}'", kind, name));
    }
    for skipped in &report.skipped {
        print::print_status(format!(
            "{} {} module '{}': {}",
            "Skipped".color(colors::ATTENTION),
            skipped.kind,
            skipped.name,
            skipped.reason
        ));
    }
}
