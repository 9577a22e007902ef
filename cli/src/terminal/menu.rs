use std::path::Path;
use std::process::Command;

use anyhow::Context;
use colored::*;
use console::Term;

use crate::terminal::{colors, print};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishChoice {
    Finish,
    Edit,
    View,
}

impl FinishChoice {
    fn from_key(key: char) -> Option<Self> {
        match key {
            '1' | '\n' | '\r' | 'q' => Some(FinishChoice::Finish),
            '2' | 'e' => Some(FinishChoice::Edit),
            '3' | 'v' => Some(FinishChoice::View),
            _ => None,
        }
    }
}

/// Asks what to do after a successful update. Only call with a TTY attached.
pub fn finish_menu(term: &Term, hosts_file: &Path) -> anyhow::Result<FinishChoice> {
    print::print("");
    print::print(&format!("{}", "What do you want to do?".color(colors::PRIMARY)));
    print::print_status(format!("[{}] Finish", "1".color(colors::ACCENT)));
    print::print_status(format!("[{}] Edit {}", "2".color(colors::ACCENT), hosts_file.display()));
    print::print_status(format!("[{}] View {}", "3".color(colors::ACCENT), hosts_file.display()));

    loop {
        let key = term.read_char().context("failed to read menu choice")?;
        if let Some(choice) = FinishChoice::from_key(key.to_ascii_lowercase()) {
            return Ok(choice);
        }
    }
}

/// Runs `program path` attached to the terminal and waits for it.
pub fn open_with(program: &str, path: &Path) -> anyhow::Result<()> {
    let status = Command::new(program)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch {}", program))?;

    if !status.success() {
        anyhow::bail!("{} exited with {} while opening {}", program, status, path.display());
    }
    Ok(())
}
