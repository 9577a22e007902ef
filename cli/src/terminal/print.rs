use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "uhf::print";

const BANNER: &str = r#"
  _   _           _       _       _   _           _       _____ _ _
 | | | |_ __   __| | __ _| |_ ___| | | | ___  ___| |_ ___|  ___(_) | ___
 | | | | '_ \ / _  |/ _  | __/ _ \ |_| |/ _ \/ __| __/ __| |_  | | |/ _ \
 | |_| | |_) | (_| | (_| | ||  __/  _  | (_) \__ \ |_\__ \  _| | | |  __/
  \___/| .__/ \__,_|\__,_|\__\___|_| |_|\___/|___/\__|___/_|   |_|_|\___|
       |_|
"#;

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner() {
    print(&format!("{}", BANNER.color(colors::PRIMARY)));

    let text_content: String = format!("⟦ UPDATE-HOSTS-FILE v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.color(colors::ACCENT).bold();
    let sep: ColoredString =
        "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).bright_black();
    print(&format!("{}{}{}", sep, text, sep));
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().color(colors::PRIMARY),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    let message: String = format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT));
    print(&message);
}

/// `name (enabled)` / `name (disabled)` line of a module listing.
pub fn module_line(name: &str, enabled: bool) {
    let state: ColoredString = if enabled {
        "(enabled)".color(colors::SUCCESS)
    } else {
        "(disabled)".color(colors::DISABLED)
    };
    print(&format!("{} {}", name, state));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

pub fn end_of_program() {
    print(&format!(
        "{}",
        "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)
    ));
}
