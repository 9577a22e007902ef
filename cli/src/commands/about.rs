use colored::*;

use crate::terminal::{colors, print};

const LONG_DESCRIPTION: &str = "The UpdateHostsFile program is a command-line utility \
designed to provide users with an efficient and effective method of updating their hosts \
file. With the ability to leverage a variety of different sources, including local and \
web-based modules, users can quickly and easily update their hosts file with the most \
up-to-date information.";

pub fn program_info() {
    print::banner();
    print::print(&format!(
        "Version: {}",
        env!("CARGO_PKG_VERSION").color(colors::ACCENT)
    ));
    print::print("");
    print::print(&format!(
        "Running on {}/{}.",
        std::env::consts::OS.color(colors::ATTENTION),
        std::env::consts::ARCH.color(colors::ATTENTION)
    ));
}

pub fn about() {
    program_info();
    print::print("");
    print::header("about");
    print::print("");
    print::print(LONG_DESCRIPTION);
}

pub fn version() {
    print::print("UpdateHostsFile");
    print::print(&format!("Version: {}", env!("CARGO_PKG_VERSION")));
}

pub fn getting_started() {
    program_info();
    print::print("");
    print::print(&format!(
        "Run {} to get started.\n\nTo know more about the program, run {}.",
        "update-hosts-file --help/-h".color(colors::SUCCESS),
        "update-hosts-file about".color(colors::SUCCESS)
    ));
}
