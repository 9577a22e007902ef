mod commands;
mod terminal;

use std::process::ExitCode;

use tracing::error;

use commands::{CommandLine, Commands, about, modules, service, update};
use terminal::{logging, print};
use uhf_common::config::{Config, Layout};

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    let cfg = Config::new(Layout::new(commands.prefix, commands.hosts_file));

    let result = match commands.command {
        Some(Commands::Update { no_interactive }) => {
            print::header("updating hosts file");
            let res = update::update(cfg, no_interactive).await;
            print::end_of_program();
            res
        }
        Some(Commands::Modules(command)) => modules::modules(&cfg, command),
        Some(Commands::Service(command)) => service::service(command),
        Some(Commands::Version) => {
            about::version();
            Ok(())
        }
        Some(Commands::About) => {
            about::about();
            Ok(())
        }
        None => {
            about::getting_started();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
