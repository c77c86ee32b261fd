//! Command handlers.

pub mod assign;
pub mod compile;
pub mod deploy;
pub mod events;
pub mod pins;
pub mod status;

use twinforge_core::Workbench;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Route a parsed command to its handler.
pub async fn dispatch(
    command: Command,
    workbench: &Workbench,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        Command::Status => status::handle(workbench, global).await,
        Command::Pins => pins::handle(workbench, global).await,
        Command::Compile(args) => compile::handle(workbench, args, global).await,
        Command::Deploy(args) => deploy::handle(workbench, args, global).await,
        Command::Assign(args) => assign::handle(workbench, args, global).await,
        Command::Events(args) => events::handle(workbench, args, global).await,
        Command::ConfirmNetwork => handle_confirm_network(workbench, global).await,
        Command::Ping => handle_ping(workbench, global).await,
    }
}

async fn handle_confirm_network(
    workbench: &Workbench,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    workbench.confirm_network().await?;
    output::print_output("Wi-Fi network confirmed", global.quiet);
    Ok(())
}

async fn handle_ping(workbench: &Workbench, global: &GlobalOpts) -> Result<(), CliError> {
    let status = workbench.client().health().await?;
    output::print_output(
        &format!("backend {}: {status}", workbench.config().base_url),
        global.quiet,
    );
    Ok(())
}
