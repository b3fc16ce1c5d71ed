//! `medflow` binary entry point

use medflow_cli::{command, execute, Action, Settings};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = command().get_matches();
    let Some((name, args)) = matches.subcommand() else {
        return Ok(ExitCode::SUCCESS);
    };

    let settings = Settings::from_matches(args);
    let action = Action::from_subcommand(name, args)?;
    let portal = settings.open_portal().await?;

    let accepted = execute(&portal, action, &mut std::io::stdout()).await?;
    Ok(if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
