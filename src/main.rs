use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let cli = update_pets::cli::Cli::parse();
    update_pets::logging::init(cli.verbose).context("init logging")?;
    tracing::debug!(verbose = cli.verbose, "parsed cli");

    match cli.command {
        update_pets::cli::Command::Update(args) => {
            update_pets::update::run(args).await.context("update")?;
        }
    }

    Ok(())
}
