use clap::Parser;
use std::process::ExitCode;
use taskdeck::cli::Cli;
use taskdeck::commands;
use taskdeck::logger::Logger;

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG=taskdeck=debug shows every request.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match commands::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            Logger::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
