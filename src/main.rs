//! Lectern command line

use std::process::ExitCode;

use clap::Parser;

mod cli;

#[tokio::main]
#[expect(clippy::print_stderr, reason = "Errors are reported to the user")]
pub async fn main() -> ExitCode {
    _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    lectern::logging::init(&cli.config.log_level, cli.config.log_format);

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
