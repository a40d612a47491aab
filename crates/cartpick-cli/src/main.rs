mod cli;
mod commands;
mod error;
mod logger;
mod metadata;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing::Instrument;

use crate::cli::Cli;
use crate::error::CliError;
use crate::metadata::RequestId;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose, cli.log_json);

    let request_id = RequestId::new_v4();
    let span = tracing::info_span!("request", request_id = %request_id);
    match run(&cli, request_id).instrument(span).await {
        Ok(code) => code,
        Err(failure) => {
            eprintln!("error: {failure}");
            ExitCode::from(failure.exit_code())
        }
    }
}

async fn run(cli: &Cli, request_id: RequestId) -> Result<ExitCode, CliError> {
    let output = commands::run(cli, request_id).await?;
    output::render(&output.envelope, &output.table, cli.format, cli.pretty)?;

    if !output.envelope.errors.is_empty() {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}
