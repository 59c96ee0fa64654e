mod config;
mod logger;
mod shell;

use std::process::ExitCode;

use config::Config;
use dymo_printer::{StatusKind, StatusMessage};
use shell::{Shell, parse_command, render};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    let _log_guard = logger::init_logger_with_file(
        &config.log_level,
        config.log_json,
        config.log_dir.as_deref(),
    )?;

    tracing::info!(service_url = %config.service_url, "DYMO desk starting");

    let service = config.service_config();
    let client = service.build_client()?;
    let mut shell = Shell::new(client, service.pacing, config.preferences_store());

    // `dymo-desk print CPU ABC123 3` runs one command and exits
    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = if args.is_empty() {
        shell.run().await?;
        ExitCode::SUCCESS
    } else {
        match parse_command(&args.join(" ")) {
            Ok(Some(command)) => {
                let status = shell.execute(command).await;
                render(&status);
                if status.kind == StatusKind::Error {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }
            Ok(None) => ExitCode::SUCCESS,
            Err(message) => {
                render(&StatusMessage::error(message));
                ExitCode::from(2)
            }
        }
    };

    shell.save();
    tracing::info!("DYMO desk stopped");
    Ok(code)
}
