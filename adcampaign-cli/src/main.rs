use adcampaign_cli::{CampaignConfig, Cli, Commands, build_runner, init_telemetry};
use adcampaign_runner::RunStatus;
use adcampaign_server::{SecurityConfig, ServerConfig};
use adcampaign_telemetry::LogFormat;
use anyhow::{Result, anyhow};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded environment from: {}", path.display());
    }

    let cli = Cli::parse();
    let format: LogFormat = cli.log_format.parse().map_err(|e: String| anyhow!(e))?;

    let mut config = CampaignConfig::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.otlp_endpoint {
        config.telemetry.otlp_endpoint = Some(endpoint);
    }
    if let Err(e) = init_telemetry(&config, format) {
        eprintln!("{e}");
    }

    let runner = Arc::new(build_runner(&config)?);

    let result = match cli.command {
        Commands::Serve { port } => {
            let security = SecurityConfig {
                allowed_origins: config.server.allowed_origins.clone(),
                expose_error_details: config.server.expose_error_details,
                ..SecurityConfig::default()
            };
            let server = ServerConfig::new(runner).with_security(security);
            adcampaign_server::serve(server, port.unwrap_or(config.server.port)).await
        }
        Commands::Run { description, user_id } => {
            let outcome = runner.run_to_completion(user_id, None, description).await?;
            println!("{}", outcome.output());
            match outcome.status {
                RunStatus::Done => Ok(()),
                RunStatus::Failed { stage, error } => Err(anyhow!(
                    "run failed in stage '{}': {error}",
                    stage.as_deref().unwrap_or("unknown")
                )),
            }
        }
    };

    adcampaign_telemetry::shutdown_telemetry();
    result
}
