mod args;
mod commands;

use anyhow::Context;
use clap::Parser;
use hakuna_core::HakunaClient;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::Cli;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hakuna_core={level},hakuna={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = cli.client_config().context("invalid client configuration")?;
    let client = HakunaClient::with_reqwest(config).context("failed to create HTTP client")?;
    if let Some(user) = cli.as_user.as_deref().filter(|u| !u.is_empty()) {
        tracing::debug!(user = %user, "entering personal user mode");
        client.set_personal_user_mode(user);
    }

    match commands::execute(&client, &cli.command).await {
        Ok(Some(body)) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(hakuna_core::ApiError::Application(body)) => {
            anyhow::bail!("service error: {}", serde_json::to_string_pretty(&body)?)
        }
        Err(err) => Err(err.into()),
    }
}
