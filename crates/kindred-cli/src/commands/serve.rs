//! HTTP server command

use clap::Args;

use crate::AppContext;
use kindred_server::{run_server, ServerConfig};

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (defaults to the configured bind address)
    #[arg(long)]
    pub bind: Option<String>,
}

pub async fn run(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let config = ServerConfig::default()
        .with_bind(args.bind.clone().unwrap_or_else(|| ctx.config.bind.clone()))
        .with_cors_origins(ctx.config.cors_origins.clone())
        .with_passcode_cost(ctx.config.passcode_cost);

    tracing::info!("Starting HTTP server on {}", config.bind);
    run_server(ctx.storage.clone(), config).await
}
