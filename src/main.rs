use clap::Parser;
use storefront_gateway::{CliArgs, GatewayConfig, LoggingConfig, init_logging, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::from_env())?;

    let cli = CliArgs::parse();
    let config = GatewayConfig::from_args(cli)?;

    run_server(config).await
}
