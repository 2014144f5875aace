use clap::Parser;
use terraform_provider_edgecenter::utils::logger;
use terraform_provider_edgecenter::{CliConfig, EdgeCenterProvider};

pub const PROVIDER_NAME: &str = "edgecenter";

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // stdout 屬於 plugin handshake
    if config.log_json {
        logger::init_json_logger(config.debug);
    } else {
        logger::init_plugin_logger(config.debug);
    }

    tracing::info!(
        "Starting terraform-provider-edgecenter {}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = tf_provider::serve(PROVIDER_NAME, EdgeCenterProvider::default()).await {
        tracing::error!("❌ Provider server stopped: {}", e);
        std::process::exit(1);
    }
}
