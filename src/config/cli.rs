use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "terraform-provider-edgecenter")]
#[command(about = "Terraform provider plugin for the EdgeCenter cloud")]
pub struct CliConfig {
    #[arg(long, env = "EC_PROVIDER_DEBUG", help = "Enable debug logging")]
    pub debug: bool,

    #[arg(long, help = "Emit log lines as JSON")]
    pub log_json: bool,
}
