use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "adcampaign")]
#[command(author, version, about = "Generate influencer ad campaigns from a product description", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format (pretty or json)
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: String,

    /// OTLP/gRPC endpoint for span export (overrides the config file and environment)
    #[arg(long, global = true)]
    pub otlp_endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server port (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the pipeline once and print the campaign summary
    Run {
        /// Product description
        #[arg(short, long)]
        description: String,

        /// User id recorded on the run
        #[arg(short, long, default_value = "cli-user")]
        user_id: String,
    },
}
