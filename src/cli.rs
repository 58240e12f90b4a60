use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for helpcenter-sync
#[derive(Parser, Debug)]
#[clap(name = "helpcenter-sync")]
#[clap(about = "Synchronize a local help-center content tree to the remote", long_about = None)]
pub struct Args {
    /// Content root; every subdirectory is a category
    #[clap(value_name = "DIR")]
    pub root: PathBuf,

    /// Path to a JSON config file
    #[clap(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum node operations in flight (overrides the config file)
    #[clap(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Treat every node as changed and push all content
    #[clap(long)]
    pub force: bool,

    /// Read and validate the tree without contacting the remote
    #[clap(long)]
    pub validate_only: bool,

    /// Print the report as JSON
    #[clap(long)]
    pub json: bool,

    /// Log at debug level unless RUST_LOG is set
    #[clap(short, long)]
    pub verbose: bool,

    /// Help-center base URL (e.g., https://example.zendesk.com)
    #[clap(long, env = "HELPCENTER_URL", value_name = "URL")]
    pub url: Option<String>,

    /// API user (email)
    #[clap(long, env = "HELPCENTER_USER", value_name = "EMAIL")]
    pub user: Option<String>,

    /// API token
    #[clap(long, env = "HELPCENTER_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}
