//! CLI command definitions

use crate::core::settings::ApiOverrides;
use clap::Args;
use std::path::PathBuf;

/// Run a pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Inputs file, overrides the pipeline's `input_file`
    #[arg(short, long)]
    pub inputs: Option<PathBuf>,

    /// Print the run statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    #[command(flatten)]
    pub api: ApiArgs,
}

/// Validate a pipeline without contacting the API
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Inputs file, overrides the pipeline's `input_file`
    #[arg(short, long)]
    pub inputs: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List registered jobs
#[derive(Debug, Args, Clone)]
pub struct JobsCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Registry API connection flags
#[derive(Debug, Args, Clone, Default)]
pub struct ApiArgs {
    /// Registry API base URL, e.g. https://quay.example.com/api/v1
    #[arg(long, env = "QUAY_API_BASE_URL")]
    pub base_url: Option<String>,

    /// API token
    #[arg(long, env = "QUAY_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Authentication scheme: bearer, basic or apikey
    #[arg(long, env = "QUAY_AUTH_TYPE")]
    pub auth_type: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "API_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long, env = "DISABLE_TLS_VERIFY")]
    pub disable_tls_verify: bool,

    /// PEM bundle of extra trusted CA certificates
    #[arg(long, env = "CA_BUNDLE")]
    pub ca_bundle: Option<PathBuf>,
}

impl From<ApiArgs> for ApiOverrides {
    fn from(args: ApiArgs) -> Self {
        ApiOverrides {
            base_url: args.base_url,
            token: args.token,
            auth_type: args.auth_type,
            timeout_secs: args.timeout,
            disable_tls_verify: args.disable_tls_verify,
            ca_bundle: args.ca_bundle,
        }
    }
}
