//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use switchboard_domain::AuthContext;

/// Output format for envelopes and listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Machine-readable JSON
    #[default]
    Json,
    /// Human-readable, colored view
    Pretty,
}

/// CLI arguments for switchboard
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(author, version, about = "Invoke provider actions through one uniform gateway")]
#[command(long_about = r#"
Switchboard exposes provider API actions behind one gateway. Every
invocation checks credentials and the input contract before any upstream
call, and always ends in an envelope: {"success": bool, "data"?, "error"?}.

Configuration files are loaded from (in priority order):
1. SWITCHBOARD_* environment variables
2. --config <path>           Explicit config file
3. ./switchboard.toml        Project-level config
4. ~/.config/switchboard/config.toml   Global config

Example:
  switchboard list --provider drive
  switchboard describe tickets search_tickets
  switchboard invoke drive search_files --params '{"query": "roadmap", "limit": 10}'
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Invoke one action and print its envelope
    Invoke(InvokeArgs),

    /// List registered actions with their credential requirements
    List {
        /// Only list actions of this provider
        #[arg(long, value_name = "PROVIDER")]
        provider: Option<String>,
    },

    /// Print the input and output contracts of an action
    Describe { provider: String, action: String },
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    pub provider: String,
    pub action: String,

    /// Action params as a JSON object
    #[arg(long, value_name = "JSON", conflicts_with = "params_file")]
    pub params: Option<String>,

    /// Read action params from a JSON file
    #[arg(long, value_name = "PATH")]
    pub params_file: Option<PathBuf>,

    /// Bearer token for the provider
    #[arg(
        long,
        value_name = "TOKEN",
        env = "SWITCHBOARD_AUTH_TOKEN",
        hide_env_values = true
    )]
    pub auth_token: Option<String>,

    #[arg(long, value_name = "ID")]
    pub account_id: Option<String>,

    /// Tenant subdomain for per-tenant providers
    #[arg(long, value_name = "SUBDOMAIN")]
    pub subdomain: Option<String>,

    /// Read credentials from a JSON file (`authToken`, `accountId`,
    /// `subdomain` and provider-specific fields); flags take precedence
    #[arg(long, value_name = "PATH")]
    pub auth_file: Option<PathBuf>,
}

impl InvokeArgs {
    /// Overlay credential flags on top of `base` (usually from `--auth-file`).
    pub fn auth_context(&self, base: AuthContext) -> AuthContext {
        let mut auth = base;
        if let Some(token) = &self.auth_token {
            auth = auth.with_auth_token(token);
        }
        if let Some(account_id) = &self.account_id {
            auth = auth.with_account_id(account_id);
        }
        if let Some(subdomain) = &self.subdomain {
            auth = auth.with_subdomain(subdomain);
        }
        auth
    }
}
