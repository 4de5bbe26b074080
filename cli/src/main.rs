//! CLI entrypoint for switchboard
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use serde_json::Value;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use switchboard_application::{ActionCatalog, InvokeActionInput, InvokeActionUseCase};
use switchboard_domain::{ActionId, AuthContext, Provider};
use switchboard_infrastructure::{
    ActionRegistry, ConfigLoader, FileConfig, JsonlInvocationLogger,
};
use switchboard_presentation::{Cli, Command, InvokeArgs, OutputFormatter, formatter_for};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set.
    // Logs go to stderr so stdout carries only the rendered result.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    config.validate().context("Invalid configuration")?;

    // === Dependency Injection ===
    let client = config
        .upstream
        .build_client()
        .context("Failed to build upstream HTTP client")?;
    let registry = Arc::new(ActionRegistry::builtin(Arc::new(client))?);
    info!(
        actions = registry.len(),
        providers = ?registry.provider_counts(),
        "Starting switchboard"
    );

    let formatter = formatter_for(cli.output);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Command::List { provider } => {
            let definitions = match provider {
                Some(name) => registry.definitions_for(name.parse::<Provider>()?),
                None => registry.definitions(),
            };
            println!("{}", formatter.format_actions(&definitions));
            Ok(ExitCode::SUCCESS)
        }
        Command::Describe { provider, action } => {
            let id = ActionId::parse(&provider, &action)?;
            let Some(descriptor) = registry.lookup(&id) else {
                bail!("Action not found: {}", id);
            };
            println!("{}", formatter.format_contracts(descriptor.definition()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Invoke(args) => invoke(registry, &config, args, formatter.as_ref()).await,
    }
}

async fn invoke(
    registry: Arc<ActionRegistry>,
    config: &FileConfig,
    args: InvokeArgs,
    formatter: &dyn OutputFormatter,
) -> Result<ExitCode> {
    let params = read_params(&args)?;
    let base_auth = match &args.auth_file {
        Some(path) => read_json::<AuthContext>(path).context("Failed to read --auth-file")?,
        None => AuthContext::default(),
    };
    let auth = args.auth_context(base_auth);

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling invocation");
            on_interrupt.cancel();
        }
    });

    let mut use_case = InvokeActionUseCase::new(registry)
        .with_gateway_params(config.gateway.to_params())
        .with_aggregation_params(config.aggregation.to_params())
        .with_cancellation(cancellation);

    if let Some(path) = &config.logging.invocation_log {
        match JsonlInvocationLogger::open(path) {
            Some(logger) => {
                info!("Invocation log: {}", logger.path().display());
                use_case = use_case.with_logger(Arc::new(logger));
            }
            None => warn!("Invocation logging disabled"),
        }
    }

    let input = InvokeActionInput::new(args.provider, args.action)
        .with_params(params)
        .with_auth(auth);
    let envelope = use_case.execute(input).await;

    println!("{}", formatter.format_envelope(&envelope));
    Ok(if envelope.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_params(args: &InvokeArgs) -> Result<Value> {
    if let Some(inline) = &args.params {
        return serde_json::from_str(inline).context("--params is not valid JSON");
    }
    if let Some(path) = &args.params_file {
        return read_json(path).context("Failed to read --params-file");
    }
    Ok(Value::Object(Default::default()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("{} is not valid JSON", path.display()))
}
