use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use api_ingress::{shutdown, ApiIngress, ApiIngressConfig};
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, ServerConfig};
use tokio_util::sync::CancellationToken;
use users_info::{config::UsersInfoConfig, UsersInfo};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Users Server - in-memory users CRUD over HTTP
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - in-memory users CRUD over HTTP")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config
        .logging
        .clone()
        .unwrap_or_else(runtime::default_logging_config);
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Typed, validated module sections.
fn module_configs(config: &AppConfig) -> Result<(ApiIngressConfig, UsersInfoConfig)> {
    let ingress: ApiIngressConfig = config.module_config("api_ingress")?;
    ingress.validate()?;
    let users: UsersInfoConfig = config.module_config("users_info")?;
    Ok((ingress, users))
}

fn request_timeout(server: &ServerConfig) -> Duration {
    match server.timeout_sec {
        0 => DEFAULT_REQUEST_TIMEOUT,
        secs => Duration::from_secs(secs),
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");
    let (ingress_cfg, users_cfg) = module_configs(&config)?;

    if ingress_cfg.auth.uses_dev_key() {
        tracing::warn!(
            "modules.api_ingress.auth.api_key is not set, accepting the development key"
        );
    }

    let users = UsersInfo::init(users_cfg).await?;
    let user_count = users.client().list_users().await?.len();
    tracing::info!("users_info ready with {} users", user_count);

    let ingress = ApiIngress::new(ingress_cfg);
    let router = ingress.build_router(
        users.register_rest(Router::new()),
        Some(users.openapi()),
        request_timeout(&config.server),
    )?;

    let cancel = CancellationToken::new();
    let signals = shutdown::cancel_on_signal(cancel.clone());

    let result = ingress
        .serve(&config.server.bind_addr(), router, cancel.clone())
        .await;

    cancel.cancel();
    if let Err(e) = signals.await {
        tracing::warn!(error = %e, "Signal listener task ended abnormally");
    }
    tracing::info!("Users server stopped");
    result
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    module_configs(&config)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
