use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{paths::resolve_under, AppConfig, CliArgs};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use api_ingress::{ApiIngress, ApiIngressConfig};
use inventory::config::InventoryConfig;
use inventory::domain::store::DocumentStore;
use inventory::infra::storage::{InMemoryStore, JsonFileStore};
use inventory::Inventory;

mod shutdown;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Housewares Server - inventory and buyers over a JSON document store
#[derive(Parser)]
#[command(name = "housewares-server")]
#[command(about = "Housewares Server - inventory and buyers over a JSON document store")]
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

    /// Keep the document in memory instead of the JSON file
    #[arg(long)]
    mock: bool,

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

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Housewares Server starting");

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let inventory_cfg: InventoryConfig = config.module_config("inventory")?;
    let ingress_cfg: ApiIngressConfig = config.module_config("api_ingress")?;

    let store: Arc<dyn DocumentStore> = if args.mock {
        tracing::warn!("--mock: documents are kept in memory and lost on exit");
        Arc::new(InMemoryStore::new(inventory_cfg.seed_buyers))
    } else {
        let path = config.store_path();
        tracing::info!("Using document store at {}", path.display());
        Arc::new(JsonFileStore::new(path, inventory_cfg.seed_buyers))
    };

    let inventory = Inventory::init(store, &inventory_cfg);

    let home_dir = Path::new(&config.server.home_dir);
    let assets_dir = resolve_under(home_dir, &ingress_cfg.assets_dir);
    let timeout = match config.server.timeout_sec {
        0 => DEFAULT_REQUEST_TIMEOUT,
        secs => Duration::from_secs(secs),
    };
    let ingress = ApiIngress::new(ingress_cfg, assets_dir, timeout);

    let router = ingress.build_router(
        inventory.register_rest(axum::Router::new()),
        inventory.openapi(),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address '{}:{}'",
                config.server.host, config.server.port
            )
        })?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match shutdown::wait_for_shutdown().await {
                Ok(()) => cancel.cancel(),
                // without signal handlers the server runs until killed
                Err(e) => tracing::error!(error = %e, "failed to install signal handlers"),
            }
        });
    }

    ingress.serve(router, addr, cancel).await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // module sections must deserialize into their typed configs
    let _: InventoryConfig = config.module_config("inventory")?;
    let _: ApiIngressConfig = config.module_config("api_ingress")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Document store: {}", config.store_path().display());
    println!("{}", config.to_yaml()?);

    Ok(())
}
