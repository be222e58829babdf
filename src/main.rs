//! Base Dropper CLI
//!
//! Command-line front end for the Builder Badge drop on Base:
//!
//! - **status**: wallet, network and drop progress
//! - **mint / store / tip**: the three write actions, each driven through the
//!   transaction lifecycle (precheck, signature, confirmation, refresh)
//! - **watch**: keep the counters polled and print periodic statistics

use anyhow::{Context, Result};
use base_dropper::config::AppConfig;
use base_dropper::gateway::{AlloyGateway, ChainGateway};
use base_dropper::lifecycle::{Panel, TransactionController};
use base_dropper::metadata::MetadataClient;
use base_dropper::notify::TracingNotifier;
use base_dropper::panels::{TipInput, TipPreset};
use base_dropper::wallet::{format_eth_4, WalletManager};
use base_dropper::{endpoints, metrics, Dropper};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "DROPPER_CONFIG", default_value = "dropper.toml")]
    config: PathBuf,

    /// File holding the hex signing key; DROPPER_PRIVATE_KEY is used otherwise
    #[arg(long, env = "DROPPER_KEY_FILE")]
    key_file: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print status as JSON on stdout
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wallet, network and drop progress
    Status,
    /// Mint one Builder Badge to the connected account
    Mint,
    /// Store a message in the vault (max 280 characters)
    Store { text: String },
    /// List messages stored by the connected account
    Messages,
    /// Send a tip to the creator
    Tip {
        /// Preset amount; wins over --amount
        #[arg(long, value_enum)]
        preset: Option<TipPreset>,
        /// Custom amount in ETH
        #[arg(long)]
        amount: Option<String>,
    },
    /// Poll counters and print statistics until Ctrl-C
    Watch,
    /// Point the session at another supported chain
    SwitchChain { chain_id: u64 },
    /// Show metadata for a minted token
    Token { token_id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("🚀 Starting Base Dropper v{}", env!("CARGO_PKG_VERSION"));

    info!("📋 Loading configuration from: {}", args.config.display());
    let config = load_config(&args.config)?;
    info!("🌐 Target chain: {}", config.chain());

    let wallet = match &args.key_file {
        Some(path) => Some(WalletManager::from_file(path).context("Failed to load wallet")?),
        None => WalletManager::from_env().context("Failed to load wallet")?,
    };
    match &wallet {
        Some(wallet) => info!("💼 Wallet address: {}", wallet.address()),
        None => warn!("No signing key configured, running read-only"),
    }

    let gateway: Arc<dyn ChainGateway> =
        Arc::new(AlloyGateway::new(&config, wallet).context("Failed to connect to RPC")?);
    let app = Dropper::new(config, gateway, Arc::new(TracingNotifier::new()));

    match args.command {
        Command::Status => status(&app, args.json).await,
        Command::Mint => mint(&app).await,
        Command::Store { text } => {
            app.vault.set_input(text);
            app.refresh_all().await;
            write(&app, &app.vault).await?;
            print_messages(&app);
            Ok(())
        }
        Command::Messages => {
            app.refresh_all().await;
            print_messages(&app);
            Ok(())
        }
        Command::Tip { preset, amount } => {
            let input = match (preset, amount) {
                (Some(preset), _) => TipInput::preset(preset),
                (None, Some(amount)) => TipInput::custom(amount),
                (None, None) => TipInput::default(),
            };
            app.tip.set_input(input);
            app.refresh_all().await;
            write(&app, &app.tip).await
        }
        Command::Watch => watch(&app).await,
        Command::SwitchChain { chain_id } => {
            let chain = app
                .switch_chain(chain_id)
                .await
                .with_context(|| format!("Failed to switch to chain {chain_id}"))?;
            info!("🔀 Switched to {}", chain);
            status(&app, args.json).await
        }
        Command::Token { token_id } => token(&app, token_id).await,
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "base_dropper=debug,dropper=debug,info"
    } else {
        "base_dropper=info,dropper=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Load configuration; a missing file falls back to environment only
fn load_config(path: &std::path::Path) -> Result<AppConfig> {
    let file = if path.exists() {
        Some(path)
    } else {
        warn!("Config file '{}' not found, using environment only", path.display());
        None
    };
    AppConfig::load(file).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Submit, print the explorer link, then wait for the receipt
async fn write<P: Panel>(app: &Dropper, controller: &TransactionController<P>) -> Result<P::Outcome> {
    let tx = controller.submit().await?;
    info!("🔗 {}", app.config().chain().tx_url(&tx));
    Ok(controller.observe(tx).await?)
}

async fn mint(app: &Dropper) -> Result<()> {
    app.refresh_all().await;
    let outcome = write(app, &app.mint).await?;
    info!("📊 {}", app.mint_stats());

    if let Some(token_id) = outcome.token_id {
        let client = MetadataClient::new(app.config().ipfs_gateway.clone())?;
        if let Some(metadata) = client.fetch_token(app.gateway().as_ref(), token_id).await {
            info!(
                "🏷️ {} {}",
                metadata.name.as_deref().unwrap_or("Builder Badge"),
                client.image_url(&metadata).unwrap_or_default()
            );
        }
    }
    Ok(())
}

async fn status(app: &Dropper, json: bool) -> Result<()> {
    app.refresh_all().await;
    if json {
        let report = app.status_report().await.context("Failed to query wallet status")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    match app.wallet_status().await.context("Failed to query wallet status")? {
        Some(status) => {
            info!("💼 {}", status.address);
            info!("🌐 {}", status.network_label());
            info!("💰 {}", status.balance_label());
        }
        None => info!("💼 Not connected"),
    }
    info!("📊 {}", app.mint_stats());
    Ok(())
}

async fn token(app: &Dropper, token_id: u64) -> Result<()> {
    let client = MetadataClient::new(app.config().ipfs_gateway.clone())?;
    let uri = app
        .gateway()
        .token_uri(alloy::primitives::U256::from(token_id))
        .await
        .context("Failed to read tokenURI")?;
    let metadata = client.fetch(&uri).await.context("Failed to fetch metadata")?;
    info!("🏷️ #{} {}", token_id, metadata.name.as_deref().unwrap_or("-"));
    if let Some(description) = &metadata.description {
        info!("   {}", description);
    }
    if let Some(image) = client.image_url(&metadata) {
        info!("   {}", image);
    }
    Ok(())
}

fn print_messages(app: &Dropper) {
    let messages = app.messages();
    info!("📝 {} stored message(s)", messages.len());
    for (i, message) in messages.iter().enumerate() {
        info!("   {}. {}", i + 1, message);
    }
}

/// Poll counters and report until Ctrl-C
async fn watch(app: &Dropper) -> Result<()> {
    if app.config().monitoring.enable_metrics {
        let port = app.config().monitoring.metrics_port;
        info!("📊 Starting metrics server on port {}", port);
        tokio::spawn(async move {
            if let Err(e) = endpoints::endpoint_server(port).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    let poller = app.start_polling();
    let mut stats_interval = tokio::time::interval(app.config().poll_interval());
    info!("🎬 Watching, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = stats_interval.tick() => {
                let snapshot = app.snapshot();
                info!("📊 {}", app.mint_stats());
                if let Some(balance) = snapshot.native_balance {
                    info!("   Balance: {} ETH", format_eth_4(balance));
                }
                if let Some(messages) = &snapshot.messages {
                    info!("   Messages: {}", messages.len());
                }
                let m = metrics::metrics();
                info!(
                    "   Tx submitted={} confirmed={} failed={}",
                    m.tx_submitted.get(),
                    m.tx_confirmed.get(),
                    m.tx_failed.get()
                );
            }

            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Received shutdown signal");
                break;
            }
        }
    }

    poller.stop().await;
    info!("👋 Shutting down gracefully...");
    Ok(())
}
