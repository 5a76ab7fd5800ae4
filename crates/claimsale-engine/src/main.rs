//! Console front end for claim block sales.
//!
//! Reads commands from stdin, one per line, and prints the player-facing
//! reply to stdout. Logs go to stderr.
//!
//! ```text
//! alex giveblocks 15
//! alex sellblocks          # quote
//! alex sell blocks 7       # sell
//! ```
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`CLAIMSALE_CONFIG`, else `claimsale.yaml` if
//!    present, else defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Apply `CLAIMSALE_*` environment overrides, warning about bad values
//! 4. Compile the message catalog
//! 5. Wire the in-memory economy and player store into the sale service
//! 6. Process stdin until it closes

mod command;
mod console;
mod players;

use std::path::{Path, PathBuf};

use anyhow::Context;
use claimsale_core::config::LoggingConfig;
use claimsale_core::economy::InMemoryEconomy;
use claimsale_core::store::InMemoryPlayerStore;
use claimsale_core::{ClaimBlockSales, MessageCatalog, SaleConfig};
use claimsale_types::WorldId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::Console;

/// Default configuration file, read when present.
const DEFAULT_CONFIG_PATH: &str = "claimsale.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the message catalog, or stdin fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = load_config()?;
    init_logging(&config.logging);
    for ignored in config.apply_env_overrides() {
        warn!(
            variable = ignored.variable,
            value = ignored.value,
            reason = ignored.reason,
            "ignoring invalid environment override"
        );
    }

    info!(
        economy_mode = config.economy.economy_mode,
        default_sell_price = %config.economy.default_sell_price,
        currency = config.economy.currency_name,
        deposit_timeout_ms = config.timeouts.deposit_timeout_ms,
        "claimsale-engine starting"
    );

    let catalog = MessageCatalog::new(&config.messages).context("building message catalog")?;
    let sales = ClaimBlockSales::new(
        InMemoryEconomy::new(config.currency()),
        InMemoryPlayerStore::new(config.account_defaults()),
        config.settings(),
    );
    let world_id = WorldId::new();
    info!(world_id = %world_id, "in-memory world ready");

    let mut console = Console::new(sales, catalog, world_id);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if let Some(reply) = console.handle(&line).await {
            println!("{reply}");
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}

/// Locate and load the configuration file.
fn load_config() -> anyhow::Result<SaleConfig> {
    let path = std::env::var("CLAIMSALE_CONFIG").map_or_else(
        |_| {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            default.exists().then(|| default.to_path_buf())
        },
        |p| Some(PathBuf::from(p)),
    );

    path.map_or_else(
        || Ok(SaleConfig::default()),
        |path| {
            SaleConfig::from_file(&path)
                .with_context(|| format!("loading config from {}", path.display()))
        },
    )
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    }
}
