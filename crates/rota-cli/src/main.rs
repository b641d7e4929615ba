//! rota - drive an in-memory job store from the command line.
//!
//! Reads one command per line on stdin and writes one JSON document per line
//! on stdout. Logs go to stderr.
//!
//! ```text
//! $ printf 'add j1 t1 1 hello\npull 2\nstatus\n' | rota
//! ```

mod command;

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use rota_core::{Realms, StoreConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::Session;

const DEFAULT_REALM: &str = "default";

#[derive(Parser)]
#[command(name = "rota")]
#[command(about = "Lease-based multi-queue job dispatcher", long_about = None)]
#[command(version)]
struct Cli {
    /// Largest payload accepted per job, in bytes
    #[arg(long, env = "ROTA_MAX_PAYLOAD_BYTES", default_value_t = StoreConfig::default().max_payload_bytes)]
    max_payload_bytes: usize,

    /// Seconds a pulled job is withheld from other consumers
    #[arg(long, env = "ROTA_LEASE_SECS", default_value_t = StoreConfig::default().default_lease_secs)]
    lease_secs: u64,

    /// Realm that commands apply to until `realm <name>` switches it
    #[arg(long, env = "ROTA_REALM", default_value = DEFAULT_REALM)]
    realm: String,
}

fn init_logging() {
    let log_format = std::env::var("ROTA_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = StoreConfig::default()
        .with_max_payload_bytes(cli.max_payload_bytes)
        .with_default_lease_secs(cli.lease_secs);
    info!(
        max_payload_bytes = config.max_payload_bytes,
        lease_secs = config.default_lease_secs,
        realm = %cli.realm,
        "rota starting"
    );

    let mut session = Session::new(Realms::new(config), cli.realm);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        debug!(line, "command");
        let reply = session.execute(line).await;
        let mut out = serde_json::to_vec(&reply).context("encoding reply")?;
        out.push(b'\n');
        stdout.write_all(&out).await.context("writing stdout")?;
        stdout.flush().await.context("flushing stdout")?;
    }

    info!("stdin closed, exiting");
    Ok(())
}
