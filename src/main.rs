//! bond-relay command line.
//!
//! ```text
//! bond-relay --config relay.toml operations --role institution
//! bond-relay --config relay.toml invoke --actor sbi issueBond B1 1000
//! bond-relay --config relay.toml receipt 0x…
//! bond-relay --config relay.toml resync --actor sbi
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::TxHash;
use clap::{Parser, Subcommand};
use serde_json::json;

use bond_relay::catalog::{OperationCatalog, Role};
use bond_relay::config::{load_config, RelayConfig};
use bond_relay::observability::init_logging;
use bond_relay::Relay;

#[derive(Parser)]
#[command(name = "bond-relay")]
#[command(about = "Submit role-gated electoral bond operations to the ledger", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "relay.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the operations a role (or a configured actor) may invoke
    Operations {
        #[arg(long, conflicts_with = "actor")]
        role: Option<Role>,
        #[arg(long)]
        actor: Option<String>,
    },
    /// Invoke an operation as an actor and wait for the receipt
    Invoke {
        #[arg(long)]
        actor: String,
        /// Override the configured deadline
        #[arg(long)]
        deadline_ms: Option<u64>,
        operation: String,
        args: Vec<String>,
    },
    /// Query the status of a transaction by hash
    Receipt { tx_hash: TxHash },
    /// Re-read an actor's nonce from the ledger
    Resync {
        #[arg(long)]
        actor: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        RelayConfig::default()
    };
    init_logging(&config.observability);

    match cli.command {
        Commands::Operations { role, actor } => {
            let role = match (role, actor) {
                (Some(role), _) => role,
                (None, Some(name)) => config
                    .actor(&name)
                    .ok_or_else(|| format!("unknown actor '{}'", name))?
                    .role
                    .parse()?,
                (None, None) => return Err("pass --role or --actor".into()),
            };
            let catalog = OperationCatalog::standard();
            let ops: Vec<_> = catalog
                .operations(role)
                .iter()
                .map(|op| {
                    json!({
                        "name": op.name,
                        "contract": op.contract,
                        "signature": op.signature(),
                        "schema_version": op.schema_version,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&ops)?);
        }
        Commands::Invoke {
            actor,
            deadline_ms,
            operation,
            args,
        } => {
            let relay = Arc::new(Relay::connect(&config).await?);
            let client = relay
                .client(&actor)
                .ok_or_else(|| format!("unknown actor '{}'", actor))?;

            let deadline = deadline_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| relay.deadline());
            let result = client
                .invoke_str_with_deadline(&operation, &args, deadline)
                .await;

            match result {
                Ok(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
                Err(e) => {
                    if let Some(tx_hash) = e.tx_hash {
                        eprintln!(
                            "transaction {} was sent; check it with `bond-relay receipt {}`",
                            tx_hash, tx_hash
                        );
                    }
                    return Err(e.into());
                }
            }
        }
        Commands::Receipt { tx_hash } => {
            let relay = Relay::connect(&config).await?;
            let status = relay.receipt(tx_hash).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            if !status.is_final() {
                eprintln!("transaction {} is not final yet; query it again later", tx_hash);
            }
        }
        Commands::Resync { actor } => {
            let relay = Arc::new(Relay::connect(&config).await?);
            let client = relay
                .client(&actor)
                .ok_or_else(|| format!("unknown actor '{}'", actor))?;
            let nonce = client.resync().await?;
            println!("{}", json!({ "actor": actor, "next_nonce": nonce }));
        }
    }

    Ok(())
}
