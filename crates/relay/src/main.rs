use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rank_core::SchemeKind;
use rank_relay::api::{self, ReorderRequest};
use rank_relay::config::RelayConfig;
use rank_relay::logging::init_tracing;
use rank_relay::server::{self, Server};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(version, about = "Compute order-key patches for drag-and-drop reordering")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "RANK_RELAY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log debug output from the relay
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply one reorder request read from a file or stdin and print the result
    Reorder {
        /// Request JSON (`{entities, selectedIds, source, destination}`); stdin when omitted
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Print the result on a single line
        #[arg(long)]
        compact: bool,
    },
    /// Print evenly spread seed keys
    Ranks {
        #[arg(long, short, default_value_t = 10)]
        count: usize,

        #[arg(long)]
        scheme: Option<SchemeKind>,
    },
    /// Serve the MCP endpoint over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = RelayConfig::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging.level, cli.verbose)?;

    match cli.command {
        Command::Reorder { input, compact } => {
            let text = match input {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    std::io::stdin()
                        .read_to_string(&mut text)
                        .context("Failed to read request from stdin")?;
                    text
                }
            };
            let request: ReorderRequest =
                serde_json::from_str(&text).context("Invalid reorder request")?;
            let response = api::reorder(&config.ordering, request)?;
            let rendered = if compact {
                serde_json::to_string(&response)?
            } else {
                serde_json::to_string_pretty(&response)?
            };
            println!("{}", rendered);
            eprintln!("{}", response.message.green());
        }
        Command::Ranks { count, scheme } => {
            for key in api::generate_ranks(&config.ordering, count, scheme)? {
                println!("{}", key);
            }
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let server = Arc::new(Server::new(config)?);
            server::serve(server).await?;
        }
    }

    Ok(())
}
