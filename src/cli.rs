//! CLI commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{self, redact_url_password};
use crate::db;

#[derive(Parser)]
#[command(name = "terrascope")]
#[command(about = "Configurable map, gallery, and alert dashboard views over PostgreSQL tables")]
#[command(version)]
pub struct Cli {
    /// Config file path (JSON, TOML, or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the views configuration table if it does not exist
    Init,

    /// List dashboard tables and their configuration state
    Tables,

    /// Print the stored views configuration for a table
    Config {
        /// Table name
        table: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load_settings(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            tracing::info!(
                "Using database {}",
                redact_url_password(&settings.database_url)
            );
            crate::server::serve(settings).await
        }

        Commands::Init => {
            let client = db::connect(&settings).await?;
            db::fetch_config(&client).await?;
            println!("Configuration store ready.");
            Ok(())
        }

        Commands::Tables => {
            let client = db::connect(&settings).await?;
            let config = db::fetch_config(&client).await?;
            let tables = db::fetch_table_names(&client).await?;

            for table in &tables {
                match config.get(table) {
                    Some(blob) => {
                        let views = blob.get("views").and_then(|v| v.as_str()).unwrap_or("-");
                        println!("{}\tconfigured\tviews: {}", table, views);
                    }
                    None => println!("{}\tunconfigured", table),
                }
            }
            // configured tables whose data table no longer exists
            for table in config.keys().filter(|t| !tables.contains(*t)) {
                println!("{}\tconfigured\t(table missing)", table);
            }
            Ok(())
        }

        Commands::Config { table } => {
            let client = db::connect(&settings).await?;
            let config = db::fetch_config(&client).await?;
            match config.get(&table) {
                Some(blob) => {
                    println!("{}", serde_json::to_string_pretty(blob)?);
                    Ok(())
                }
                None => anyhow::bail!("no views configuration found for table {}", table),
            }
        }
    }
}
