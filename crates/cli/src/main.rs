//! LedgerChat CLI: the main entry point.
//!
//! Commands:
//! - `init`   : Write a default config file
//! - `serve`  : Start the HTTP gateway
//! - `ask`    : Answer one question and print the JSON response
//! - `filter` : Run a filter expression directly against the ledger
//! - `status` : Show configuration and ledger summary

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ledgerchat",
    about = "LedgerChat: natural-language questions over the municipal expense ledger",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file if none exists
    Init,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question
    Ask {
        /// The question, in plain language
        message: String,
    },

    /// Run a filter expression against the ledger, without the model
    Filter {
        /// e.g. 'año == 2022 and dependencia == "Salud"'
        expression: String,
    },

    /// Show configuration and ledger status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Filter { expression } => commands::filter::run(expression).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
