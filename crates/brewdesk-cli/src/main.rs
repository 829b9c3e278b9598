//! brewdesk - command-line admin console for the coffee-shop ordering backend.
//!
//! Signs an administrator in, keeps the session on disk between runs, and
//! drives the dashboard, order and product endpoints.

mod commands;
mod output;
mod terminal;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brewdesk_core::Config;
use commands::{configure, parse_status, Console, NewProduct, ProductChanges};

#[derive(Parser, Debug)]
#[command(name = "brewdesk", version, about = "Admin console for the brewdesk ordering backend")]
struct Cli {
    /// Backend base URL, overriding BREWDESK_API_URL and the config file
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Also write logs to this file, rotated daily
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Remember the password in the OS keychain
        #[arg(long)]
        remember: bool,
    },
    /// End the stored session
    Logout {
        /// Also remove the remembered password
        #[arg(long)]
        forget: bool,
    },
    /// Show the signed-in administrator
    Whoami,
    /// Check the backend connection and session
    Status,
    /// Show dashboard stats and recent orders
    Dashboard,
    /// List orders
    Orders {
        /// Match order number, customer name or phone
        #[arg(long)]
        search: Option<String>,
        /// pending, preparing, delivering, completed, cancelled or all
        #[arg(long, default_value = "all")]
        status: String,
    },
    /// Show one order
    Order { id: i64 },
    /// Move an order to its next status
    Advance { id: i64 },
    /// Set an order's status
    SetStatus { id: i64, status: String },
    /// List products
    Products {
        /// Match product name or description
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// Create a product
    ProductAdd(NewProduct),
    /// Change fields of a product
    ProductUpdate {
        id: i64,
        #[command(flatten)]
        changes: ProductChanges,
    },
    /// Delete a product
    ProductDelete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Show or change stored settings (use the global --api-url to set the backend)
    Config {
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "brewdesk.log".into());
            let appender = tracing_appender::rolling::daily(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());
    info!("brewdesk starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    if let Command::Config { timeout } = cli.command {
        return configure(config, cli.api_url, timeout);
    }

    let mut console = Console::new(config, cli.api_url.as_deref())?;
    match cli.command {
        Command::Login { email, remember } => console.login(email, remember).await,
        Command::Logout { forget } => console.logout(forget),
        Command::Whoami => console.whoami(),
        Command::Status => console.status().await,
        Command::Dashboard => console.dashboard().await,
        Command::Orders { search, status } => console.orders(search, &status).await,
        Command::Order { id } => console.order(id).await,
        Command::Advance { id } => console.advance(id).await,
        Command::SetStatus { id, status } => console.set_status(id, parse_status(&status)?).await,
        Command::Products { search, category } => console.products(search, &category).await,
        Command::ProductAdd(product) => console.product_add(product).await,
        Command::ProductUpdate { id, changes } => console.product_update(id, changes).await,
        Command::ProductDelete { id, yes } => console.product_delete(id, yes).await,
        Command::Config { .. } => Ok(()),
    }
}
