//! ShopSphere admin CLI - a command-line front-end for the super-admin API.
//!
//! Every subcommand maps onto one `ApiClient` operation and prints the
//! server's answer as JSON. Credentials persist between runs in the user's
//! config directory (or the OS keychain with `--keyring`).

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shopsphere_core::auth::{
    FileStore, HeadlessNavigator, KeyValueStore, KeyringStore, MemoryStore, LOGIN_PATH,
};
use shopsphere_core::{ApiClient, ApiError, Config, QueryParams, SessionStore};

#[derive(Parser)]
#[command(name = "shopsphere-admin")]
#[command(about = "ShopSphere super-admin console for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Keep credentials in the OS keychain instead of the config directory
    #[arg(long, global = true)]
    keyring: bool,

    /// Override the backend address for this run
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as a super-admin
    Login {
        #[arg(long)]
        username: Option<String>,
    },
    /// Sign out and forget stored credentials
    Logout,
    /// Show the signed-in admin
    Whoami,
    /// Show session state, profile and dashboard counters
    Status,
    /// Dashboard counters
    Dashboard,
    /// List vendors
    Vendors {
        /// List pending onboarding requests instead
        #[arg(long)]
        requests: bool,
    },
    /// Show one vendor
    Vendor { id: String },
    ApproveVendor {
        id: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    RejectVendor {
        id: String,
        #[arg(long)]
        reason: String,
    },
    BlockVendor {
        id: String,
        #[arg(long)]
        reason: String,
    },
    UnblockVendor {
        id: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// List products
    Products {
        #[arg(long)]
        vendor: Option<String>,
    },
    /// List delivery agents
    DeliveryAgents {
        /// List pending onboarding requests instead
        #[arg(long)]
        requests: bool,
    },
    /// List orders
    Orders {
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one order
    Order { id: String },
    /// Assign a delivery agent to an order
    Assign { order_id: String },
    /// List return requests
    Returns {
        #[arg(long)]
        status: Option<String>,
    },
    /// Process the refund for an approved return
    Refund { id: String },
    /// Sales and activity reports
    Reports,
    /// List customer accounts
    Users {
        #[arg(long)]
        search: Option<String>,
    },
    /// Block or unblock a customer account
    ToggleUser {
        id: String,
        /// "block" or "unblock"
        action: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Show commission settings
    Commissions,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_session(cli: &Cli, config: &Config, start_path: &str) -> Result<SessionStore> {
    let persistent: Arc<dyn KeyValueStore> = if cli.keyring {
        Arc::new(KeyringStore::new())
    } else {
        let path = config.storage_path()?;
        Arc::new(FileStore::open(&path).context("Failed to open credential storage")?)
    };
    let navigator = Arc::new(HeadlessNavigator::new(start_path));
    Ok(SessionStore::new(persistent, Arc::new(MemoryStore::new()), navigator))
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn login(client: &ApiClient, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| config.last_username.clone()) {
        Some(u) => u,
        None => prompt("Username: ")?,
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let response = client.admin_login(&username, &password).await?;
    if response.access_token().is_none() {
        anyhow::bail!("Login failed: the server did not issue an access token");
    }

    config.last_username = Some(username.clone());
    config.save()?;
    println!("Signed in as {}", username);
    Ok(())
}

async fn status(client: &ApiClient) -> Result<()> {
    println!("Backend: {}", client.base_url());
    match client.session().username() {
        Some(name) if client.session().is_authenticated() => println!("Signed in as {}", name),
        _ if client.session().is_authenticated() => println!("Signed in"),
        _ => {
            println!("Not signed in");
            return Ok(());
        }
    }

    let (profile, stats) = futures::join!(client.who_am_i(), client.fetch_dashboard_stats());
    print_json(&profile?)?;
    print_json(&stats?)?;
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    let base_url = config.base_url_with(cli.base_url.as_deref());

    let start_path = match cli.command {
        Commands::Login { .. } => LOGIN_PATH,
        _ => "/",
    };
    let session = build_session(&cli, &config, start_path)?;
    let client = ApiClient::with_base_url(base_url, &config, session)?;
    debug!(base_url = client.base_url(), "Client ready");

    match cli.command {
        Commands::Login { username } => login(&client, &mut config, username).await?,
        Commands::Logout => {
            client.logout();
            println!("Signed out");
        }
        Commands::Whoami => print_json(&client.who_am_i().await?)?,
        Commands::Status => status(&client).await?,
        Commands::Dashboard => print_json(&client.fetch_dashboard_stats().await?)?,
        Commands::Vendors { requests: true } => print_json(&client.fetch_vendor_requests().await?)?,
        Commands::Vendors { requests: false } => print_json(&client.fetch_all_vendors().await?)?,
        Commands::Vendor { id } => print_json(&client.fetch_vendor_detail(id).await?)?,
        Commands::ApproveVendor { id, reason } => {
            print_json(&client.approve_vendor_request(id, &reason).await?)?
        }
        Commands::RejectVendor { id, reason } => {
            print_json(&client.reject_vendor_request(id, &reason).await?)?
        }
        Commands::BlockVendor { id, reason } => print_json(&client.block_vendor(id, &reason).await?)?,
        Commands::UnblockVendor { id, reason } => {
            print_json(&client.unblock_vendor(id, &reason).await?)?
        }
        Commands::Products { vendor: Some(vendor) } => {
            print_json(&client.fetch_products_by_vendor(vendor).await?)?
        }
        Commands::Products { vendor: None } => {
            print_json(&client.fetch_all_products(QueryParams::new()).await?)?
        }
        Commands::DeliveryAgents { requests: true } => {
            print_json(&client.fetch_delivery_requests().await?)?
        }
        Commands::DeliveryAgents { requests: false } => {
            print_json(&client.fetch_all_delivery_agents().await?)?
        }
        Commands::Orders { status } => {
            let params = status
                .map(|s| QueryParams::new().with("status", s))
                .unwrap_or_default();
            print_json(&client.fetch_admin_orders(params).await?)?
        }
        Commands::Order { id } => print_json(&client.fetch_admin_order_detail(id).await?)?,
        Commands::Assign { order_id } => print_json(&client.trigger_assignment(order_id).await?)?,
        Commands::Returns { status } => {
            let params = status
                .map(|s| QueryParams::new().with("status", s))
                .unwrap_or_default();
            print_json(&client.fetch_admin_returns(params).await?)?
        }
        Commands::Refund { id } => print_json(&client.process_refund(id).await?)?,
        Commands::Reports => print_json(&client.fetch_reports().await?)?,
        Commands::Users { search } => {
            let params = search
                .map(|s| QueryParams::new().with("search", s))
                .unwrap_or_default();
            print_json(&client.fetch_users(params).await?)?
        }
        Commands::ToggleUser { id, action, reason } => {
            print_json(&client.toggle_user_block(id, &action, &reason).await?)?
        }
        Commands::Commissions => {
            let (global, categories) = futures::join!(
                client.fetch_global_commission(),
                client.fetch_category_commissions()
            );
            print_json(&global?)?;
            print_json(&categories?)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("ShopSphere admin CLI starting");

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_auth_failure) {
            eprintln!("Session expired or not authorized. Run `shopsphere-admin login`.");
        }
        return Err(e);
    }
    Ok(())
}
