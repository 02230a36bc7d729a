//! RedShop CLI - a terminal storefront over the cart state manager.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! redshop catalog --category laptop
//!
//! # Add two units of product 4 and view the cart
//! redshop add 4 -q 2
//! redshop cart --promo TECH20
//!
//! # Remove an item (Ctrl-C within the grace window to undo)
//! redshop remove 4
//!
//! # Pay and empty the cart
//! redshop checkout --payment card --promo REDSHOP10
//!
//! # Interactive session with live removal timers
//! redshop shell
//! ```
//!
//! # Commands
//!
//! - `catalog` - List products, optionally by category
//! - `product` - Show one product in detail
//! - `promos` - List promo codes
//! - `cart` - Show the cart and its totals
//! - `add` / `set` / `remove` - Change the cart
//! - `checkout` - Simulated payment; empties the cart
//! - `shell` - Interactive session

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use redshop_core::{Category, PaymentMethod, ProductId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "redshop")]
#[command(author, version, about = "RedShop terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Catalog {
        /// Only show this category (`laptop`, `phone`, `tablet`, `accessory`)
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Show product details
    Product {
        /// Product ID
        id: ProductId,
    },
    /// List available promo codes
    Promos,
    /// Show the cart and its totals
    Cart {
        /// Preview totals with this promo code
        #[arg(short, long)]
        promo: Option<String>,

        /// Print the cart as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a product to the cart
    Add {
        /// Product ID
        id: ProductId,

        /// Number of units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a cart item (0 removes it)
    Set {
        /// Product ID
        id: ProductId,

        /// New quantity
        quantity: u32,
    },
    /// Remove an item after the undo grace window
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Check out the cart (simulated payment)
    Checkout {
        /// Payment method (`card`, `sbp`, `cash`)
        #[arg(short = 'm', long)]
        payment: PaymentMethod,

        /// Promo code to apply
        #[arg(short, long)]
        promo: Option<String>,

        /// Print the receipt as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive session
    Shell,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "redshop_cli=info,redshop_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = redshop_cart::CartConfig::from_env()?;

    match cli.command {
        Commands::Catalog { category } => commands::catalog::list(&config, category)?,
        Commands::Product { id } => commands::catalog::show(&config, id)?,
        Commands::Promos => commands::catalog::promos()?,
        Commands::Cart { promo, json } => commands::cart::show(&config, promo.as_deref(), json)?,
        Commands::Add { id, quantity } => commands::cart::add(&config, id, quantity)?,
        Commands::Set { id, quantity } => commands::cart::set(&config, id, quantity).await?,
        Commands::Remove { id } => commands::cart::remove(&config, id).await?,
        Commands::Checkout {
            payment,
            promo,
            json,
        } => commands::checkout::run(&config, payment, promo.as_deref(), json)?,
        Commands::Shell => commands::shell::run(&config).await?,
    }
    Ok(())
}
