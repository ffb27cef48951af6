//! Scamazon CLI - drive the backend from a terminal.
//!
//! Every command runs the same slice actions the storefront pages use, on a
//! fresh in-memory store, and logs the resulting state.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! scm-cli product 4
//! scm-cli category smartphones
//!
//! # Basket (add --email to use a signed-in basket)
//! scm-cli basket show
//! scm-cli basket add 4 --quantity 2
//! scm-cli basket remove 4
//! scm-cli basket clear
//!
//! # Addresses (password read from SCAMAZON_PASSWORD)
//! scm-cli --email ada@example.com addresses list
//! scm-cli --email ada@example.com addresses set-default 7
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use scamazon_core::{AddressId, ProductId};

mod commands;

#[derive(Parser)]
#[command(name = "scm-cli")]
#[command(author, version, about = "Scamazon command-line shopper")]
struct Cli {
    /// Sign in as this user first (password from `SCAMAZON_PASSWORD`)
    #[arg(short, long, global = true)]
    email: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// List the products in a category
    Category {
        /// Category slug (e.g. `mens-shirts`)
        name: String,
    },
    /// Work with the basket
    Basket {
        #[command(subcommand)]
        action: BasketAction,
    },
    /// Manage saved addresses (requires --email)
    Addresses {
        #[command(subcommand)]
        action: AddressesAction,
    },
}

#[derive(Subcommand)]
enum BasketAction {
    /// Show the basket
    Show,
    /// Add a product
    Add {
        /// Product ID
        id: ProductId,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Empty the basket
    Clear,
}

#[derive(Subcommand)]
enum AddressesAction {
    /// List saved addresses
    List,
    /// Make an address the default
    SetDefault {
        /// Address ID
        id: AddressId,
    },
    /// Delete an address
    Delete {
        /// Address ID
        id: AddressId,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let shopper = commands::Shopper::connect(cli.email.as_deref()).await?;

    match cli.command {
        Commands::Product { id } => commands::catalog::product(&shopper, id).await?,
        Commands::Category { name } => commands::catalog::category(&shopper, name).await?,
        Commands::Basket { action } => match action {
            BasketAction::Show => commands::basket::show(&shopper).await?,
            BasketAction::Add { id, quantity } => {
                commands::basket::add(&shopper, id, quantity).await?;
            }
            BasketAction::Remove { id } => commands::basket::remove(&shopper, id).await?,
            BasketAction::Clear => commands::basket::clear(&shopper).await?,
        },
        Commands::Addresses { action } => {
            if !shopper.signed_in() {
                return Err("addresses commands need --email".into());
            }
            match action {
                AddressesAction::List => commands::addresses::list(&shopper).await?,
                AddressesAction::SetDefault { id } => {
                    commands::addresses::set_default(&shopper, id).await?;
                }
                AddressesAction::Delete { id } => commands::addresses::delete(&shopper, id).await?,
            }
        }
    }
    Ok(())
}
