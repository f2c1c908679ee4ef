//! Tokri CLI - drive the cart engine from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Inspect a product
//! tokri product show p1
//!
//! # Build a cart
//! tokri cart add --product p1 --count 2 --variant Finish=Brushed
//! tokri cart show
//! tokri cart update "p1|Finish:Brushed" 3
//! tokri cart remove "p1|Finish:Brushed"
//! tokri cart clear
//!
//! # Sessions
//! tokri login u-1
//! tokri logout
//!
//! # Place an order
//! tokri checkout --first-name Ayesha --last-name Khan --province Sindh \
//!     --city Karachi --street-address "12 Zamzama Lane" \
//!     --mobile 03001234567 --email ayesha@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `TOKRI_API_BASE_URL` - Base URL of the storefront backend API
//! - `TOKRI_API_TOKEN` - Optional bearer token
//! - `TOKRI_DATA_DIR` - Where the cart and session files live

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use tokri_core::{CartItemId, ProductId, UserId};
use tokri_engine::{Config, Storefront};

mod commands;

#[derive(Parser)]
#[command(name = "tokri")]
#[command(author, version, about = "Tokri storefront cart CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect catalog products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Log in, folding any guest cart into the user's cart
    Login {
        /// User id to authenticate as
        user_id: String,
    },
    /// Drop back to a fresh guest session
    Logout,
    /// Validate the shipping address and place the order
    Checkout {
        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,

        #[arg(long, default_value = "")]
        province: String,

        #[arg(long, default_value = "")]
        city: String,

        #[arg(long, default_value = "")]
        street_address: String,

        /// Pakistani mobile number (03XXXXXXXXX)
        #[arg(long, default_value = "")]
        mobile: String,

        #[arg(long, default_value = "")]
        email: String,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Show a product with its resolved display price
    Show {
        /// Product id
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Resolve a configuration and add it to the cart
    Add {
        /// Product id
        #[arg(short, long)]
        product: String,

        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        count: u32,

        /// Variant choice as NAME=VALUE (repeatable)
        #[arg(long = "variant", value_name = "NAME=VALUE")]
        variants: Vec<String>,

        /// Volume tier index
        #[arg(long)]
        tier: Option<usize>,
    },
    /// Show the cart with its totals
    Show,
    /// Set the quantity of a cart line
    Update {
        /// Cart item id
        cart_item_id: String,

        /// New quantity
        count: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart item id
        cart_item_id: String,
    },
    /// Remove a chosen variant value from a product's lines
    RemoveVariant {
        /// Product id
        product: String,

        /// Variant value to remove
        value: String,
    },
    /// Empty the cart
    Clear,
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
    let config = Config::from_env()?;
    let engine = Storefront::new(config)?;
    commands::session::restore(&engine);

    match cli.command {
        Commands::Product { action } => match action {
            ProductAction::Show { id } => {
                commands::product::show(&engine, &ProductId::new(id)).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Add {
                product,
                count,
                variants,
                tier,
            } => {
                commands::cart::add(&engine, &ProductId::new(product), count, &variants, tier)
                    .await?;
            }
            CartAction::Show => commands::cart::show(&engine),
            CartAction::Update {
                cart_item_id,
                count,
            } => commands::cart::update(&engine, &CartItemId::new(cart_item_id), count),
            CartAction::Remove { cart_item_id } => {
                commands::cart::remove(&engine, &CartItemId::new(cart_item_id));
            }
            CartAction::RemoveVariant { product, value } => {
                commands::cart::remove_variant(&engine, &ProductId::new(product), &value);
            }
            CartAction::Clear => commands::cart::clear(&engine),
        },
        Commands::Login { user_id } => {
            commands::session::login(&engine, UserId::new(user_id)).await?;
        }
        Commands::Logout => commands::session::logout(&engine)?,
        Commands::Checkout {
            first_name,
            last_name,
            province,
            city,
            street_address,
            mobile,
            email,
        } => {
            let address = tokri_engine::ShippingAddress {
                first_name,
                last_name,
                province,
                city,
                street_address,
                mobile,
                email,
            };
            commands::checkout::place(&engine, &address).await?;
        }
    }
    Ok(())
}
