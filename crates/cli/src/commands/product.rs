//! Catalog inspection commands.

use chrono::Utc;

use tokri_core::{Price, ProductId};
use tokri_engine::error::EngineError;
use tokri_engine::pricing::{self, Selection};
use tokri_engine::Storefront;

/// Show a product with its resolved display price.
#[allow(clippy::print_stdout)]
pub async fn show(engine: &Storefront, product_id: &ProductId) -> Result<(), EngineError> {
    let product = engine.product(product_id).await?;
    let quote = pricing::resolve(&product, &Selection::default(), Utc::now());

    println!("{}  [{}]", product.title, product.id);
    match Price::percent_off(product.price, quote.unit_price) {
        Some(percent) => println!(
            "Price: {} (was {}, {percent}% off)",
            quote.unit_price, product.price
        ),
        None => println!("Price: {}", quote.unit_price),
    }

    if let Some(stock) = product.stock {
        println!("Stock: {stock}");
    }
    if product.free_shipping {
        println!("Ships free");
    }

    for variant in &product.variants {
        let values = variant
            .values
            .iter()
            .map(|v| match v.price {
                Some(price) => format!("{} ({price})", v.value),
                None => v.value.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}: {values}", variant.name);
    }

    if product.volume_tier_enabled {
        for (index, tier) in product.volume_tiers.iter().enumerate() {
            println!("Bundle {index}: {} units for {}", tier.quantity, tier.price);
        }
    }

    Ok(())
}
