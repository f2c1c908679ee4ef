//! Effective unit price resolution for a configured product.
//!
//! Given a catalog record and the shopper's current choices, produces the
//! single price and representative image a cart line would snapshot.
//! Precedence, highest first: selected volume tier, variant price
//! overrides, deal-of-the-day, sale price, base price.

use chrono::{DateTime, Utc};
use thiserror::Error;

use tokri_core::Price;

use crate::api::types::{ProductRecord, SelectedVariant, VolumeTier};

/// Why a configuration cannot be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// The product defines variants but none was chosen.
    #[error("Please select at least one variant")]
    VariantRequired,

    /// Volume tiers are offered but none was chosen.
    #[error("Please select a bundle offer")]
    TierRequired,

    /// The chosen tier index does not exist on the product.
    #[error("Bundle offer {0} does not exist")]
    TierOutOfRange(usize),

    /// Requested more units than the stock snapshot allows.
    #[error("Only {available} left in stock (requested {requested})")]
    InsufficientStock { requested: u32, available: u32 },
}

/// The shopper's current product configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Chosen variant values, grouped by variant name.
    pub variants: Vec<SelectedVariant>,
    /// Index into the product's volume tiers, when one is chosen.
    pub tier_index: Option<usize>,
}

impl Selection {
    /// Add a chosen value, appending to an existing group of the same
    /// variant name.
    #[must_use]
    pub fn with_variant(mut self, name: &str, value: &str) -> Self {
        match self.variants.iter_mut().find(|v| v.name == name) {
            Some(group) => group.values.push(value.to_string()),
            None => self.variants.push(SelectedVariant {
                name: name.to_string(),
                values: vec![value.to_string()],
            }),
        }
        self
    }

    /// Choose a volume tier by index.
    #[must_use]
    pub const fn with_tier(mut self, index: usize) -> Self {
        self.tier_index = Some(index);
        self
    }

    /// Whether any variant value has been chosen.
    #[must_use]
    pub fn has_variant_values(&self) -> bool {
        self.variants.iter().any(|v| !v.values.is_empty())
    }
}

/// The resolved price for one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Effective unit price.
    pub unit_price: Price,
    /// Representative image for the configuration.
    pub image: Option<String>,
    /// Snapshot of the chosen tier, for audit/display only.
    pub tier: Option<VolumeTier>,
}

/// Compute the effective unit price and image for a configuration.
///
/// The resolver itself is lenient: an empty selection on a product with
/// variants falls back to the base price. [`validate_selection`] is the
/// gate the add-to-cart flow runs first.
#[must_use]
pub fn resolve(product: &ProductRecord, selection: &Selection, now: DateTime<Utc>) -> Quote {
    // A chosen tier overrides everything else.
    if let Some(tier) = selection
        .tier_index
        .and_then(|i| product.volume_tiers.get(i))
    {
        return Quote {
            unit_price: tier.price,
            image: tier.image.clone().or_else(|| product.image.clone()),
            tier: Some(tier.clone()),
        };
    }

    // Sum the overrides of every selected variant value; any one override
    // switches the whole configuration to override pricing.
    let mut override_sum = Price::zero();
    let mut has_override = false;
    let mut variant_image = None;
    for group in &selection.variants {
        let Some(variant) = product.variants.iter().find(|v| v.name == group.name) else {
            continue;
        };
        for value in &group.values {
            let Some(variant_value) = variant.values.iter().find(|v| &v.value == value) else {
                continue;
            };
            if let Some(price) = variant_value.price {
                override_sum += price;
                has_override = true;
            }
            if variant_image.is_none() && variant_value.image.is_some() {
                variant_image = variant_value.image.clone();
            }
        }
    }
    if has_override {
        return Quote {
            unit_price: override_sum,
            image: variant_image.or_else(|| product.image.clone()),
            tier: None,
        };
    }

    // Deal-of-the-day beats the sale price; a zero sale price is treated
    // as unset.
    let unit_price = product
        .active_deal(now)
        .or_else(|| product.sale_price.filter(|p| !p.is_zero()))
        .unwrap_or(product.price);

    Quote {
        unit_price,
        image: product.image.clone(),
        tier: None,
    }
}

/// Check the add-to-cart preconditions for a configuration.
///
/// # Errors
///
/// Returns an error when the product defines variants and none is
/// chosen, or offers volume tiers and none (or a nonexistent one) is
/// chosen.
pub fn validate_selection(
    product: &ProductRecord,
    selection: &Selection,
) -> Result<(), PricingError> {
    if !product.variants.is_empty() && !selection.has_variant_values() {
        return Err(PricingError::VariantRequired);
    }

    if product.volume_tier_enabled && !product.volume_tiers.is_empty() {
        match selection.tier_index {
            None => return Err(PricingError::TierRequired),
            Some(i) if i >= product.volume_tiers.len() => {
                return Err(PricingError::TierOutOfRange(i));
            }
            Some(_) => {}
        }
    } else if let Some(i) = selection.tier_index {
        return Err(PricingError::TierOutOfRange(i));
    }

    Ok(())
}

/// Check a requested quantity against the stock snapshot.
///
/// Products without a recorded stock level accept any quantity; the
/// snapshot is never re-validated after add time.
///
/// # Errors
///
/// Returns [`PricingError::InsufficientStock`] when the request exceeds
/// the snapshot.
pub fn check_stock(product: &ProductRecord, requested: u32) -> Result<(), PricingError> {
    match product.stock {
        Some(available) if requested > available => Err(PricingError::InsufficientStock {
            requested,
            available,
        }),
        _ => Ok(()),
    }
}
