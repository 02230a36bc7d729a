//! Read-only catalog and promo code listings.

use std::io::{self, Write};

use redshop_cart::{CartConfig, PromoBook};
use redshop_core::{Category, ProductId};

use crate::render;

/// List products, optionally restricted to one category.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub fn list(
    config: &CartConfig,
    category: Option<Category>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = config.catalog()?;
    let products = catalog.by_category(category);

    let mut out = io::stdout().lock();
    if products.is_empty() {
        writeln!(out, "No products found")?;
        return Ok(());
    }
    for product in products {
        render::product_row(&mut out, product)?;
    }
    Ok(())
}

/// Show one product in detail.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the product does not
/// exist.
pub fn show(config: &CartConfig, id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = config.catalog()?;
    let product = catalog
        .get(id)
        .ok_or_else(|| format!("Product {id} not found"))?;

    render::product_detail(&mut io::stdout().lock(), product)?;
    Ok(())
}

/// List the promo codes the cart accepts.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn promos() -> Result<(), Box<dyn std::error::Error>> {
    render::promos(&mut io::stdout().lock(), PromoBook::default().codes())?;
    Ok(())
}
