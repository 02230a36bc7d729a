//! Static product catalog.
//!
//! The catalog is read-only: products are looked up by ID when added to the
//! cart, and the cart copies the display fields it needs at add time.

use std::collections::HashSet;
use std::path::Path;

use redshop_core::{Category, Price, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// One-line description shown on product cards.
    pub description: String,
    /// Long description shown on the product detail view.
    #[serde(default)]
    pub full_description: String,
    pub price: Price,
    pub image: String,
    pub category: Category,
    #[serde(default)]
    pub features: Vec<String>,
}

/// An ordered, immutable list of products.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from products.
    ///
    /// # Errors
    ///
    /// Returns an error if two products share an ID or a price is negative.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
            if product.price.is_negative() {
                return Err(CatalogError::NegativePrice(product.id));
            }
        }
        Ok(Self { products })
    }

    /// Parse a catalog from a YAML list of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or fails validation.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_yaml::from_str(yaml)?;
        Self::new(products)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn load_yaml(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products in a category, or every product for `None`, in catalog order.
    #[must_use]
    pub fn by_category(&self, category: Option<Category>) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .collect()
    }

    /// Iterate over all products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The built-in demo catalog.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            products: vec![
                demo_product(
                    1,
                    "Asus ZenBook Pro Laptop",
                    "A powerful laptop for work and creativity",
                    "The Asus ZenBook Pro 15 pairs an 11th-gen Intel Core i7 with 16 GB of DDR4 and a fast 1 TB SSD behind a 15.6-inch 4K UHD display.",
                    114_990,
                    "https://images.unsplash.com/photo-1496181133206-80ce9b88a853?auto=format&fit=crop&w=800&q=80",
                    Category::Laptop,
                    &["Intel Core i7", "16 GB RAM", "1 TB SSD", "15.6'' 4K UHD display", "NVIDIA GeForce RTX 3050"],
                ),
                demo_product(
                    2,
                    "Samsung Galaxy S23 Ultra Smartphone",
                    "Flagship smartphone with the best camera",
                    "A 200 MP camera, the Snapdragon 8 Gen 2 and a bundled S Pen.",
                    99_990,
                    "https://images.unsplash.com/photo-1511707171634-5f897ff02aa9?auto=format&fit=crop&w=800&q=80",
                    Category::Phone,
                    &["200 MP camera", "Snapdragon 8 Gen 2", "12 GB RAM", "512 GB storage", "5000 mAh battery"],
                ),
                demo_product(
                    3,
                    "Apple iPad Pro 12.9 Tablet",
                    "A professional tablet for creative work",
                    "The M2 chip and a Liquid Retina XDR mini-LED display, with Apple Pencil 2 and Magic Keyboard support.",
                    129_990,
                    "https://images.unsplash.com/photo-1544244015-0df4b3ffc6b0?auto=format&fit=crop&w=800&q=80",
                    Category::Tablet,
                    &["Apple M2", "12.9'' Liquid Retina XDR", "Apple Pencil 2 support", "12 MP + 10 MP cameras", "Up to 10 hours of battery"],
                ),
                demo_product(
                    4,
                    "Sony WH-1000XM5 Headphones",
                    "Wireless noise-cancelling headphones",
                    "Adaptive noise cancelling and up to 30 hours of playback.",
                    34_990,
                    "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?auto=format&fit=crop&w=800&q=80",
                    Category::Accessory,
                    &["Active noise cancelling", "30 hours of battery", "Hi-Res audio", "Touch controls", "Foldable design"],
                ),
                demo_product(
                    5,
                    "Apple Watch Series 8",
                    "A smartwatch for health and fitness",
                    "ECG, blood oxygen and temperature sensing, with fall detection and emergency SOS.",
                    45_990,
                    "https://images.unsplash.com/photo-1546868871-7041f2a55e12?auto=format&fit=crop&w=800&q=80",
                    Category::Accessory,
                    &["ECG and blood oxygen", "Body temperature sensing", "50+ workout types", "18 hours of battery", "Water resistant to 50 m"],
                ),
                demo_product(
                    6,
                    "Apple MacBook Air M2 Laptop",
                    "A light and powerful Apple laptop",
                    "The M2 chip in an ultraportable body with a narrow-bezel Liquid Retina display.",
                    119_990,
                    "https://images.unsplash.com/photo-1541807084-5c52b6b3adef?auto=format&fit=crop&w=800&q=80",
                    Category::Laptop,
                    &["Apple M2", "13.6'' Liquid Retina", "Up to 18 hours of battery", "8 GB RAM", "512 GB SSD"],
                ),
                demo_product(
                    7,
                    "iPhone 14 Pro Max Smartphone",
                    "The iPhone with Dynamic Island",
                    "A 48 MP camera, the A16 Bionic and a 120 Hz ProMotion Super Retina XDR display.",
                    129_990,
                    "https://at-store.ru/uploadedFiles/eshopimages/big/IMG_0228.JPG",
                    Category::Phone,
                    &["48 MP camera", "A16 Bionic", "Dynamic Island", "Super Retina XDR", "IP68 water resistance"],
                ),
                demo_product(
                    8,
                    "PlayStation 5 Console",
                    "The next generation of game consoles",
                    "Real-time ray tracing at up to 120 fps, adaptive triggers and haptic feedback.",
                    64_990,
                    "https://images.unsplash.com/photo-1606144042614-b2417e99c4e3?auto=format&fit=crop&w=800&q=80",
                    Category::Accessory,
                    &["Real-time ray tracing", "Up to 120 fps", "Adaptive triggers", "Haptic feedback", "825 GB SSD"],
                ),
            ],
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_product(
    id: i32,
    title: &str,
    description: &str,
    full_description: &str,
    price: i64,
    image: &str,
    category: Category,
    features: &[&str],
) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        description: description.to_string(),
        full_description: full_description.to_string(),
        price: Price::from_whole(price),
        image: image.to_string(),
        category,
        features: features.iter().map(ToString::to_string).collect(),
    }
}
