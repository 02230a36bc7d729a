//! Integration tests for RedShop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p redshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_lifecycle` - Persistence, removal grace window and checkout
//!   against the file-backed store
//! - `cart_driver` - Timer firing on wall-clock time through `CartHandle`
//! - `catalog_file` - YAML catalogs loaded through `CartConfig`
//!
//! Tests never share a storage directory: each uses a fresh [`TempDir`].

use std::path::{Path, PathBuf};

use redshop_cart::{CartManager, FileStore, ManualClock};

/// A uniquely named directory under the system temp dir, removed on drop.
#[derive(Debug)]
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    #[must_use]
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("redshop-it-{}", uuid::Uuid::new_v4()));
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A file-backed cart in this directory driven by `clock`, already loaded.
    #[must_use]
    pub fn open_cart(&self, clock: &ManualClock) -> CartManager<FileStore, ManualClock> {
        let mut cart = CartManager::new(FileStore::new(&self.path), clock.clone());
        cart.load();
        cart
    }
}

impl Default for TempDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
