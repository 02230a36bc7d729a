//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `REDSHOP_STORAGE_DIR` - Directory holding persisted snapshots (default: .redshop)
//! - `REDSHOP_CART_KEY` - Storage key for the cart snapshot (default: `redshop_cart`)
//! - `REDSHOP_REMOVAL_GRACE_MS` - Undo window for removals in milliseconds (default: 3000)
//! - `REDSHOP_CATALOG_PATH` - YAML catalog replacing the built-in demo catalog

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::manager::{CART_STORAGE_KEY, CartManager, REMOVAL_GRACE_WINDOW};
use crate::store::FileStore;
use crate::timer::SystemClock;

const DEFAULT_STORAGE_DIR: &str = ".redshop";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory for the file-backed store
    pub storage_dir: PathBuf,
    /// Key the cart snapshot is stored under
    pub cart_key: String,
    /// How long a requested removal can be undone
    pub removal_grace: Duration,
    /// Optional YAML catalog file
    pub catalog_path: Option<PathBuf>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            cart_key: CART_STORAGE_KEY.to_string(),
            removal_grace: REMOVAL_GRACE_WINDOW,
            catalog_path: None,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = PathBuf::from(get_or_default(&lookup, "REDSHOP_STORAGE_DIR", DEFAULT_STORAGE_DIR));
        let cart_key = get_or_default(&lookup, "REDSHOP_CART_KEY", CART_STORAGE_KEY);
        FileStore::validate_key(&cart_key).map_err(|e| {
            ConfigError::InvalidEnvVar("REDSHOP_CART_KEY".to_string(), e.to_string())
        })?;

        let grace_ms = get_or_default(&lookup, "REDSHOP_REMOVAL_GRACE_MS", "3000")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("REDSHOP_REMOVAL_GRACE_MS".to_string(), e.to_string())
            })?;
        if grace_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "REDSHOP_REMOVAL_GRACE_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let catalog_path = lookup("REDSHOP_CATALOG_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            storage_dir,
            cart_key,
            removal_grace: Duration::from_millis(grace_ms),
            catalog_path,
        })
    }

    /// The configured catalog: the YAML file if set, else the demo catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be loaded.
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        self.catalog_path
            .as_deref()
            .map_or_else(|| Ok(Catalog::demo()), Catalog::load_yaml)
    }

    /// A file-backed cart with this configuration, loaded from disk.
    #[must_use]
    pub fn open_cart(&self) -> CartManager<FileStore, SystemClock> {
        let mut cart = CartManager::new(FileStore::new(&self.storage_dir), SystemClock::new())
            .with_storage_key(self.cart_key.clone())
            .with_grace_window(self.removal_grace);
        cart.load();
        cart
    }
}

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}
