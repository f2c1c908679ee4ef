//! Durable client-side cart storage.
//!
//! The cart survives restarts as a single JSON document holding the
//! `cartproducts` array and the recorded `cartTotal`. It is read once
//! when the store initializes and rewritten after every mutation;
//! writes are best-effort with no retry.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tokri_core::Price;

use super::LineItem;

/// Errors raised by the storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The persisted document could not be parsed.
    #[error("Corrupt cart file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The persisted cart document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedCart {
    /// Line items, insertion order preserved.
    pub cartproducts: Vec<LineItem>,
    /// Recorded total at the time of the last write.
    #[serde(rename = "cartTotal")]
    pub cart_total: Price,
}

/// Where the cart store keeps its durable copy.
pub trait CartStorage: Send + Sync {
    /// Read the persisted cart, `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the document exists but cannot be read or
    /// parsed.
    fn load(&self) -> Result<Option<PersistedCart>, StorageError>;

    /// Replace the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be written.
    fn save(&self, cart: &PersistedCart) -> Result<(), StorageError>;

    /// Erase the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// JsonFileStorage
// =============================================================================

/// File-backed storage: one JSON document at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create a storage backend writing to `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path of the persisted document.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<PersistedCart>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&self, cart: &PersistedCart) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash mid-write never leaves a torn file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(cart)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory storage for tests and embedders that manage their own
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    cart: RwLock<Option<PersistedCart>>,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedCart>, StorageError> {
        Ok(self
            .cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, cart: &PersistedCart) -> Result<(), StorageError> {
        *self.cart.write().unwrap_or_else(PoisonError::into_inner) = Some(cart.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.cart.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokri_core::{CartItemId, ProductId};

    fn line_item() -> LineItem {
        LineItem {
            cart_item_id: CartItemId::new("p1"),
            product_id: ProductId::new("p1"),
            title: "Copper Lamp".to_string(),
            image: None,
            price: Price::rupees(100),
            count: 2,
            selected_variants: Vec::new(),
            free_shipping: false,
            delivery_charges: Price::rupees(250),
            selected_tier: None,
        }
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("cart.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("cart.json"));

        let persisted = PersistedCart {
            cartproducts: vec![line_item()],
            cart_total: Price::rupees(200),
        };
        storage.save(&persisted).unwrap();

        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.cartproducts.len(), 1);
        assert_eq!(loaded.cart_total, Price::rupees(200));
        assert_eq!(loaded.cartproducts[0].count, 2);
    }

    #[test]
    fn test_persisted_document_keys() {
        let persisted = PersistedCart {
            cartproducts: vec![line_item()],
            cart_total: Price::rupees(200),
        };

        let json: serde_json::Value = serde_json::to_value(&persisted).unwrap();
        assert!(json.get("cartproducts").is_some());
        assert!(json.get("cartTotal").is_some());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        let storage = JsonFileStorage::new(path.clone());

        let persisted = PersistedCart {
            cartproducts: Vec::new(),
            cart_total: Price::zero(),
        };
        storage.save(&persisted).unwrap();
        assert!(path.exists());

        storage.clear().unwrap();
        assert!(!path.exists());

        // Clearing an already-clear store is fine
        storage.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = JsonFileStorage::new(path);
        assert!(matches!(
            storage.load().unwrap_err(),
            StorageError::Corrupt(_)
        ));
    }
}
