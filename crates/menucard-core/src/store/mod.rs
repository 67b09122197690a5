//! sled-backed entity storage.
//!
//! Each entity kind lives in its own tree; records are stored as JSON
//! documents keyed by their big-endian numeric ID, with `idx:`-prefixed
//! keys for secondary indexes. IDs come from the sled ID allocator.

use std::path::Path;

use thiserror::Error;

mod cafes;
mod categories;
mod foods;

pub use cafes::{CafeDraft, CafeStore};
pub use categories::CategoryStore;
pub use foods::FoodStore;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Login already taken by another café.
    #[error("Login already taken: {0}")]
    LoginTaken(String),

    /// Record not found.
    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Entity store over a single sled database.
#[derive(Clone)]
pub struct Store {
    cafes: CafeStore,
    categories: CategoryStore,
    foods: FoodStore,
}

impl Store {
    /// Open or create the entity store at the given directory.
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path.join("entities"))?;
        Self::with_db(db)
    }

    /// Create a store over an existing sled database.
    ///
    /// # Errors
    ///
    /// Returns error if a tree cannot be opened.
    pub fn with_db(db: sled::Db) -> Result<Self, StoreError> {
        let cafes = CafeStore::new(db.clone(), db.open_tree("cafes")?);
        let categories = CategoryStore::new(db.clone(), db.open_tree("categories")?);
        let foods = FoodStore::new(db.clone(), db.open_tree("foods")?);

        Ok(Self {
            cafes,
            categories,
            foods,
        })
    }

    /// Café accounts.
    #[must_use]
    pub const fn cafes(&self) -> &CafeStore {
        &self.cafes
    }

    /// Food categories.
    #[must_use]
    pub const fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    /// Menu items.
    #[must_use]
    pub const fn foods(&self) -> &FoodStore {
        &self.foods
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

/// Encode a numeric record key.
pub(crate) fn record_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

/// True for secondary-index keys, which record scans must skip.
pub(crate) fn is_index_key(key: &[u8]) -> bool {
    key.starts_with(b"idx:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn opens_all_trees() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        assert!(store.cafes().is_empty());
        assert!(store.categories().list_all().unwrap().is_empty());
        assert!(store.foods().list_all().unwrap().is_empty());
    }

    #[test]
    fn record_keys_sort_numerically() {
        assert!(record_key(1) < record_key(2));
        assert!(record_key(255) < record_key(256));
        assert!(!is_index_key(&record_key(42)));
        assert!(is_index_key(b"idx:login:corner"));
    }
}
