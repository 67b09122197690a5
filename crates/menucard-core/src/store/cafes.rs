//! Café account storage.

use chrono::{DateTime, Utc};

use crate::types::{Cafe, CafeId, Role};

use super::{StoreError, is_index_key, record_key};

/// Fields required to create a café account; the ID is allocated on insert.
#[derive(Debug, Clone)]
pub struct CafeDraft {
    /// Login name used for authentication. Must be unique.
    pub login: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Short public code.
    pub code: String,
    /// Contact phone numbers.
    pub phone_numbers: Vec<String>,
    /// Subscription expiry date.
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Café store backed by sled.
#[derive(Clone)]
pub struct CafeStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl CafeStore {
    pub(super) const fn new(db: sled::Db, tree: sled::Tree) -> Self {
        Self { db, tree }
    }

    /// Check if any café accounts exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Count café accounts.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tree
            .iter()
            .filter(|r| {
                r.as_ref()
                    .map(|(k, _)| !is_index_key(k))
                    .unwrap_or(false)
            })
            .count()
    }

    /// Create a new café account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LoginTaken`] if the login is already in use,
    /// or a storage error.
    pub fn create(&self, draft: CafeDraft) -> Result<Cafe, StoreError> {
        if self.get_by_login(&draft.login)?.is_some() {
            return Err(StoreError::LoginTaken(draft.login));
        }

        let cafe = Cafe {
            id: CafeId::new(self.db.generate_id()?),
            login: draft.login,
            password_hash: draft.password_hash,
            name: draft.name,
            role: Role::Cafe,
            logo: None,
            code: draft.code,
            phone_numbers: draft.phone_numbers,
            expiry_date: draft.expiry_date,
            created_at: Utc::now(),
        };

        let value = serde_json::to_vec(&cafe)?;
        self.tree.insert(record_key(cafe.id.value()), value)?;

        let index_key = login_index_key(&cafe.login);
        self.tree
            .insert(index_key.as_bytes(), &record_key(cafe.id.value())[..])?;

        self.tree.flush()?;
        Ok(cafe)
    }

    /// Get a café by ID.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn get(&self, id: CafeId) -> Result<Option<Cafe>, StoreError> {
        match self.tree.get(record_key(id.value()))? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Get a café by login name.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn get_by_login(&self, login: &str) -> Result<Option<Cafe>, StoreError> {
        match self.tree.get(login_index_key(login).as_bytes())? {
            Some(id_bytes) => {
                let mut id = [0u8; 8];
                id.copy_from_slice(&id_bytes);
                self.get(CafeId::new(u64::from_be_bytes(id)))
            }
            None => Ok(None),
        }
    }

    /// Update an existing café account. The login is immutable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the café doesn't exist, or a
    /// storage error.
    pub fn update(&self, cafe: &Cafe) -> Result<(), StoreError> {
        if self.get(cafe.id)?.is_none() {
            return Err(StoreError::NotFound(format!("cafe {}", cafe.id)));
        }

        let value = serde_json::to_vec(cafe)?;
        self.tree.insert(record_key(cafe.id.value()), value)?;
        self.tree.flush()?;
        Ok(())
    }

    /// Delete a café account.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn delete(&self, id: CafeId) -> Result<bool, StoreError> {
        if let Some(cafe) = self.get(id)? {
            self.tree.remove(login_index_key(&cafe.login).as_bytes())?;
        }

        let removed = self.tree.remove(record_key(id.value()))?.is_some();
        self.tree.flush()?;
        Ok(removed)
    }

    /// List all café accounts.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn list(&self) -> Result<Vec<Cafe>, StoreError> {
        let mut cafes = Vec::new();

        for result in self.tree.iter() {
            let (key, value) = result?;
            if is_index_key(&key) {
                continue;
            }
            cafes.push(serde_json::from_slice(&value)?);
        }

        Ok(cafes)
    }
}

fn login_index_key(login: &str) -> String {
    format!("idx:login:{login}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    fn draft(login: &str) -> CafeDraft {
        CafeDraft {
            login: login.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            name: format!("{login} cafe"),
            code: format!("{login}-1"),
            phone_numbers: vec!["+99312000000".to_string()],
            expiry_date: None,
        }
    }

    #[test]
    fn create_and_lookup() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let cafes = store.cafes();

        assert!(cafes.is_empty());

        let cafe = cafes.create(draft("corner")).unwrap();
        assert_eq!(cafe.role, Role::Cafe);
        assert!(!cafes.is_empty());
        assert_eq!(cafes.count(), 1);

        let loaded = cafes.get(cafe.id).unwrap().unwrap();
        assert_eq!(loaded.login, "corner");

        let by_login = cafes.get_by_login("corner").unwrap().unwrap();
        assert_eq!(by_login.id, cafe.id);
    }

    #[test]
    fn duplicate_login_rejected() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        store.cafes().create(draft("corner")).unwrap();
        let result = store.cafes().create(draft("corner"));

        assert!(matches!(result, Err(StoreError::LoginTaken(_))));
        assert_eq!(store.cafes().count(), 1);
    }

    #[test]
    fn update_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let cafes = store.cafes();

        let mut cafe = cafes.create(draft("corner")).unwrap();
        cafe.name = "Renamed".to_string();
        cafes.update(&cafe).unwrap();
        assert_eq!(cafes.get(cafe.id).unwrap().unwrap().name, "Renamed");

        assert!(cafes.delete(cafe.id).unwrap());
        assert!(cafes.get(cafe.id).unwrap().is_none());
        assert!(cafes.get_by_login("corner").unwrap().is_none());
        assert!(!cafes.delete(cafe.id).unwrap());
    }

    #[test]
    fn update_missing_cafe_fails() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let cafe = store.cafes().create(draft("corner")).unwrap();
        store.cafes().delete(cafe.id).unwrap();

        assert!(matches!(
            store.cafes().update(&cafe),
            Err(StoreError::NotFound(_))
        ));
    }
}
