//! Food category storage.

use chrono::Utc;

use crate::types::{CafeId, CategoryId, FoodCategory, LocalizedText};

use super::{StoreError, is_index_key, record_key};

/// Category store backed by sled.
#[derive(Clone)]
pub struct CategoryStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl CategoryStore {
    pub(super) const fn new(db: sled::Db, tree: sled::Tree) -> Self {
        Self { db, tree }
    }

    /// Create a new category for a café.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn create(
        &self,
        cafe_id: CafeId,
        name: LocalizedText,
        image: Option<String>,
    ) -> Result<FoodCategory, StoreError> {
        let category = FoodCategory {
            id: CategoryId::new(self.db.generate_id()?),
            cafe_id,
            name,
            image,
            created_at: Utc::now(),
        };

        let value = serde_json::to_vec(&category)?;
        self.tree.insert(record_key(category.id.value()), value)?;
        self.tree.flush()?;
        Ok(category)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn get(&self, id: CategoryId) -> Result<Option<FoodCategory>, StoreError> {
        match self.tree.get(record_key(id.value()))? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Update an existing category.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the category doesn't exist, or a
    /// storage error.
    pub fn update(&self, category: &FoodCategory) -> Result<(), StoreError> {
        if self.get(category.id)?.is_none() {
            return Err(StoreError::NotFound(format!("category {}", category.id)));
        }

        let value = serde_json::to_vec(category)?;
        self.tree.insert(record_key(category.id.value()), value)?;
        self.tree.flush()?;
        Ok(())
    }

    /// Delete a category. Foods under it are removed separately by the
    /// caller via [`super::FoodStore::delete_by_category`].
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn delete(&self, id: CategoryId) -> Result<bool, StoreError> {
        let removed = self.tree.remove(record_key(id.value()))?.is_some();
        self.tree.flush()?;
        Ok(removed)
    }

    /// List categories belonging to one café.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn list_by_cafe(&self, cafe_id: CafeId) -> Result<Vec<FoodCategory>, StoreError> {
        let mut categories = self.list_all()?;
        categories.retain(|c| c.cafe_id == cafe_id);
        Ok(categories)
    }

    /// Find a café's category by its name in any language.
    ///
    /// Used by bulk import to attach rows to existing categories.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn find_by_name(
        &self,
        cafe_id: CafeId,
        name: &str,
    ) -> Result<Option<FoodCategory>, StoreError> {
        Ok(self.list_by_cafe(cafe_id)?.into_iter().find(|c| {
            c.name.tm == name || c.name.ru == name || c.name.en == name
        }))
    }

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn list_all(&self) -> Result<Vec<FoodCategory>, StoreError> {
        let mut categories = Vec::new();

        for result in self.tree.iter() {
            let (key, value) = result?;
            if is_index_key(&key) {
                continue;
            }
            categories.push(serde_json::from_slice(&value)?);
        }

        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    #[test]
    fn create_scoped_by_cafe() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let categories = store.categories();

        let first = categories
            .create(
                CafeId::new(1),
                LocalizedText::new("Içgiler", "Напитки", "Drinks"),
                None,
            )
            .unwrap();
        categories
            .create(
                CafeId::new(2),
                LocalizedText::new("Desertler", "Десерты", "Desserts"),
                None,
            )
            .unwrap();

        let mine = categories.list_by_cafe(CafeId::new(1)).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, first.id);
    }

    #[test]
    fn find_by_name_matches_any_language() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let categories = store.categories();

        let created = categories
            .create(
                CafeId::new(1),
                LocalizedText::new("Içgiler", "Напитки", "Drinks"),
                None,
            )
            .unwrap();

        let found = categories.find_by_name(CafeId::new(1), "Напитки").unwrap();
        assert_eq!(found.map(|c| c.id), Some(created.id));

        assert!(categories
            .find_by_name(CafeId::new(2), "Drinks")
            .unwrap()
            .is_none());
    }

    #[test]
    fn update_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let categories = store.categories();

        let mut category = categories
            .create(CafeId::new(1), LocalizedText::new("A", "Б", "C"), None)
            .unwrap();

        category.image = Some("category-1-1.png".to_string());
        categories.update(&category).unwrap();
        assert_eq!(
            categories.get(category.id).unwrap().unwrap().image.as_deref(),
            Some("category-1-1.png")
        );

        assert!(categories.delete(category.id).unwrap());
        assert!(categories.get(category.id).unwrap().is_none());
    }
}
