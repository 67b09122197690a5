//! Menu item storage.

use chrono::Utc;

use crate::types::{CafeId, CategoryId, Food, FoodId, LocalizedText};

use super::{StoreError, is_index_key, record_key};

/// Menu item store backed by sled.
#[derive(Clone)]
pub struct FoodStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl FoodStore {
    pub(super) const fn new(db: sled::Db, tree: sled::Tree) -> Self {
        Self { db, tree }
    }

    /// Create a new menu item.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn create(
        &self,
        cafe_id: CafeId,
        category_id: CategoryId,
        name: LocalizedText,
        description: LocalizedText,
        price: f64,
        image: Option<String>,
    ) -> Result<Food, StoreError> {
        let food = Food {
            id: FoodId::new(self.db.generate_id()?),
            cafe_id,
            category_id,
            name,
            description,
            price,
            image,
            created_at: Utc::now(),
        };

        let value = serde_json::to_vec(&food)?;
        self.tree.insert(record_key(food.id.value()), value)?;
        self.tree.flush()?;
        Ok(food)
    }

    /// Get a menu item by ID.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn get(&self, id: FoodId) -> Result<Option<Food>, StoreError> {
        match self.tree.get(record_key(id.value()))? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Update an existing menu item.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the item doesn't exist, or a
    /// storage error.
    pub fn update(&self, food: &Food) -> Result<(), StoreError> {
        if self.get(food.id)?.is_none() {
            return Err(StoreError::NotFound(format!("food {}", food.id)));
        }

        let value = serde_json::to_vec(food)?;
        self.tree.insert(record_key(food.id.value()), value)?;
        self.tree.flush()?;
        Ok(())
    }

    /// Delete a menu item.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn delete(&self, id: FoodId) -> Result<bool, StoreError> {
        let removed = self.tree.remove(record_key(id.value()))?.is_some();
        self.tree.flush()?;
        Ok(removed)
    }

    /// Delete every item in a category; returns the removed items so the
    /// caller can clean up their image files.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn delete_by_category(&self, category_id: CategoryId) -> Result<Vec<Food>, StoreError> {
        let mut removed = Vec::new();

        for food in self.list_by_category(category_id)? {
            self.tree.remove(record_key(food.id.value()))?;
            removed.push(food);
        }

        self.tree.flush()?;
        Ok(removed)
    }

    /// List items belonging to one café.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn list_by_cafe(&self, cafe_id: CafeId) -> Result<Vec<Food>, StoreError> {
        let mut foods = self.list_all()?;
        foods.retain(|f| f.cafe_id == cafe_id);
        Ok(foods)
    }

    /// List items in one category.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn list_by_category(&self, category_id: CategoryId) -> Result<Vec<Food>, StoreError> {
        let mut foods = self.list_all()?;
        foods.retain(|f| f.category_id == category_id);
        Ok(foods)
    }

    /// List every menu item.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub fn list_all(&self) -> Result<Vec<Food>, StoreError> {
        let mut foods = Vec::new();

        for result in self.tree.iter() {
            let (key, value) = result?;
            if is_index_key(&key) {
                continue;
            }
            foods.push(serde_json::from_slice(&value)?);
        }

        Ok(foods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    fn sample_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn create_and_list_by_scope() {
        let (_dir, store) = sample_store();
        let foods = store.foods();

        foods
            .create(
                CafeId::new(1),
                CategoryId::new(10),
                LocalizedText::new("Çaý", "Чай", "Tea"),
                LocalizedText::default(),
                5.0,
                None,
            )
            .unwrap();
        foods
            .create(
                CafeId::new(1),
                CategoryId::new(11),
                LocalizedText::new("Kofe", "Кофе", "Coffee"),
                LocalizedText::default(),
                12.5,
                None,
            )
            .unwrap();
        foods
            .create(
                CafeId::new(2),
                CategoryId::new(10),
                LocalizedText::new("Suw", "Вода", "Water"),
                LocalizedText::default(),
                2.0,
                None,
            )
            .unwrap();

        assert_eq!(foods.list_by_cafe(CafeId::new(1)).unwrap().len(), 2);
        assert_eq!(foods.list_by_category(CategoryId::new(10)).unwrap().len(), 2);
        assert_eq!(foods.list_all().unwrap().len(), 3);
    }

    #[test]
    fn delete_by_category_returns_removed() {
        let (_dir, store) = sample_store();
        let foods = store.foods();

        foods
            .create(
                CafeId::new(1),
                CategoryId::new(10),
                LocalizedText::new("Çaý", "Чай", "Tea"),
                LocalizedText::default(),
                5.0,
                Some("food-1-1.png".to_string()),
            )
            .unwrap();
        foods
            .create(
                CafeId::new(1),
                CategoryId::new(11),
                LocalizedText::new("Kofe", "Кофе", "Coffee"),
                LocalizedText::default(),
                12.5,
                None,
            )
            .unwrap();

        let removed = foods.delete_by_category(CategoryId::new(10)).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].image.as_deref(), Some("food-1-1.png"));
        assert_eq!(foods.list_all().unwrap().len(), 1);
    }

    #[test]
    fn update_rewrites_record() {
        let (_dir, store) = sample_store();
        let foods = store.foods();

        let mut food = foods
            .create(
                CafeId::new(1),
                CategoryId::new(10),
                LocalizedText::new("Çaý", "Чай", "Tea"),
                LocalizedText::default(),
                5.0,
                None,
            )
            .unwrap();

        food.price = 6.5;
        foods.update(&food).unwrap();

        let loaded = foods.get(food.id).unwrap().unwrap();
        assert!((loaded.price - 6.5).abs() < f64::EPSILON);
    }
}
