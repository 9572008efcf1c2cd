use crate::models::{NewProduct, Product, ProductChanges};
use crate::services::store::{ProductStore, StoreError};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::{Mutex, MutexGuard};

/// Process-local store for development runs and handler tests.
///
/// Insertion order is the natural order. Uniqueness of the business id is
/// checked under the same lock that performs the write.
#[derive(Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn products(&self) -> Result<MutexGuard<'_, Vec<Product>>, StoreError> {
        self.products
            .lock()
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("Memory store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products()?.clone())
    }

    async fn find_by_business_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.products()?.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_internal_id(
        &self,
        internal_id: &ObjectId,
    ) -> Result<Option<Product>, StoreError> {
        Ok(self
            .products()?
            .iter()
            .find(|p| p.internal_id.as_ref() == Some(internal_id))
            .cloned())
    }

    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let mut products = self.products()?;
        if products.iter().any(|p| p.id == fields.id) {
            return Err(StoreError::DuplicateId(fields.id));
        }

        let mut product = Product::create(fields);
        product.internal_id = Some(ObjectId::new());
        products.push(product.clone());
        Ok(product)
    }

    async fn update_by_internal_id(
        &self,
        internal_id: &ObjectId,
        changes: ProductChanges,
    ) -> Result<Option<Product>, StoreError> {
        let mut products = self.products()?;

        if let Some(new_id) = changes.id {
            let taken = products
                .iter()
                .any(|p| p.id == new_id && p.internal_id.as_ref() != Some(internal_id));
            if taken {
                return Err(StoreError::DuplicateId(new_id));
            }
        }

        let Some(product) = products
            .iter_mut()
            .find(|p| p.internal_id.as_ref() == Some(internal_id))
        else {
            return Ok(None);
        };

        product.apply(changes);
        Ok(Some(product.clone()))
    }

    async fn delete_by_internal_id(&self, internal_id: &ObjectId) -> Result<(), StoreError> {
        self.products()?
            .retain(|p| p.internal_id.as_ref() != Some(internal_id));
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.products().map(|_| ())
    }
}
