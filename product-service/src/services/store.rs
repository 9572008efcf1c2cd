use crate::models::{NewProduct, Product, ProductChanges};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Product with id {0} already exists")]
    DuplicateId(i64),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence contract for products.
///
/// Reads by business id (`Product::id`) and by the store-assigned `_id` are
/// separate operations; callers pick the key explicitly.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product, in the store's natural order.
    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;

    async fn find_by_business_id(&self, id: i64) -> Result<Option<Product>, StoreError>;

    async fn find_by_internal_id(&self, internal_id: &ObjectId)
        -> Result<Option<Product>, StoreError>;

    /// Persists a new product. Fails with `DuplicateId` when the business id is taken.
    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError>;

    /// Merges `changes` into the product and returns it, or `None` when absent.
    async fn update_by_internal_id(
        &self,
        internal_id: &ObjectId,
        changes: ProductChanges,
    ) -> Result<Option<Product>, StoreError>;

    /// Removes the product. Succeeds when nothing matches.
    async fn delete_by_internal_id(&self, internal_id: &ObjectId) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
