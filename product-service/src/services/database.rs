use crate::models::{next_update_timestamp, NewProduct, Product, ProductChanges};
use crate::services::store::{ProductStore, StoreError};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

const DUPLICATE_KEY_CODE: i32 = 11000;
const MAX_UPDATE_ATTEMPTS: u32 = 10;

#[derive(Clone)]
pub struct MongoProductStore {
    client: MongoClient,
    db: Database,
}

impl MongoProductStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    /// Creates the unique index that backs business id uniqueness.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for product-service");

        let business_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .name("product_id_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.products()
            .create_index(business_id_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create product id index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub fn products(&self) -> Collection<Product> {
        self.db.collection("products")
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

fn backend(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(anyhow::anyhow!(err.to_string()))
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let cursor = self.products().find(doc! {}, None).await.map_err(|e| {
            tracing::error!("Failed to list products: {}", e);
            backend(e)
        })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect products: {}", e);
            backend(e)
        })
    }

    async fn find_by_business_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        self.products()
            .find_one(doc! { "id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(product_id = id, "Failed to find product: {}", e);
                backend(e)
            })
    }

    async fn find_by_internal_id(
        &self,
        internal_id: &ObjectId,
    ) -> Result<Option<Product>, StoreError> {
        self.products()
            .find_one(doc! { "_id": *internal_id }, None)
            .await
            .map_err(|e| {
                tracing::error!(internal_id = %internal_id, "Failed to find product: {}", e);
                backend(e)
            })
    }

    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let mut product = Product::create(fields);

        let result = self
            .products()
            .insert_one(&product, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StoreError::DuplicateId(product.id)
                } else {
                    tracing::error!(product_id = product.id, "Failed to insert product: {}", e);
                    backend(e)
                }
            })?;

        product.internal_id = result.inserted_id.as_object_id();
        Ok(product)
    }

    async fn update_by_internal_id(
        &self,
        internal_id: &ObjectId,
        changes: ProductChanges,
    ) -> Result<Option<Product>, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        // Writes only if `updatedAt` is still the value read, so concurrent
        // updates never share a timestamp.
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let Some(existing) = self.find_by_internal_id(internal_id).await? else {
                return Ok(None);
            };

            let updated_at = next_update_timestamp(existing.updated_at);
            let filter = doc! {
                "_id": *internal_id,
                "updatedAt": BsonDateTime::from_chrono(existing.updated_at),
            };
            let update = doc! { "$set": changes.to_set_document(updated_at) };

            let result = self
                .products()
                .find_one_and_update(filter, update, options.clone())
                .await
                .map_err(|e| {
                    if is_duplicate_key(&e) {
                        StoreError::DuplicateId(changes.id.unwrap_or(existing.id))
                    } else {
                        tracing::error!(internal_id = %internal_id, "Failed to update product: {}", e);
                        backend(e)
                    }
                })?;

            if let Some(product) = result {
                return Ok(Some(product));
            }
            tracing::debug!(
                internal_id = %internal_id,
                attempt,
                "Product changed during update, retrying"
            );
        }

        tracing::warn!(internal_id = %internal_id, "Product update kept conflicting");
        Err(StoreError::Backend(anyhow::anyhow!(
            "Product {} was modified concurrently, update not applied",
            internal_id
        )))
    }

    async fn delete_by_internal_id(&self, internal_id: &ObjectId) -> Result<(), StoreError> {
        let result = self
            .products()
            .delete_one(doc! { "_id": *internal_id }, None)
            .await
            .map_err(|e| {
                tracing::error!(internal_id = %internal_id, "Failed to delete product: {}", e);
                backend(e)
            })?;

        tracing::debug!(
            internal_id = %internal_id,
            deleted = result.deleted_count,
            "Product delete completed"
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                backend(e)
            })?;
        Ok(())
    }
}
