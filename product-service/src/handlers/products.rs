//! Product resource handlers mounted under `/products`.
//!
//! `GET /:id` addresses a product by its business `id`, while `PUT /:id` and
//! `DELETE /:id` address it by the store-assigned `_id`.

use crate::dtos::{CreateProductRequest, MessageResponse, ProductResponse, UpdateProductRequest};
use crate::middleware::ProductJson;
use crate::models::{NewProduct, ProductChanges};
use crate::services::{record_product_operation, StoreError};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const PRODUCT_DELETED: &str = "Product deleted";

fn not_found() -> AppError {
    AppError::NotFound(PRODUCT_NOT_FOUND.to_string())
}

/// Store failures while reading or deleting are server errors.
fn read_failure(operation: &'static str, err: StoreError) -> AppError {
    record_product_operation(operation, "error");
    AppError::DatabaseError(anyhow::Error::new(err))
}

/// Store failures while writing are reported as rejected input.
fn write_failure(operation: &'static str, err: StoreError) -> AppError {
    record_product_operation(operation, "rejected");
    AppError::BadRequest(err.to_string())
}

fn rejected(operation: &'static str, err: AppError) -> AppError {
    record_product_operation(operation, "rejected");
    err
}

#[tracing::instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state
        .store
        .find_all()
        .await
        .map_err(|e| read_failure("list", e))?;

    record_product_operation("list", "success");
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    // A non-numeric id cannot match any business id.
    let Ok(business_id) = id.trim().parse::<i64>() else {
        record_product_operation("get", "not_found");
        return Err(not_found());
    };

    let product = state
        .store
        .find_by_business_id(business_id)
        .await
        .map_err(|e| read_failure("get", e))?;

    match product {
        Some(product) => {
            record_product_operation("get", "success");
            Ok(Json(ProductResponse::from(product)))
        }
        None => {
            record_product_operation("get", "not_found");
            Err(not_found())
        }
    }
}

#[tracing::instrument(skip(state, req))]
pub async fn create_product(
    State(state): State<AppState>,
    ProductJson(req): ProductJson<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let fields = NewProduct::try_from(req).map_err(|e| rejected("create", e))?;
    let business_id = fields.id;

    let product = state.store.insert(fields).await.map_err(|e| {
        tracing::warn!(product_id = business_id, error = %e, "Product create rejected");
        write_failure("create", e)
    })?;

    tracing::info!(
        product_id = product.id,
        internal_id = ?product.internal_id,
        "Product created"
    );
    record_product_operation("create", "success");

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ProductJson(req): ProductJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let internal_id = ObjectId::parse_str(&id).map_err(|_| {
        rejected(
            "update",
            AppError::BadRequest(format!("Invalid product id: {}", id)),
        )
    })?;
    let changes = ProductChanges::try_from(req).map_err(|e| rejected("update", e))?;

    let product = state
        .store
        .update_by_internal_id(&internal_id, changes)
        .await
        .map_err(|e| {
            tracing::warn!(internal_id = %internal_id, error = %e, "Product update rejected");
            write_failure("update", e)
        })?;

    match product {
        Some(product) => {
            tracing::info!(internal_id = %internal_id, product_id = product.id, "Product updated");
            record_product_operation("update", "success");
            Ok(Json(ProductResponse::from(product)))
        }
        None => {
            record_product_operation("update", "not_found");
            Err(not_found())
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    // An id that is not an ObjectId names nothing, so deleting it is a no-op.
    if let Ok(internal_id) = ObjectId::parse_str(&id) {
        state
            .store
            .delete_by_internal_id(&internal_id)
            .await
            .map_err(|e| read_failure("delete", e))?;
        tracing::info!(internal_id = %internal_id, "Product deleted");
    }

    record_product_operation("delete", "success");
    Ok(Json(MessageResponse::new(PRODUCT_DELETED)))
}
