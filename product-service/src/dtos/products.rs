use crate::models::{NewProduct, Product, ProductChanges};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

/// Body of `POST /products`. Every field is optional at the parser level so a
/// missing field becomes a validation message instead of a serde rejection.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    pub name: Option<String>,
    #[validate(required(message = "id is required"))]
    pub id: Option<i64>,
    #[validate(required(message = "description is required"))]
    pub description: Option<String>,
    #[validate(required(message = "price is required"))]
    pub price: Option<f64>,
    #[validate(required(message = "category is required"))]
    pub category: Option<String>,
    #[validate(required(message = "instock is required"))]
    pub instock: Option<bool>,
}

impl TryFrom<CreateProductRequest> for NewProduct {
    type Error = AppError;

    fn try_from(req: CreateProductRequest) -> Result<Self, Self::Error> {
        req.validate()?;

        match req {
            CreateProductRequest {
                name: Some(name),
                id: Some(id),
                description: Some(description),
                price: Some(price),
                category: Some(category),
                instock: Some(instock),
            } => Ok(NewProduct {
                name,
                id,
                description,
                price,
                category,
                instock,
            }),
            _ => Err(AppError::BadRequest(
                "Validation failed: missing required field".to_string(),
            )),
        }
    }
}

/// Body of `PUT /products/:id`: any subset of the product fields.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub id: Option<i64>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub instock: Option<bool>,
}

impl TryFrom<UpdateProductRequest> for ProductChanges {
    type Error = AppError;

    fn try_from(req: UpdateProductRequest) -> Result<Self, Self::Error> {
        req.validate()?;

        Ok(ProductChanges {
            name: req.name,
            id: req.id,
            description: req.description,
            price: req.price,
            category: req.category,
            instock: req.instock,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub internal_id: String,
    pub name: String,
    pub id: i64,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub instock: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            internal_id: product
                .internal_id
                .map(|oid| oid.to_hex())
                .unwrap_or_default(),
            name: product.name,
            id: product.id,
            description: product.description,
            price: product.price,
            category: product.category,
            instock: product.instock,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
