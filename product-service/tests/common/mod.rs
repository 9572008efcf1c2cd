#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use mongodb::bson::oid::ObjectId;
use product_service::models::{NewProduct, Product, ProductChanges};
use product_service::services::{MemoryProductStore, ProductStore, StoreError};
use product_service::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn ProductStore>,
}

impl TestApp {
    /// Router over a fresh in-memory store.
    pub fn spawn() -> Self {
        Self::with_store(Arc::new(MemoryProductStore::new()))
    }

    pub fn with_store(store: Arc<dyn ProductStore>) -> Self {
        let router = build_router(AppState::new(store.clone()));
        TestApp { router, store }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None).await
    }

    /// Creates a product and returns its `_id`.
    pub async fn create(&self, body: Value) -> String {
        let (status, created) = self.post("/products", body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
        created["_id"].as_str().unwrap().to_string()
    }
}

pub fn pen() -> Value {
    serde_json::json!({
        "name": "Pen",
        "id": 1,
        "description": "Blue pen",
        "price": 1.5,
        "category": "stationery",
        "instock": true
    })
}

pub fn product_body(id: i64, name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "id": id,
        "description": format!("{} description", name),
        "price": 3.25,
        "category": "office",
        "instock": false
    })
}

/// Store whose every call fails, for exercising error paths.
pub struct FailingStore {
    pub message: String,
}

impl FailingStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Backend(anyhow::anyhow!(self.message.clone())))
    }
}

#[async_trait]
impl ProductStore for FailingStore {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        self.fail()
    }

    async fn find_by_business_id(&self, _id: i64) -> Result<Option<Product>, StoreError> {
        self.fail()
    }

    async fn find_by_internal_id(
        &self,
        _internal_id: &ObjectId,
    ) -> Result<Option<Product>, StoreError> {
        self.fail()
    }

    async fn insert(&self, _fields: NewProduct) -> Result<Product, StoreError> {
        self.fail()
    }

    async fn update_by_internal_id(
        &self,
        _internal_id: &ObjectId,
        _changes: ProductChanges,
    ) -> Result<Option<Product>, StoreError> {
        self.fail()
    }

    async fn delete_by_internal_id(&self, _internal_id: &ObjectId) -> Result<(), StoreError> {
        self.fail()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.fail()
    }
}
