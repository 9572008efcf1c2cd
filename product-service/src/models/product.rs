use chrono::{DateTime, Duration, Utc};
use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// A catalog product as persisted in the `products` collection.
///
/// `id` is the caller-supplied business id; `internal_id` (`_id`) is assigned
/// by the store on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<ObjectId>,
    pub name: String,
    pub id: i64,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub instock: bool,
    #[serde(
        rename = "createdAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "updatedAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub updated_at: DateTime<Utc>,
}

/// Fully validated field set for a product that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub id: i64,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub instock: bool,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub id: Option<i64>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub instock: Option<bool>,
}

impl Product {
    /// Builds the record for `fields` with both timestamps set to now.
    pub fn create(fields: NewProduct) -> Self {
        let now = store_precision(Utc::now());
        Self {
            internal_id: None,
            name: fields.name,
            id: fields.id,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            instock: fields.instock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `changes` in place and refreshes `updated_at`.
    pub fn apply(&mut self, changes: ProductChanges) {
        let updated_at = next_update_timestamp(self.updated_at);
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(id) = changes.id {
            self.id = id;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(instock) = changes.instock {
            self.instock = instock;
        }
        self.updated_at = updated_at;
    }
}

impl ProductChanges {
    /// `$set` body for the supplied fields, plus the new `updatedAt`.
    pub fn to_set_document(&self, updated_at: DateTime<Utc>) -> Document {
        let mut set = Document::new();
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(id) = self.id {
            set.insert("id", id);
        }
        if let Some(description) = &self.description {
            set.insert("description", description.as_str());
        }
        if let Some(price) = self.price {
            set.insert("price", price);
        }
        if let Some(category) = &self.category {
            set.insert("category", category.as_str());
        }
        if let Some(instock) = self.instock {
            set.insert("instock", instock);
        }
        set.insert("updatedAt", mongodb::bson::DateTime::from_chrono(updated_at));
        set
    }
}

/// BSON datetimes hold milliseconds; truncate so in-memory values round-trip.
pub fn store_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

/// Timestamp for the next modification: now, but always at least 1ms past
/// `previous` so `updatedAt` strictly increases.
pub fn next_update_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = store_precision(Utc::now());
    let floor = store_precision(previous) + Duration::milliseconds(1);
    now.max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen() -> NewProduct {
        NewProduct {
            name: "Pen".to_string(),
            id: 1,
            description: "Blue pen".to_string(),
            price: 1.5,
            category: "stationery".to_string(),
            instock: true,
        }
    }

    #[test]
    fn create_sets_equal_timestamps_at_millisecond_precision() {
        let product = Product::create(pen());
        assert_eq!(product.created_at, product.updated_at);
        assert_eq!(product.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
        assert!(product.internal_id.is_none());
    }

    #[test]
    fn apply_changes_only_supplied_fields() {
        let mut product = Product::create(pen());
        let before = product.clone();

        product.apply(ProductChanges {
            price: Some(2.0),
            ..Default::default()
        });

        assert_eq!(product.price, 2.0);
        assert_eq!(product.name, before.name);
        assert_eq!(product.id, before.id);
        assert_eq!(product.description, before.description);
        assert_eq!(product.category, before.category);
        assert_eq!(product.instock, before.instock);
        assert_eq!(product.created_at, before.created_at);
        assert!(product.updated_at > before.updated_at);
    }

    #[test]
    fn next_update_timestamp_is_strictly_later_even_for_future_previous() {
        let future = Utc::now() + Duration::seconds(10);
        let next = next_update_timestamp(future);
        assert_eq!(next, store_precision(future) + Duration::milliseconds(1));
    }

    #[test]
    fn set_document_contains_only_supplied_fields() {
        let changes = ProductChanges {
            name: Some("Pencil".to_string()),
            instock: Some(false),
            ..Default::default()
        };
        let set = changes.to_set_document(Utc::now());

        assert_eq!(set.get_str("name").unwrap(), "Pencil");
        assert!(!set.get_bool("instock").unwrap());
        assert!(set.get_datetime("updatedAt").is_ok());
        assert!(!set.contains_key("price"));
        assert!(!set.contains_key("id"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn bson_round_trip_keeps_field_names() {
        let mut product = Product::create(pen());
        product.internal_id = Some(ObjectId::new());

        let doc = mongodb::bson::to_document(&product).unwrap();
        assert!(doc.get_object_id("_id").is_ok());
        assert_eq!(doc.get_i64("id").unwrap(), 1);
        assert!(doc.get_datetime("createdAt").is_ok());
        assert!(doc.get_datetime("updatedAt").is_ok());

        let back: Product = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(back, product);
    }
}
