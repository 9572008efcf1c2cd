pub mod product;

pub use product::{next_update_timestamp, store_precision, NewProduct, Product, ProductChanges};
