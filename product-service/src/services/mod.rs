pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use self::database::MongoProductStore;
pub use self::memory::MemoryProductStore;
pub use self::metrics::{get_metrics, init_metrics, record_product_operation};
pub use self::store::{ProductStore, StoreError};
