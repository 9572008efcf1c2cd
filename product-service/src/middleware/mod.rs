pub mod json;

pub use json::ProductJson;
