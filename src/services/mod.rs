pub mod accounts;
pub mod catalog;
pub mod engine;

pub use catalog::{CatalogLoader, CatalogSnapshot};
