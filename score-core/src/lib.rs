pub mod catalog;
pub mod common;
pub mod domain;

pub use catalog::{CatalogSnapshot, InMemoryCatalog, ReferenceCatalog};
pub use common::error::{CatalogError, ConsistencyError, DomainError};
pub use domain::*;
