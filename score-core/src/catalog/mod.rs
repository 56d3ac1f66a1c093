pub mod in_memory;
pub mod traits;

pub use in_memory::{CatalogSnapshot, InMemoryCatalog};
pub use traits::ReferenceCatalog;
