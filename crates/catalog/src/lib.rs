//! Directory-backed storage for hand-authored spike specs.

mod error;
mod store;

pub use error::{CatalogError, Result};
pub use store::{CatalogConfig, CatalogStats, SpikeCatalog};
