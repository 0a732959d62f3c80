//! Book, author and user catalog

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod error;
mod service;
pub mod storage;
mod types;

use std::sync::Arc;

use folio_config::CatalogConfig;

pub use error::StoreError;
pub use service::{CatalogService, Page};
pub use storage::{CatalogStore, memory::MemoryStore};
pub use types::{Author, AuthorView, Book, BookProperty, NewBook, User};

/// Build the catalog service over an in-memory store seeded from configuration
pub fn build_service(config: &CatalogConfig) -> CatalogService {
    CatalogService::new(Arc::new(MemoryStore::from_config(config)))
}
