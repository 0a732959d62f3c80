pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{Author, Book, NewBook, User};

/// Data access for catalog records
///
/// Lookups return `Ok(None)` for absent records; `Err` is reserved for
/// failures of the store itself.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All books, in no particular order
    async fn books(&self) -> Result<Vec<Book>, StoreError>;

    async fn book(&self, id: i64) -> Result<Option<Book>, StoreError>;

    /// Persist a new book and return it with its assigned id
    ///
    /// Fails with [`StoreError::TitleTaken`] when a stored book has the same
    /// title ignoring case and surrounding whitespace. The check and the
    /// insert are one atomic step.
    async fn insert_book(&self, book: NewBook) -> Result<Book, StoreError>;

    /// All authors, in no particular order
    async fn authors(&self) -> Result<Vec<Author>, StoreError>;

    async fn author(&self, id: i64) -> Result<Option<Author>, StoreError>;

    /// All users, in no particular order
    async fn users(&self) -> Result<Vec<User>, StoreError>;

    async fn user(&self, id: i64) -> Result<Option<User>, StoreError>;
}
