use std::str::FromStr;
use std::sync::Arc;

use folio_core::{ApplicationReason, BusinessReason, Failure};
use serde::Serialize;

use crate::error::StoreError;
use crate::storage::CatalogStore;
use crate::types::{Author, Book, BookProperty, NewBook, User};

/// Catalog operations over a [`CatalogStore`]
///
/// Every operation returns either data or a classified [`Failure`]; absent
/// lookups become business failures, store faults become application
/// failures. Nothing here formats responses or logs.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

/// One page of a sorted listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// List every book, optionally sorted by a named property
    ///
    /// Books are ordered by id when no property is given. Naming a property
    /// that books don't have is an application failure.
    pub async fn list_all(&self, sort: Option<&str>) -> Result<Vec<Book>, Failure> {
        let order = sort_property(sort)?;
        let mut books = self
            .store
            .books()
            .await
            .map_err(|error| data_access("listing books", error))?;
        books.sort_by(|a, b| order.compare(a, b));
        Ok(books)
    }

    /// List one zero-based page of books
    pub async fn list_page(&self, page: u64, size: u64, sort: Option<&str>) -> Result<Page<Book>, Failure> {
        let books = self.list_all(sort).await?;
        let total_elements = books.len() as u64;
        let total_pages = if size == 0 { 0 } else { total_elements.div_ceil(size) };

        let skip = usize::try_from(page.saturating_mul(size)).unwrap_or(usize::MAX);
        let take = usize::try_from(size).unwrap_or(usize::MAX);
        let content = books.into_iter().skip(skip).take(take).collect();

        Ok(Page {
            content,
            page,
            size,
            total_elements,
            total_pages,
        })
    }

    pub async fn find_book(&self, id: i64) -> Result<Book, Failure> {
        self.store
            .book(id)
            .await
            .map_err(|error| data_access("looking up a book", error))?
            .ok_or_else(|| Failure::business(BusinessReason::BookNotFoundById, [id]))
    }

    /// Register a new book
    ///
    /// The referenced author must exist and titles must be unique,
    /// ignoring case and surrounding whitespace.
    pub async fn create_book(&self, book: NewBook) -> Result<Book, Failure> {
        if let Some(author_id) = book.author_id {
            self.find_author(author_id).await?;
        }

        // The store claims the title atomically with the insert
        self.store.insert_book(book).await.map_err(|error| match error {
            StoreError::TitleTaken(title) => {
                Failure::business(BusinessReason::BookTitleAlreadyExists, [title])
            }
            other => data_access("storing a book", other),
        })
    }

    pub async fn list_authors(&self) -> Result<Vec<Author>, Failure> {
        let mut authors = self
            .store
            .authors()
            .await
            .map_err(|error| data_access("listing authors", error))?;
        authors.sort_by_key(|a| a.id);
        Ok(authors)
    }

    pub async fn find_author(&self, id: i64) -> Result<Author, Failure> {
        self.store
            .author(id)
            .await
            .map_err(|error| data_access("looking up an author", error))?
            .ok_or_else(|| Failure::business(BusinessReason::AuthorNotFoundById, [id]))
    }

    /// Books written by an existing author, ordered by id
    pub async fn list_author_books(&self, author_id: i64) -> Result<Vec<Book>, Failure> {
        self.find_author(author_id).await?;

        let mut books: Vec<_> = self
            .store
            .books()
            .await
            .map_err(|error| data_access("listing books", error))?
            .into_iter()
            .filter(|b| b.author_id == Some(author_id))
            .collect();
        books.sort_by_key(|b| b.id);
        Ok(books)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, Failure> {
        let mut users = self
            .store
            .users()
            .await
            .map_err(|error| data_access("listing users", error))?;
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    pub async fn find_user(&self, id: i64) -> Result<User, Failure> {
        self.store
            .user(id)
            .await
            .map_err(|error| data_access("looking up a user", error))?
            .ok_or_else(|| Failure::business(BusinessReason::UserNotFoundById, [id]))
    }
}

fn sort_property(sort: Option<&str>) -> Result<BookProperty, Failure> {
    match sort.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(BookProperty::Id),
        Some(name) => BookProperty::from_str(name)
            .map_err(|_| Failure::application(ApplicationReason::PropertyNotExists, [name, "Book"])),
    }
}

// The store error is kept as the source for the log; the message reaches the client.
fn data_access(activity: &str, error: StoreError) -> Failure {
    Failure::application(ApplicationReason::DataAccessFailure, [activity])
        .with_origin("CatalogStore")
        .with_source(error)
}
