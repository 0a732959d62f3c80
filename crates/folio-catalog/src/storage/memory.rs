use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use folio_config::CatalogConfig;
use jiff::Timestamp;

use super::CatalogStore;
use crate::error::StoreError;
use crate::types::{Author, Book, NewBook, User, title_key};

/// In-memory catalog store backed by concurrent maps
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    books: DashMap<i64, Book>,
    authors: DashMap<i64, Author>,
    users: DashMap<i64, User>,
    /// Normalized title to book id; claimed before a book is stored
    titles: DashMap<String, i64>,
    last_book_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the configured seed records
    pub fn from_config(config: &CatalogConfig) -> Self {
        let store = Self::new();

        for seed in &config.authors {
            store.add_author(Author {
                id: seed.id,
                first_name: seed.first_name.clone(),
                last_name: seed.last_name.clone(),
                email: seed.email.clone(),
            });
        }

        for seed in &config.books {
            store.add_book(Book {
                id: seed.id,
                title: seed.title.clone(),
                description: seed.description.clone(),
                author_id: seed.author_id,
                publish_date: seed.publish_date,
                license: seed.license.clone(),
            });
        }

        for seed in &config.users {
            store.add_user(User {
                id: seed.id,
                username: seed.username.clone(),
                name: seed.name.clone(),
                email: seed.email.clone(),
                phone: seed.phone.clone(),
                password: seed.password.clone(),
                created_at: seed.created_at.unwrap_or_else(Timestamp::now),
            });
        }

        tracing::debug!(
            books = store.inner.books.len(),
            authors = store.inner.authors.len(),
            users = store.inner.users.len(),
            "catalog store seeded"
        );

        store
    }

    pub fn add_book(&self, book: Book) {
        self.inner.last_book_id.fetch_max(book.id, Ordering::SeqCst);
        self.inner.titles.insert(title_key(&book.title), book.id);
        self.inner.books.insert(book.id, book);
    }

    pub fn add_author(&self, author: Author) {
        self.inner.authors.insert(author.id, author);
    }

    pub fn add_user(&self, user: User) {
        self.inner.users.insert(user.id, user);
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn books(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.inner.books.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn book(&self, id: i64) -> Result<Option<Book>, StoreError> {
        Ok(self.inner.books.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
        // The title slot stays locked until the book is stored
        let slot = match self.inner.titles.entry(title_key(&book.title)) {
            Entry::Occupied(_) => return Err(StoreError::TitleTaken(book.title.trim().to_owned())),
            Entry::Vacant(slot) => slot,
        };

        let id = self
            .inner
            .last_book_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map_err(|last| StoreError::Inconsistent(format!("no book id left after {last}")))?
            + 1;

        if self.inner.books.contains_key(&id) {
            return Err(StoreError::Inconsistent(format!("book id {id} is already taken")));
        }

        let book = Book {
            id,
            title: book.title,
            description: book.description,
            author_id: book.author_id,
            publish_date: book.publish_date,
            license: book.license,
        };

        self.inner.books.insert(id, book.clone());
        slot.insert(id);
        Ok(book)
    }

    async fn authors(&self) -> Result<Vec<Author>, StoreError> {
        Ok(self.inner.authors.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn author(&self, id: i64) -> Result<Option<Author>, StoreError> {
        Ok(self.inner.authors.get(&id).map(|entry| entry.value().clone()))
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.inner.users.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.inner.users.get(&id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use folio_config::{AuthorSeed, BookSeed};

    use super::*;

    fn seeded_with_book(id: i64) -> MemoryStore {
        MemoryStore::from_config(&CatalogConfig {
            authors: vec![AuthorSeed {
                id: 1,
                first_name: "Frank".to_owned(),
                last_name: "Herbert".to_owned(),
                email: None,
            }],
            books: vec![BookSeed {
                id,
                title: "Dune".to_owned(),
                description: None,
                author_id: Some(1),
                publish_date: None,
                license: None,
            }],
            users: Vec::new(),
        })
    }

    fn seeded() -> MemoryStore {
        seeded_with_book(10)
    }

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_owned(),
            description: None,
            author_id: Some(1),
            publish_date: None,
            license: None,
        }
    }

    #[tokio::test]
    async fn seeded_records_are_retrievable() {
        let store = seeded();

        assert_eq!(store.book(10).await.unwrap().unwrap().title, "Dune");
        assert_eq!(store.author(1).await.unwrap().unwrap().last_name, "Herbert");
        assert!(store.book(11).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inserted_books_continue_after_highest_seeded_id() {
        let store = seeded();

        let book = store.insert_book(new_book("Dune Messiah")).await.unwrap();

        assert_eq!(book.id, 11);
        assert_eq!(store.books().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn titles_are_unique_ignoring_case_and_padding() {
        let store = seeded();

        let error = store.insert_book(new_book("  dUNE ")).await.unwrap_err();
        assert!(matches!(&error, StoreError::TitleTaken(title) if title == "dUNE"));

        store.insert_book(new_book("Dune Messiah")).await.unwrap();
        assert!(matches!(
            store.insert_book(new_book("dune messiah")).await,
            Err(StoreError::TitleTaken(_))
        ));
        assert_eq!(store.books().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn exhausted_ids_are_an_error() {
        let store = seeded_with_book(i64::MAX);

        let error = store.insert_book(new_book("Dune Messiah")).await.unwrap_err();

        assert!(matches!(error, StoreError::Inconsistent(_)));
        assert_eq!(store.books().await.unwrap().len(), 1);
        // The title was not consumed by the failed insert
        assert!(store.inner.titles.get("dune messiah").is_none());
    }
}
