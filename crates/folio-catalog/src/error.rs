use thiserror::Error;

/// Catalog storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Another book already has this title
    #[error("title '{0}' is already taken")]
    TitleTaken(String),

    /// Stored data violates an assumption of the catalog
    #[error("inconsistent store state: {0}")]
    Inconsistent(String),
}
