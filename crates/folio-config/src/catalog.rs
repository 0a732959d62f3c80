use jiff::Timestamp;
use secrecy::SecretString;
use serde::Deserialize;

/// Seed records loaded into the catalog at startup
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default)]
    pub authors: Vec<AuthorSeed>,
    #[serde(default)]
    pub books: Vec<BookSeed>,
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorSeed {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookSeed {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author_id: Option<i64>,
    /// RFC 3339 timestamp, e.g. `1965-08-01T00:00:00Z`
    #[serde(default)]
    pub publish_date: Option<Timestamp>,
    #[serde(default)]
    pub license: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSeed {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: SecretString,
    /// Defaults to the time the store is seeded
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}
