use folio_core::{Validate, Violations};
use jiff::Timestamp;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

/// A catalogued book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// Properties a book listing can be sorted by
///
/// Parsed from the camelCase name used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum BookProperty {
    Id,
    Title,
    Description,
    AuthorId,
    PublishDate,
    License,
}

impl BookProperty {
    /// Order two books by this property, falling back to id for ties
    pub fn compare(self, a: &Book, b: &Book) -> std::cmp::Ordering {
        let primary = match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Title => a.title.cmp(&b.title),
            Self::Description => a.description.cmp(&b.description),
            Self::AuthorId => a.author_id.cmp(&b.author_id),
            Self::PublishDate => a.publish_date.cmp(&b.publish_date),
            Self::License => a.license.cmp(&b.license),
        };

        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Payload for registering a new book
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub publish_date: Option<Timestamp>,
    #[serde(default)]
    pub license: Option<String>,
}

impl Validate for NewBook {
    const ORIGIN: &'static str = "MethodArgumentNotValid";

    fn validate(&self, violations: &mut Violations) {
        violations.not_blank("title", &self.title);
        violations.max_length("title", &self.title, 200);
        if let Some(license) = &self.license {
            violations.max_length("license", license, 64);
        }
    }
}

/// Key under which two titles count as the same book
pub(crate) fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// A book author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Author {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Author as rendered to clients, with the derived full name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    #[serde(flatten)]
    pub author: Author,
    pub full_name: String,
}

impl From<Author> for AuthorView {
    fn from(author: Author) -> Self {
        let full_name = author.full_name();
        Self { author, full_name }
    }
}

/// A registered user
///
/// The password never leaves the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip)]
    pub password: SecretString,
    pub created_at: Timestamp,
}
