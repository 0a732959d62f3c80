//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use folio_config::{AuthorSeed, BookSeed, CatalogConfig, Config, HealthConfig, ServerConfig, TelemetryConfig, UserSeed};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with an empty catalog
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                telemetry: TelemetryConfig::default(),
                catalog: CatalogConfig::default(),
            },
        }
    }

    /// Seed the catalog with a small library
    pub fn with_library(self) -> Self {
        self.with_author(1, "Frank", "Herbert")
            .with_author(2, "Ursula", "Le Guin")
            .with_book(1, "Dune", Some(1))
            .with_book(2, "The Dispossessed", Some(2))
            .with_book(3, "Children of Dune", Some(1))
            .with_book(4, "Anathem", None)
            .with_user(1, "reader", "hunter2")
    }

    pub fn with_author(mut self, id: i64, first_name: &str, last_name: &str) -> Self {
        self.config.catalog.authors.push(AuthorSeed {
            id,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: None,
        });
        self
    }

    pub fn with_book(mut self, id: i64, title: &str, author_id: Option<i64>) -> Self {
        self.config.catalog.books.push(BookSeed {
            id,
            title: title.to_owned(),
            description: None,
            author_id,
            publish_date: None,
            license: None,
        });
        self
    }

    pub fn with_user(mut self, id: i64, username: &str, password: &str) -> Self {
        self.config.catalog.users.push(UserSeed {
            id,
            username: username.to_owned(),
            name: username.to_owned(),
            email: format!("{username}@example.com"),
            phone: None,
            password: SecretString::from(password),
            created_at: Some(jiff::Timestamp::UNIX_EPOCH),
        });
        self
    }

    /// Serve the health check from a different path
    pub fn with_health_path(mut self, path: &str) -> Self {
        self.config.server.health.path = path.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config.validate().unwrap();
        self.config
    }
}
