use std::collections::HashSet;
use std::path::Path;

use crate::Config;

/// Path prefixes owned by the resource routes
const RESERVED_PREFIXES: [&str; 3] = ["/books", "/authors", "/users"];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the health path is unusable or the catalog seed
    /// records contradict each other
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_health()?;
        self.validate_catalog()?;
        Ok(())
    }

    fn validate_health(&self) -> anyhow::Result<()> {
        let health = &self.server.health;
        if !health.enabled {
            return Ok(());
        }

        if !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/': {}", health.path);
        }

        if let Some(prefix) = RESERVED_PREFIXES
            .iter()
            .find(|prefix| health.path == **prefix || health.path.starts_with(&format!("{prefix}/")))
        {
            anyhow::bail!("server.health.path '{}' collides with the {prefix} routes", health.path);
        }

        Ok(())
    }

    fn validate_catalog(&self) -> anyhow::Result<()> {
        let catalog = &self.catalog;

        let mut author_ids = HashSet::new();
        for author in &catalog.authors {
            if !author_ids.insert(author.id) {
                anyhow::bail!("duplicate author id {} in catalog seed", author.id);
            }
        }

        let mut book_ids = HashSet::new();
        let mut titles = HashSet::new();
        for book in &catalog.books {
            if !book_ids.insert(book.id) {
                anyhow::bail!("duplicate book id {} in catalog seed", book.id);
            }

            if !titles.insert(book.title.trim().to_lowercase()) {
                anyhow::bail!("duplicate book title '{}' in catalog seed", book.title);
            }

            if let Some(author_id) = book.author_id
                && !author_ids.contains(&author_id)
            {
                anyhow::bail!("book {} references unknown author {author_id}", book.id);
            }
        }

        let mut user_ids = HashSet::new();
        for user in &catalog.users {
            if !user_ids.insert(user.id) {
                anyhow::bail!("duplicate user id {} in catalog seed", user.id);
            }
        }

        Ok(())
    }
}
