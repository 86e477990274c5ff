//! Application settings loading from config.toml
//!
//! Settings are optional: a missing file yields the defaults below, so a fresh
//! checkout runs against a local `SQLite` file without any configuration.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Default `SQLite` database used when neither the environment nor the file names one
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/northwind.sqlite?mode=rwc";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Connection string for the target database
    pub database_url: String,
    /// Path of the legacy Northwind `SQLite` file used by `import`
    pub legacy_source: Option<PathBuf>,
    /// Listing and autocomplete sizes
    pub grid: GridSettings,
}

/// Paging defaults for listings
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GridSettings {
    /// Rows per page for most listings
    pub rows_per_page: u64,
    /// Rows per page for the order listing
    pub order_rows_per_page: u64,
    /// Maximum number of autocomplete suggestions
    pub autocomplete_limit: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            legacy_source: None,
            grid: GridSettings::default(),
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            rows_per_page: 15,
            order_rows_per_page: 5,
            autocomplete_limit: 25,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A page size is zero
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {:?}: {e}", path.as_ref()),
    })?;

    let settings = parse_settings(&contents)?;
    tracing::debug!("Loaded settings from {:?}", path.as_ref());
    Ok(settings)
}

/// Loads settings from `path` when it exists, otherwise returns the defaults.
///
/// `DATABASE_URL` in the environment overrides the file's `database_url`.
pub fn load_settings_or_default<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let mut settings = if path.as_ref().exists() {
        load_settings(path)?
    } else {
        tracing::info!(
            "No config file at {:?}, using default settings",
            path.as_ref()
        );
        Settings::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        settings.database_url = url;
    }
    Ok(settings)
}

fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if settings.grid.rows_per_page == 0 || settings.grid.order_rows_per_page == 0 {
        return Err(Error::Config {
            message: "Page sizes must be greater than zero".to_string(),
        });
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            database_url = "sqlite::memory:"
            legacy_source = "data/Northwind_large.sqlite"

            [grid]
            rows_per_page = 20
            order_rows_per_page = 10
            autocomplete_limit = 5
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(
            settings.legacy_source,
            Some(PathBuf::from("data/Northwind_large.sqlite"))
        );
        assert_eq!(settings.grid.rows_per_page, 20);
        assert_eq!(settings.grid.order_rows_per_page, 10);
        assert_eq!(settings.grid.autocomplete_limit, 5);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let settings = parse_settings("[grid]\nrows_per_page = 30\n").unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert!(settings.legacy_source.is_none());
        assert_eq!(settings.grid.rows_per_page, 30);
        assert_eq!(settings.grid.order_rows_per_page, 5);
        assert_eq!(settings.grid.autocomplete_limit, 25);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = parse_settings("[grid]\nrows_per_page = 0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = parse_settings("database_url = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = load_settings_or_default("does/not/exist.toml").unwrap();
        assert_eq!(settings.grid, GridSettings::default());
    }
}
