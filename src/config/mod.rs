/// Database connection and schema creation
pub mod database;

/// Application settings loading from config.toml
pub mod settings;

pub use settings::{GridSettings, Settings, load_settings, load_settings_or_default};
