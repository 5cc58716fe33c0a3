/// Database configuration and connection management
pub mod database;

/// Report settings loading from config.toml
pub mod settings;
