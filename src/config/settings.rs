//! Report settings loading from config.toml
//!
//! The `[report]` table chooses the default breakdown window and the order in
//! which monthly trend rows are presented. Every key is optional; a missing
//! file means defaults throughout.

use crate::core::trend::DisplayOrder;
use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Report defaults
    #[serde(default)]
    pub report: ReportSettings,
}

/// The `[report]` table
#[derive(Debug, Default, Deserialize)]
pub struct ReportSettings {
    /// Inclusive start of the breakdown window, as a quoted `"YYYY-MM-DD"` string
    pub start_date: Option<NaiveDate>,
    /// Inclusive end of the breakdown window, as a quoted `"YYYY-MM-DD"` string
    pub end_date: Option<NaiveDate>,
    /// Presentation order for the monthly trend table
    #[serde(default)]
    pub display_order: DisplayOrder,
}

impl ReportSettings {
    /// Resolves the breakdown window, defaulting to the month containing `today`
    /// up to and including `today`.
    ///
    /// The window is returned as configured; range validation happens in the
    /// breakdown calculator.
    #[must_use]
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let month_start = today.with_day(1).unwrap_or(today);
        (
            self.start_date.unwrap_or(month_start),
            self.end_date.unwrap_or(today),
        )
    }
}

/// Loads settings from a TOML file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from ./config.toml, falling back to defaults when the file is absent
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_settings(path)
    } else {
        tracing::info!("No config.toml found, using default report settings");
        Ok(Settings::default())
    }
}
