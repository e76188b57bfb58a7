//! Runtime configuration.
//!
//! All paths, the location, the category filter and the holiday tables come
//! from here and are passed into each component. Sources, lowest precedence
//! first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config <PATH>`, else `stock.toml` if it exists)
//! 3. environment (`OPENWEATHER_API_KEY`, `.env` supported)
//! 4. CLI flags (applied by the caller through [`Overrides`])

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::calendar::CalendarYear;
use crate::data::weather::DEFAULT_BASE_URL;
use crate::error::AppError;

pub const DEFAULT_CONFIG_FILE: &str = "stock.toml";
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Product label used in the report.
    pub product: String,
    pub sales: SalesConfig,
    pub weather: WeatherConfig,
    pub model: ModelConfig,
    pub calendar: Vec<CalendarYear>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SalesConfig {
    pub path: PathBuf,
    /// Case-insensitive substring matched against the `Category` column.
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    pub city: String,
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            product: "sushi".to_string(),
            sales: SalesConfig::default(),
            weather: WeatherConfig::default(),
            model: ModelConfig::default(),
            calendar: Vec::new(),
        }
    }
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sales.csv"),
            category: "sushi".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            city: "Perth,AU".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sushi_predictor.json"),
        }
    }
}

/// CLI-level overrides. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sales_path: Option<PathBuf>,
    pub category: Option<String>,
    pub model_path: Option<PathBuf>,
    pub city: Option<String>,
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE} found; using built-in defaults");
                    Self::default()
                }
            }
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.weather.api_key = Some(key.trim().to_string());
            }
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read config '{}': {e}", path.display())))?;
        let config = Self::from_toml_str(&raw)
            .map_err(|e| AppError::config(format!("Invalid config '{}': {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(raw).map_err(|e| AppError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides, then re-check the values they can break.
    pub fn apply(&mut self, overrides: &Overrides) -> Result<(), AppError> {
        if let Some(p) = &overrides.sales_path {
            self.sales.path = p.clone();
        }
        if let Some(c) = &overrides.category {
            self.sales.category = c.clone();
        }
        if let Some(p) = &overrides.model_path {
            self.model.path = p.clone();
        }
        if let Some(c) = &overrides.city {
            self.weather.city = c.clone();
        }
        self.validate_category()
    }

    fn validate_category(&self) -> Result<(), AppError> {
        if self.sales.category.trim().is_empty() {
            return Err(AppError::config("`sales.category` must not be empty."));
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), AppError> {
        self.validate_category()?;
        for entry in &self.calendar {
            for (start, end) in &entry.school_holidays {
                if end < start {
                    return Err(AppError::config(format!(
                        "Calendar {}: school holiday range ends before it starts ({start} > {end}).",
                        entry.year
                    )));
                }
            }
        }
        let mut years: Vec<i32> = self.calendar.iter().map(|c| c.year).collect();
        years.sort_unstable();
        if let Some(w) = years.windows(2).find(|w| w[0] == w[1]) {
            return Err(AppError::config(format!("Calendar year {} is listed twice.", w[0])));
        }
        Ok(())
    }

    /// Log the effective configuration, masking the API key.
    pub fn log_config(&self) {
        let key = match &self.weather.api_key {
            Some(k) => {
                let n = k.chars().count();
                let tail: String = k.chars().skip(n.saturating_sub(4)).collect();
                if n > 4 { format!("****{tail}") } else { "****".to_string() }
            }
            None => "<unset>".to_string(),
        };
        tracing::info!("Configuration loaded:");
        tracing::info!("  product        : {}", self.product);
        tracing::info!("  sales.path     : {}", self.sales.path.display());
        tracing::info!("  sales.category : {}", self.sales.category);
        tracing::info!("  weather.city   : {}", self.weather.city);
        tracing::info!("  weather.api_key: {}", key);
        tracing::info!("  model.path     : {}", self.model.path.display());
        tracing::info!("  calendar years : {:?}", self.calendar.iter().map(|c| c.year).collect::<Vec<_>>());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.product, "sushi");
        assert_eq!(config.weather.city, "Perth,AU");
        assert_eq!(config.weather.base_url, DEFAULT_BASE_URL);
        assert!(config.calendar.is_empty());
    }

    #[test]
    fn full_file_parses() {
        let raw = r#"
            product = "onigiri"

            [sales]
            path = "data/export.csv"
            category = "rice"

            [weather]
            city = "Fremantle,AU"

            [model]
            path = "models/onigiri.json"

            [[calendar]]
            year = 2026
            school_holidays = [["2026-04-03", "2026-04-19"], ["2026-07-04", "2026-07-19"]]
            public_holidays = ["2026-01-01", "2026-01-26"]
        "#;
        let config = AppConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.product, "onigiri");
        assert_eq!(config.sales.path, PathBuf::from("data/export.csv"));
        assert_eq!(config.sales.category, "rice");
        assert_eq!(config.weather.city, "Fremantle,AU");
        assert_eq!(config.model.path, PathBuf::from("models/onigiri.json"));
        assert_eq!(config.calendar.len(), 1);
        assert_eq!(config.calendar[0].school_holidays.len(), 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AppConfig::from_toml_str("[sales]\npth = \"x.csv\"\n").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let raw = r#"
            [[calendar]]
            year = 2026
            school_holidays = [["2026-04-19", "2026-04-03"]]
        "#;
        assert!(AppConfig::from_toml_str(raw).is_err());
    }

    #[test]
    fn duplicate_years_are_rejected() {
        let raw = "[[calendar]]\nyear = 2026\n[[calendar]]\nyear = 2026\n";
        assert!(AppConfig::from_toml_str(raw).is_err());
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut config = AppConfig::default();
        config.apply(&Overrides {
            city: Some("Sydney,AU".to_string()),
            ..Overrides::default()
        })
        .unwrap();
        assert_eq!(config.weather.city, "Sydney,AU");
        assert_eq!(config.sales.category, "sushi");
    }

    #[test]
    fn empty_category_override_is_rejected() {
        let mut config = AppConfig::default();
        for category in ["", "   "] {
            let err = config
                .apply(&Overrides {
                    category: Some(category.to_string()),
                    ..Overrides::default()
                })
                .unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Config);
        }
    }

    #[test]
    fn missing_explicit_file_is_a_config_error() {
        let err = AppConfig::from_file(Path::new("no/such/stock.toml")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
