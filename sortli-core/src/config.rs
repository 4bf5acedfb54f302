//! Runtime settings loaded from a TOML file with environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::carbon::CarbonModel;
use crate::model::RecyclingCenter;

/// Environment variable overriding [`Settings::vision_api_key`].
pub const ENV_VISION_API_KEY: &str = "SORTLI_VISION_API_KEY";
/// Environment variable overriding [`Settings::places_api_key`].
pub const ENV_PLACES_API_KEY: &str = "SORTLI_PLACES_API_KEY";
/// Environment variable overriding [`Settings::request_timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "SORTLI_TIMEOUT_SECS";

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading settings.
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`Settings`].
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Everything configurable about a sortli deployment.
pub struct Settings {
    /// Key for the label-detection service; no key means local classification only.
    pub vision_api_key: Option<String>,
    /// Key for the places service; no key means the local center directory only.
    pub places_api_key: Option<String>,
    /// Upper bound for each outbound call.
    pub request_timeout_secs: u64,
    /// Ask for localized objects when labels are inconclusive.
    pub object_pass: bool,
    /// Carbon formula applied to every disposal.
    pub carbon_model: CarbonModel,
    /// Default search radius for nearby centers.
    pub search_radius_km: f64,
    /// Where the terminal front end writes its log.
    pub log_file: PathBuf,
    /// Where the user's points, badges, and records are kept between runs.
    pub profile_file: PathBuf,
    /// Known centers used when the places service is unavailable.
    pub centers: Vec<RecyclingCenter>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vision_api_key: None,
            places_api_key: None,
            request_timeout_secs: 10,
            object_pass: true,
            carbon_model: CarbonModel::default(),
            search_radius_km: 5.0,
            log_file: PathBuf::from("sortli.log"),
            profile_file: PathBuf::from("sortli-profile.json"),
            centers: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and [`ConfigError::Invalid`] for
    /// out-of-range values.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, falling back to defaults when the file does not exist,
    /// then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!("Loaded settings from {}", path.display());
                Self::from_toml(&text)?
            }
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        settings.apply_env(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Override fields from variables returned by `lookup`. Empty keys count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the timeout variable is not a positive integer.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_VISION_API_KEY) {
            self.vision_api_key = Some(key);
        }
        if let Some(key) = lookup(ENV_PLACES_API_KEY) {
            self.places_api_key = Some(key);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = raw
                .trim()
                .parse()
                .map_err(|_err| ConfigError::Invalid(format!("{ENV_TIMEOUT_SECS}={raw}")))?;
        }

        self.vision_api_key = non_empty(self.vision_api_key.take());
        self.places_api_key = non_empty(self.places_api_key.take());
        self.validate()
    }

    /// Timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_owned(),
            ));
        }
        if !(self.search_radius_km.is_finite() && self.search_radius_km > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "search_radius_km must be positive, got {}",
                self.search_radius_km
            )));
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WasteCategory;

    #[test]
    fn defaults_without_file() {
        let settings = Settings::load(Some(Path::new("/nonexistent/sortli.toml")));
        let settings = settings.expect("defaults");
        assert_eq!(settings.request_timeout_secs, 10);
        assert!(settings.object_pass);
        assert_eq!(settings.carbon_model, CarbonModel::AvoidedEmissions);
        assert_eq!(settings.profile_file, PathBuf::from("sortli-profile.json"));
    }

    #[test]
    fn parses_full_file() {
        let settings = Settings::from_toml(
            r#"
            vision_api_key = "abc"
            request_timeout_secs = 3
            object_pass = false
            carbon_model = "savings"
            search_radius_km = 12.5
            profile_file = "data/alex.json"

            [[centers]]
            name = "Wertstoffhof Nord"
            address = "Industriestr. 1"
            location = { lat = 50.95, lng = 6.95 }
            accepted = ["glass", "non-recyclable"]
            "#,
        )
        .expect("valid config");

        assert_eq!(settings.vision_api_key.as_deref(), Some("abc"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert!(!settings.object_pass);
        assert_eq!(settings.carbon_model, CarbonModel::Savings);
        assert_eq!(settings.profile_file, PathBuf::from("data/alex.json"));
        let center = settings.centers.first().expect("one center");
        assert_eq!(
            center.accepted,
            vec![WasteCategory::Glass, WasteCategory::NonRecyclable]
        );
    }

    #[test]
    fn example_file_ships_a_center_directory() {
        let settings = Settings::from_toml(include_str!("../../sortli.example.toml"))
            .expect("example config parses");
        assert_eq!(settings.vision_api_key, None);
        assert_eq!(settings.centers.len(), 3);
        assert!(
            settings
                .centers
                .iter()
                .any(|center| center.accepts(WasteCategory::Hazardous))
        );
    }

    #[test]
    fn env_overrides_file() {
        let mut settings = Settings::from_toml(r#"vision_api_key = "from-file""#).expect("valid");
        settings
            .apply_env(|name| match name {
                ENV_VISION_API_KEY => Some("from-env".to_owned()),
                ENV_PLACES_API_KEY => Some("   ".to_owned()),
                ENV_TIMEOUT_SECS => Some("7".to_owned()),
                _ => None,
            })
            .expect("valid overrides");

        assert_eq!(settings.vision_api_key.as_deref(), Some("from-env"));
        assert_eq!(settings.places_api_key, None);
        assert_eq!(settings.request_timeout_secs, 7);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Settings::from_toml("request_timeout_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_toml("carbon_model = \"guesswork\""),
            Err(ConfigError::Parse(_))
        ));
        let mut settings = Settings::default();
        let result = settings.apply_env(|name| (name == ENV_TIMEOUT_SECS).then(|| "soon".to_owned()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
