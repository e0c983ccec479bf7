//! Configuration file support for Bolus.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bolus/config.toml`.

use crate::{Dose, Error, InsulinKind, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no lookup API key is configured
pub const API_KEY_ENV: &str = "NUTRITION_API_KEY";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub doses: DoseConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Nutrition lookup configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_lookup_base_url")]
    pub base_url: String,

    /// API key; when unset, the NUTRITION_API_KEY environment variable
    /// is consulted instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_lookup_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_lookup_base_url(),
            api_key: None,
            timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

impl LookupConfig {
    /// Resolve the API key from config or environment
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        std::env::var(API_KEY_ENV).map_err(|_| {
            Error::Config(format!(
                "no lookup API key configured; set [lookup].api_key or the {} environment variable",
                API_KEY_ENV
            ))
        })
    }
}

/// Seed doses written on first access to a missing dose store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DoseConfig {
    #[serde(default = "default_short_insulin_amount")]
    pub short_insulin_amount: u32,

    #[serde(default = "default_short_carbs_amount")]
    pub short_carbs_amount: u32,

    #[serde(default = "default_long_insulin_amount")]
    pub long_insulin_amount: u32,
}

impl Default for DoseConfig {
    fn default() -> Self {
        Self {
            short_insulin_amount: default_short_insulin_amount(),
            short_carbs_amount: default_short_carbs_amount(),
            long_insulin_amount: default_long_insulin_amount(),
        }
    }
}

impl DoseConfig {
    /// Build the validated (short, long) seed pair
    pub fn seed_doses(&self) -> Result<(Dose, Dose)> {
        let short = Dose::new(
            InsulinKind::Short,
            self.short_insulin_amount,
            self.short_carbs_amount,
        )?;
        let long = Dose::new(InsulinKind::Long, self.long_insulin_amount, 0)?;
        Ok((short, long))
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("bolus")
}

fn default_lookup_base_url() -> String {
    "https://api.calorieninjas.com/v1/nutrition".to_string()
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

fn default_short_insulin_amount() -> u32 {
    1
}

fn default_short_carbs_amount() -> u32 {
    10
}

fn default_long_insulin_amount() -> u32 {
    24
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("bolus").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Path of the dose store inside the data directory
    pub fn dose_store_path(&self) -> PathBuf {
        self.data.data_dir.join("doses.csv")
    }

    /// Path of the injection log inside the data directory
    pub fn injection_log_path(&self) -> PathBuf {
        self.data.data_dir.join("injections.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.doses.short_insulin_amount, 1);
        assert_eq!(config.doses.short_carbs_amount, 10);
        assert_eq!(config.doses.long_insulin_amount, 24);
        assert!(config.lookup.base_url.contains("calorieninjas"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.lookup.api_key = Some("test-key".into());

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.lookup.api_key.as_deref(), Some("test-key"));
        assert_eq!(
            parsed.doses.short_carbs_amount,
            config.doses.short_carbs_amount
        );
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[doses]
short_carbs_amount = 12
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.doses.short_carbs_amount, 12);
        assert_eq!(config.doses.short_insulin_amount, 1); // default
        assert_eq!(config.lookup.timeout_secs, 10); // default
    }

    #[test]
    fn test_seed_doses_match_defaults() {
        let (short, long) = DoseConfig::default().seed_doses().unwrap();
        assert_eq!(short, Dose::default_short());
        assert_eq!(long, Dose::default_long());
    }

    #[test]
    fn test_configured_api_key_wins() {
        let lookup = LookupConfig {
            api_key: Some("from-config".into()),
            ..Default::default()
        };
        assert_eq!(lookup.resolve_api_key().unwrap(), "from-config");
    }

    #[test]
    fn test_invalid_seed_doses_rejected() {
        let doses = DoseConfig {
            short_insulin_amount: 1,
            short_carbs_amount: 0,
            long_insulin_amount: 24,
        };
        assert!(doses.seed_doses().is_err());
    }
}
