//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Ticketry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub limits: ValidationLimits,
    pub users: UserSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file; `None` means the platform default location
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

/// Field length bounds enforced by the aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub issue_title_max: usize,
    pub issue_description_max: usize,
    pub team_name_max: usize,
    pub team_description_max: usize,
    pub user_name_max: usize,
    pub email_max: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Gate for the permanent user delete operation
    pub allow_permanent_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            limits: ValidationLimits::default(),
            users: UserSettings::default(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            issue_title_max: 200,
            issue_description_max: 4000,
            team_name_max: 100,
            team_description_max: 1000,
            user_name_max: 100,
            email_max: 320,
        }
    }
}

impl ValidationLimits {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("limits.issue_title_max", self.issue_title_max),
            ("limits.issue_description_max", self.issue_description_max),
            ("limits.team_name_max", self.team_name_max),
            ("limits.team_description_max", self.team_description_max),
            ("limits.user_name_max", self.user_name_max),
            ("limits.email_max", self.email_max),
        ];
        for (key, value) in fields {
            if value == 0 {
                return Err(Error::ConfigError(format!(
                    "{} must be greater than zero",
                    key
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("TICKETRY_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("ticketry")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or return defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(Error::ConfigError(
                "database.max_connections must be greater than zero".to_string(),
            ));
        }
        self.limits.validate()
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "database.path" => Ok(self
                .database
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".to_string())),
            "database.max_connections" => Ok(self.database.max_connections.to_string()),

            "limits.issue_title_max" => Ok(self.limits.issue_title_max.to_string()),
            "limits.issue_description_max" => Ok(self.limits.issue_description_max.to_string()),
            "limits.team_name_max" => Ok(self.limits.team_name_max.to_string()),
            "limits.team_description_max" => Ok(self.limits.team_description_max.to_string()),
            "limits.user_name_max" => Ok(self.limits.user_name_max.to_string()),
            "limits.email_max" => Ok(self.limits.email_max.to_string()),

            "users.allow_permanent_delete" => Ok(self.users.allow_permanent_delete.to_string()),

            _ => Err(Error::ConfigError(format!("Unknown configuration key: {}", key)).into()),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let parse_usize = |value: &str| -> anyhow::Result<usize> {
            value
                .parse()
                .with_context(|| format!("Invalid value for {}: {}", key, value))
        };

        match key {
            "database.path" => {
                self.database.path = Some(PathBuf::from(value));
            }
            "database.max_connections" => {
                self.database.max_connections = value
                    .parse()
                    .with_context(|| format!("Invalid value for {}: {}", key, value))?;
            }
            "limits.issue_title_max" => self.limits.issue_title_max = parse_usize(value)?,
            "limits.issue_description_max" => {
                self.limits.issue_description_max = parse_usize(value)?
            }
            "limits.team_name_max" => self.limits.team_name_max = parse_usize(value)?,
            "limits.team_description_max" => {
                self.limits.team_description_max = parse_usize(value)?
            }
            "limits.user_name_max" => self.limits.user_name_max = parse_usize(value)?,
            "limits.email_max" => self.limits.email_max = parse_usize(value)?,
            "users.allow_permanent_delete" => {
                self.users.allow_permanent_delete = value
                    .parse()
                    .with_context(|| format!("Invalid boolean for {}: {}", key, value))?;
            }
            _ => {
                return Err(
                    Error::ConfigError(format!("Unknown configuration key: {}", key)).into(),
                );
            }
        }

        Ok(self.validate()?)
    }

    /// All keys understood by `get` / `set`
    pub fn keys() -> &'static [&'static str] {
        &[
            "database.path",
            "database.max_connections",
            "limits.issue_title_max",
            "limits.issue_description_max",
            "limits.team_name_max",
            "limits.team_description_max",
            "limits.user_name_max",
            "limits.email_max",
            "users.allow_permanent_delete",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert!(!config.users.allow_permanent_delete);
        assert_eq!(config.limits.issue_title_max, 200);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.set("limits.team_name_max", "50").unwrap();
        config.set("users.allow_permanent_delete", "true").unwrap();

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = Config::from_toml("[users]\nallow_permanent_delete = true\n").unwrap();
        assert!(parsed.users.allow_permanent_delete);
        assert_eq!(parsed.limits, ValidationLimits::default());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = Config::default();
        assert!(config.set("limits.issue_title_max", "0").is_err());
        assert!(Config::from_toml("[limits]\nemail_max = 0\n").is_err());
    }

    #[test]
    fn test_get_every_key() {
        let config = Config::default();
        for key in Config::keys() {
            assert!(config.get(key).is_ok(), "key {} should be readable", key);
        }
        assert!(config.get("nope").is_err());
    }

    #[test]
    fn test_invalid_values_surface_as_config_errors() {
        let mut config = Config::default();
        let err = config.set("limits.issue_title_max", "0").unwrap_err();
        let core = err.downcast_ref::<Error>().unwrap();
        assert_eq!(core.code(), "E600");
        assert_eq!(core.suggestion(), Some("ticketry config show".to_string()));

        let err = config.get("nope").unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::ConfigError(_))));

        let err = Config::from_toml("[database]\nmax_connections = 0\n").unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::ConfigError(_))));
    }
}
