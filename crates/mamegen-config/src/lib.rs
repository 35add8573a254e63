//! Configuration management for mamegen
//!
//! Handles the deployment settings file (where the emulator, its data tables
//! and the scratch directories live) and typed access to the per-launch
//! options chosen by the user for a system.

pub mod options;
mod paths;

pub use options::{BoolOption, Resolved, SystemConfig, TextOption};
pub use paths::MamePaths;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Layered configuration error: {0}")]
    Layered(#[from] config::ConfigError),
}

/// Standard configuration paths
pub const CONFIG_DIR: &str = "/etc/mamegen";
pub const USER_CONFIG_DIR: &str = "/userdata/system/configs/mamegen";

/// Prefix for environment overrides, e.g. `MAMEGEN_PATHS__USERDATA=/mnt/data`
pub const ENV_PREFIX: &str = "MAMEGEN";

/// Main mamegen settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorSettings {
    #[serde(default)]
    pub paths: MamePaths,
}

impl GeneratorSettings {
    /// Load settings from a file, with environment overrides layered on top
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let settings = Self::layered(Some(path), Self::environment())?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    /// Defaults, then the optional file, then the environment
    fn layered(file: Option<&Path>, env: config::Environment) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        Ok(builder.add_source(env).build()?.try_deserialize()?)
    }

    /// Load settings from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        // Try user settings first, then system settings
        let user_settings = Path::new(USER_CONFIG_DIR).join("settings.toml");
        if user_settings.exists() {
            return Self::load(&user_settings);
        }

        let system_settings = Path::new(CONFIG_DIR).join("settings.toml");
        if system_settings.exists() {
            return Self::load(&system_settings);
        }

        tracing::warn!("No settings file found, using defaults");
        Self::layered(None, Self::environment())
    }

    /// Parse settings from a TOML string without environment overrides
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = GeneratorSettings::default();
        assert_eq!(settings.paths.userdata, PathBuf::from("/userdata"));
        assert_eq!(settings.paths.emulator_dir, PathBuf::from("/usr/bin/mame"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/etc/mamegen/settings.toml"));
        assert!(format!("{}", err).contains("not found"));

        let err = ConfigError::Invalid("test error".to_string());
        assert!(format!("{}", err).contains("Invalid"));
    }

    #[test]
    fn test_load_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let contents = r#"
[paths]
userdata = "/mnt/userdata"
software_dir = "/tmp/soft"
"#;
        write!(temp_file, "{}", contents).unwrap();

        let settings = GeneratorSettings::load(temp_file.path()).unwrap();
        assert_eq!(settings.paths.userdata, PathBuf::from("/mnt/userdata"));
        assert_eq!(settings.paths.software_dir, PathBuf::from("/tmp/soft"));
        // Unset fields keep their defaults
        assert_eq!(settings.paths.emulator_dir, PathBuf::from("/usr/bin/mame"));
    }

    #[test]
    fn test_environment_without_file() {
        let mut vars = config::Map::new();
        vars.insert("MAMEGEN_PATHS__USERDATA".to_string(), "/mnt/data".to_string());
        vars.insert("MAMEGEN_PATHS__EMULATOR_DIR".to_string(), "/opt/mame".to_string());
        vars.insert("OTHER_PATHS__DATA_DIR".to_string(), "/ignored".to_string());

        let env = GeneratorSettings::environment().source(Some(vars));
        let settings = GeneratorSettings::layered(None, env).unwrap();

        assert_eq!(settings.paths.userdata, PathBuf::from("/mnt/data"));
        assert_eq!(settings.paths.emulator_dir, PathBuf::from("/opt/mame"));
        assert_eq!(settings.paths.data_dir, GeneratorSettings::default().paths.data_dir);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[paths]\nuserdata = \"/mnt/userdata\"\n").unwrap();

        let mut vars = config::Map::new();
        vars.insert("MAMEGEN_PATHS__USERDATA".to_string(), "/media/usb".to_string());
        let env = GeneratorSettings::environment().source(Some(vars));

        let settings = GeneratorSettings::layered(Some(temp_file.path()), env).unwrap();
        assert_eq!(settings.paths.userdata, PathBuf::from("/media/usb"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = GeneratorSettings::load(Path::new("/nonexistent/settings.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = GeneratorSettings::default();
        settings.paths.artwork_dir = PathBuf::from("/tmp/art");
        settings.save(&path).unwrap();

        let loaded = GeneratorSettings::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.paths.artwork_dir, PathBuf::from("/tmp/art"));
    }
}
