// Configuration module for scroll-spy
// This module handles loading and parsing configuration from ~/.config/scroll-spy/config.toml

mod types;

pub use types::{Config, OutputFormat, ReplayConfig, ThrottleConfig};

use std::fs;
use std::path::{Path, PathBuf};

/// Result of loading configuration
pub struct ConfigResult {
    pub config: Config,
    pub warning: Option<String>,
}

/// Loads configuration from ~/.config/scroll-spy/config.toml
/// Returns default configuration if file doesn't exist or on parse errors
pub fn load_config() -> ConfigResult {
    load_config_from(&get_config_path())
}

/// Loads configuration from an explicit path with the same fallback rules
pub fn load_config_from(config_path: &Path) -> ConfigResult {
    #[cfg(debug_assertions)]
    log::debug!("Loading config from {:?}", config_path);

    // If file doesn't exist, return defaults silently
    if !config_path.exists() {
        #[cfg(debug_assertions)]
        log::debug!("Config file does not exist, using defaults");
        return ConfigResult {
            config: Config::default(),
            warning: None,
        };
    }

    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            #[cfg(debug_assertions)]
            log::error!("Failed to read config file {:?}: {}", config_path, e);
            return ConfigResult {
                config: Config::default(),
                warning: Some(format!("Failed to read config: {}", e)),
            };
        }
    };

    match toml::from_str::<Config>(&contents) {
        Ok(config) => {
            #[cfg(debug_assertions)]
            log::debug!(
                "Config parsed successfully: throttle {}ms, format {:?}",
                config.throttle.default_ms,
                config.replay.format
            );
            ConfigResult {
                config,
                warning: None,
            }
        }
        Err(e) => {
            #[cfg(debug_assertions)]
            log::error!("Failed to parse config file {:?}: {}", config_path, e);
            ConfigResult {
                config: Config::default(),
                warning: Some(format!("Invalid config: {}", e)),
            }
        }
    }
}

/// Returns the path to the configuration file
///
/// Always uses ~/.config/scroll-spy/config.toml on all platforms for consistency.
fn get_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("scroll-spy")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    // Feature: config-system, Property 4: Malformed TOML fallback
    // For any malformed TOML syntax in the config file, the config system should
    // return a config with all default values and a warning.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn prop_malformed_toml_fallback(
            malformed in prop::sample::select(vec![
                "[throttle\ndefault_ms = 10",        // Missing closing bracket
                "[replay]\nformat = json",           // Missing quotes
                "[throttle]\n default_ms",           // Missing value
                "throttle]\ndefault_ms = 10",        // Missing opening bracket
                "[replay]\nformat = \"text",         // Unterminated string
            ])
        ) {
            let file = write_config(malformed);
            let result = load_config_from(file.path());

            prop_assert!(result.warning.is_some(), "Malformed TOML should warn");
            prop_assert!(result.warning.unwrap().starts_with("Invalid config"));
            prop_assert_eq!(result.config.throttle.default_ms, 66);
            prop_assert_eq!(result.config.replay.format, OutputFormat::Text);
        }
    }

    // Feature: config-system, Property 5: Config path consistency
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_config_path_consistency(_iteration in 0..10u32) {
            let path1 = get_config_path();
            let path2 = get_config_path();

            prop_assert_eq!(&path1, &path2, "Config path should be consistent");

            let path_str = path1.to_string_lossy();
            prop_assert!(
                path_str.ends_with("scroll-spy/config.toml")
                    || path_str.ends_with("scroll-spy\\config.toml"),
                "Config path should end with scroll-spy/config.toml, got: {}",
                path_str
            );
        }
    }

    #[test]
    fn test_missing_file_returns_defaults_silently() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from(&dir.path().join("absent.toml"));

        assert!(result.warning.is_none());
        assert_eq!(result.config.throttle.default_ms, 66);
    }

    #[test]
    fn test_valid_file_is_loaded() {
        let file = write_config("[throttle]\ndefault_ms = 250\n[replay]\nformat = \"json\"\n");
        let result = load_config_from(file.path());

        assert!(result.warning.is_none());
        assert_eq!(result.config.throttle.default_ms, 250);
        assert_eq!(result.config.replay.format, OutputFormat::Json);
    }

    #[test]
    fn test_unreadable_path_warns() {
        // A directory exists but cannot be read as a file.
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from(dir.path());

        assert!(result.warning.is_some());
        assert!(result.warning.unwrap().starts_with("Failed to read config"));
        assert_eq!(result.config.throttle.default_ms, 66);
    }
}
