//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and the
//! environment, and merging configurations with proper precedence rules.
//! The environment contract is the one the checker has always been deployed
//! with (`SPREADSHEET_ID`, `RESULT_S3_BUCKET`, ...), so existing cron
//! setups keep working unchanged.

use crate::error::BlockCheckError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files or the environment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for run options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Where the target list comes from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfig>,

    /// Where the result batch goes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadConfig>,
}

/// Default run option values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Worker pool size (one browser session each)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Browser label stamped into result records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,

    /// WebDriver endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webdriver_url: Option<String>,

    /// Per-navigation timeout (as string, e.g., "30s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_timeout: Option<String>,

    /// Tag name of the content-blocked indicator element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_indicator: Option<String>,
}

/// Target source configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    /// Google spreadsheet id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    /// Worksheet name inside the spreadsheet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worksheet: Option<String>,

    /// Sheets API key, inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// S3 bucket holding the Sheets API key object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_s3_bucket: Option<String>,

    /// S3 key of the Sheets API key object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_s3_key: Option<String>,

    /// Local target-list file (alternative to the spreadsheet)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Result upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UploadConfig {
    /// S3 bucket for the result batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<String>,

    /// S3 key for the result batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,

    /// Local result file (alternative to S3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Load configuration from environment variables.
///
/// Returns a `FileConfig` so it merges like any other layer. Unset and
/// empty variables are ignored.
pub fn load_env_config() -> FileConfig {
    fn var(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }

    let defaults = DefaultsConfig {
        workers: var("BLOCK_CHECK_WORKERS").and_then(|v| v.parse().ok()),
        browser: var("BLOCK_CHECK_BROWSER"),
        webdriver_url: var("WEBDRIVER_URL"),
        nav_timeout: var("BLOCK_CHECK_NAV_TIMEOUT"),
        block_indicator: var("BLOCK_CHECK_INDICATOR"),
    };

    let source = SourceConfig {
        spreadsheet_id: var("SPREADSHEET_ID"),
        worksheet: var("WORKSHEET_NAME"),
        api_key: var("GOOGLE_API_KEY"),
        api_key_s3_bucket: var("GOOGLE_API_KEY_BUCKET_S3"),
        api_key_s3_key: var("GOOGLE_API_KEY_KEY_S3"),
        file: var("TARGETS_FILE"),
    };

    let upload = UploadConfig {
        s3_bucket: var("RESULT_S3_BUCKET"),
        s3_key: var("RESULT_S3_KEY"),
        file: var("RESULT_FILE"),
    };

    FileConfig {
        defaults: some_if_set(defaults, |d| {
            d.workers.is_some()
                || d.browser.is_some()
                || d.webdriver_url.is_some()
                || d.nav_timeout.is_some()
                || d.block_indicator.is_some()
        }),
        source: some_if_set(source, |s| {
            s.spreadsheet_id.is_some()
                || s.worksheet.is_some()
                || s.api_key.is_some()
                || s.api_key_s3_bucket.is_some()
                || s.api_key_s3_key.is_some()
                || s.file.is_some()
        }),
        upload: some_if_set(upload, |u| {
            u.s3_bucket.is_some() || u.s3_key.is_some() || u.file.is_some()
        }),
    }
}

fn some_if_set<T>(section: T, is_set: impl Fn(&T) -> bool) -> Option<T> {
    if is_set(&section) {
        Some(section)
    } else {
        None
    }
}

/// Parse a human timeout string like "5s", "30s", "2m".
pub fn parse_timeout_string(value: &str) -> Option<Duration> {
    let value = value.trim();
    let unit = value.chars().last()?;
    let amount: u64 = value[..value.len() - unit.len_utf8()].parse().ok()?;
    match unit {
        's' => Some(Duration::from_secs(amount)),
        'm' => Some(Duration::from_secs(amount * 60)),
        _ => None,
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to emit warnings for config issues
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing, unreadable, fails to
    /// parse, or fails validation.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> crate::Result<FileConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BlockCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            BlockCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            BlockCheckError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is loaded first, then the home-directory config, then the
    /// local one — later files override earlier ones field by field. The
    /// environment layer is applied on top by the caller.
    pub fn discover_and_load(&self) -> crate::Result<FileConfig> {
        let mut merged = FileConfig::default();
        let mut loaded_files = Vec::new();

        if let Some(xdg_path) = self.get_xdg_config_path() {
            if let Ok(config) = self.load_file(&xdg_path) {
                merged = merge_configs(merged, config);
                loaded_files.push(xdg_path);
            }
        }

        if let Some(global_path) = self.get_global_config_path() {
            if let Ok(config) = self.load_file(&global_path) {
                merged = merge_configs(merged, config);
                loaded_files.push(global_path);
            }
        }

        if let Some(local_path) = self.get_local_config_path() {
            if let Ok(config) = self.load_file(&local_path) {
                merged = merge_configs(merged, config);
                loaded_files.push(local_path);
            }
        }

        if self.verbose && loaded_files.len() > 1 {
            eprintln!("⚠️  Multiple config files found. Using precedence:");
            for (i, path) in loaded_files.iter().enumerate() {
                let status = if i == loaded_files.len() - 1 {
                    "active"
                } else {
                    "overridden"
                };
                eprintln!("   {} ({})", path.display(), status);
            }
        }

        Ok(merged)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./block-check.toml", "./.block-check.toml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Some(path.to_path_buf());
            }
        }

        None
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        if let Some(home) = env::var_os("HOME") {
            let candidates = [".block-check.toml", "block-check.toml"];

            for candidate in &candidates {
                let path = Path::new(&home).join(candidate);
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }

    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("block-check").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> crate::Result<()> {
        if let Some(defaults) = &config.defaults {
            if let Some(workers) = defaults.workers {
                if workers == 0 || workers > 100 {
                    return Err(BlockCheckError::config(
                        "Worker count must be between 1 and 100",
                    ));
                }
            }

            if let Some(timeout) = &defaults.nav_timeout {
                if parse_timeout_string(timeout).is_none() {
                    return Err(BlockCheckError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout
                    )));
                }
            }
        }

        if let Some(upload) = &config.upload {
            if upload.s3_bucket.is_some() != upload.s3_key.is_some() {
                return Err(BlockCheckError::config(
                    "S3 upload needs both s3_bucket and s3_key",
                ));
            }
        }

        Ok(())
    }
}

/// Merge two configurations, `higher` winning field by field.
pub fn merge_configs(lower: FileConfig, higher: FileConfig) -> FileConfig {
    FileConfig {
        defaults: match (lower.defaults, higher.defaults) {
            (Some(mut lower_defaults), Some(higher_defaults)) => {
                if higher_defaults.workers.is_some() {
                    lower_defaults.workers = higher_defaults.workers;
                }
                if higher_defaults.browser.is_some() {
                    lower_defaults.browser = higher_defaults.browser;
                }
                if higher_defaults.webdriver_url.is_some() {
                    lower_defaults.webdriver_url = higher_defaults.webdriver_url;
                }
                if higher_defaults.nav_timeout.is_some() {
                    lower_defaults.nav_timeout = higher_defaults.nav_timeout;
                }
                if higher_defaults.block_indicator.is_some() {
                    lower_defaults.block_indicator = higher_defaults.block_indicator;
                }
                Some(lower_defaults)
            }
            (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
        },
        source: match (lower.source, higher.source) {
            (Some(mut lower_source), Some(higher_source)) => {
                if higher_source.spreadsheet_id.is_some() {
                    lower_source.spreadsheet_id = higher_source.spreadsheet_id;
                }
                if higher_source.worksheet.is_some() {
                    lower_source.worksheet = higher_source.worksheet;
                }
                if higher_source.api_key.is_some() {
                    lower_source.api_key = higher_source.api_key;
                }
                if higher_source.api_key_s3_bucket.is_some() {
                    lower_source.api_key_s3_bucket = higher_source.api_key_s3_bucket;
                }
                if higher_source.api_key_s3_key.is_some() {
                    lower_source.api_key_s3_key = higher_source.api_key_s3_key;
                }
                if higher_source.file.is_some() {
                    lower_source.file = higher_source.file;
                }
                Some(lower_source)
            }
            (lower_source, higher_source) => higher_source.or(lower_source),
        },
        upload: match (lower.upload, higher.upload) {
            (Some(mut lower_upload), Some(higher_upload)) => {
                if higher_upload.s3_bucket.is_some() {
                    lower_upload.s3_bucket = higher_upload.s3_bucket;
                }
                if higher_upload.s3_key.is_some() {
                    lower_upload.s3_key = higher_upload.s3_key;
                }
                if higher_upload.file.is_some() {
                    lower_upload.file = higher_upload.file;
                }
                Some(lower_upload)
            }
            (lower_upload, higher_upload) => higher_upload.or(lower_upload),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string(""), None);
        assert_eq!(parse_timeout_string("10"), None);
        assert_eq!(parse_timeout_string("abc"), None);
        assert_eq!(parse_timeout_string("5h"), None);
    }

    #[test]
    fn test_load_file_parses_all_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[defaults]
workers = 4
browser = "yandex-browser"
nav_timeout = "45s"

[source]
spreadsheet_id = "sheet-1"
worksheet = "Domains"

[upload]
s3_bucket = "results"
s3_key = "checked/latest.jsonl"
"#
        )
        .unwrap();

        let config = ConfigManager::new(false).load_file(file.path()).unwrap();
        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.workers, Some(4));
        assert_eq!(defaults.nav_timeout.as_deref(), Some("45s"));
        assert_eq!(
            config.source.unwrap().spreadsheet_id.as_deref(),
            Some("sheet-1")
        );
        assert_eq!(config.upload.unwrap().s3_key.as_deref(), Some("checked/latest.jsonl"));
    }

    #[test]
    fn test_load_file_rejects_bad_worker_count() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\nworkers = 0").unwrap();

        let err = ConfigManager::new(false).load_file(file.path()).unwrap_err();
        assert!(matches!(err, BlockCheckError::ConfigError { .. }));
    }

    #[test]
    fn test_load_file_rejects_partial_s3_upload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upload]\ns3_bucket = \"results\"").unwrap();

        assert!(ConfigManager::new(false).load_file(file.path()).is_err());
    }

    #[test]
    fn test_merge_higher_wins_per_field() {
        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                workers: Some(10),
                browser: Some("yandex-browser".to_string()),
                ..Default::default()
            }),
            source: Some(SourceConfig {
                spreadsheet_id: Some("low".to_string()),
                worksheet: Some("Domains".to_string()),
                ..Default::default()
            }),
            upload: None,
        };
        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                workers: Some(4),
                ..Default::default()
            }),
            source: Some(SourceConfig {
                spreadsheet_id: Some("high".to_string()),
                ..Default::default()
            }),
            upload: Some(UploadConfig {
                file: Some("out.jsonl".to_string()),
                ..Default::default()
            }),
        };

        let merged = merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();
        assert_eq!(defaults.workers, Some(4));
        // Untouched lower field survives
        assert_eq!(defaults.browser.as_deref(), Some("yandex-browser"));
        let source = merged.source.unwrap();
        assert_eq!(source.spreadsheet_id.as_deref(), Some("high"));
        assert_eq!(source.worksheet.as_deref(), Some("Domains"));
        assert_eq!(merged.upload.unwrap().file.as_deref(), Some("out.jsonl"));
    }

    #[test]
    fn test_env_config_picks_up_deployment_contract() {
        // Serialized env mutation: this test owns these variables
        env::set_var("SPREADSHEET_ID", "env-sheet");
        env::set_var("WORKSHEET_NAME", "Domains");
        env::set_var("RESULT_S3_BUCKET", "env-bucket");
        env::set_var("RESULT_S3_KEY", "env-key");
        env::set_var("BLOCK_CHECK_WORKERS", "7");

        let config = load_env_config();

        let source = config.source.unwrap();
        assert_eq!(source.spreadsheet_id.as_deref(), Some("env-sheet"));
        assert_eq!(source.worksheet.as_deref(), Some("Domains"));
        let upload = config.upload.unwrap();
        assert_eq!(upload.s3_bucket.as_deref(), Some("env-bucket"));
        assert_eq!(config.defaults.unwrap().workers, Some(7));

        env::remove_var("SPREADSHEET_ID");
        env::remove_var("WORKSHEET_NAME");
        env::remove_var("RESULT_S3_BUCKET");
        env::remove_var("RESULT_S3_KEY");
        env::remove_var("BLOCK_CHECK_WORKERS");
    }

    #[test]
    fn test_env_config_empty_environment_is_empty() {
        // None of the block-check variables are set under a clean test run
        let config = FileConfig::default();
        assert!(config.defaults.is_none());
        assert!(config.source.is_none());
        assert!(config.upload.is_none());
    }
}
