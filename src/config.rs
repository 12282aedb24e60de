//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directories searched in order for the three artifacts
    pub artifact_dirs: Vec<PathBuf>,

    /// Artifact file names inside a candidate directory
    pub model_file: String,
    pub scaler_file: String,
    pub features_file: String,

    /// Explicit artifact paths; used instead of discovery when all three are set
    pub model_path: Option<PathBuf>,
    pub scaler_path: Option<PathBuf>,
    pub features_path: Option<PathBuf>,

    /// Environment (development, production)
    pub environment: String,

    /// Log output format (text, json)
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            artifact_dirs: vec![PathBuf::from("."), PathBuf::from("models")],
            model_file: "xgboost_model.json".to_string(),
            scaler_file: "scaler.json".to_string(),
            features_file: "features.txt".to_string(),
            model_path: None,
            scaler_path: None,
            features_path: None,
            environment: "development".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            artifact_dirs: env::var("ARTIFACT_DIRS")
                .ok()
                .map(|dirs| parse_dir_list(&dirs))
                .filter(|dirs| !dirs.is_empty())
                .unwrap_or(defaults.artifact_dirs),

            model_file: env::var("MODEL_FILE").unwrap_or(defaults.model_file),
            scaler_file: env::var("SCALER_FILE").unwrap_or(defaults.scaler_file),
            features_file: env::var("FEATURES_FILE").unwrap_or(defaults.features_file),

            model_path: env::var_os("MODEL_PATH").map(PathBuf::from),
            scaler_path: env::var_os("SCALER_PATH").map(PathBuf::from),
            features_path: env::var_os("FEATURES_PATH").map(PathBuf::from),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

fn parse_dir_list(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_artifact_dirs() {
        let config = Config::default();
        assert_eq!(config.artifact_dirs, [PathBuf::from("."), PathBuf::from("models")]);
        assert!(!config.is_production());
        assert!(!config.json_logs());
    }

    #[test]
    fn test_parse_dir_list() {
        assert_eq!(
            parse_dir_list(" /srv/models , ,artifacts"),
            [PathBuf::from("/srv/models"), PathBuf::from("artifacts")]
        );
        assert!(parse_dir_list(" , ").is_empty());
    }
}
