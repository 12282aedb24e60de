//! Artifact discovery and startup loading
//!
//! Runs once before the listener is bound. Any failure leaves the service
//! `Unready` for the life of the process; a restart is required to retry.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::Config;
use crate::features::{AliasRegistry, FeatureSchema, SchemaError};
use crate::model::{self, ArtifactError, InferenceAdapter, Normalizer, Scaler};
use crate::service::{ArtifactFingerprints, ArtifactPaths, ServiceContext, ServiceState};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Model artifacts not found. Expected '{model}', '{scaler}', '{features}' in one of: {searched}")]
    NotFound {
        model: String,
        scaler: String,
        features: String,
        searched: String,
    },

    #[error("feature schema unavailable: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to load scaler: {0}")]
    Scaler(#[source] ArtifactError),

    #[error("failed to load model: {0}")]
    Model(#[source] ArtifactError),

    #[error("{artifact} expects {actual} features but the feature list has {expected}")]
    DimensionMismatch {
        artifact: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("cannot fingerprint {path}: {source}")]
    Fingerprint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// DISCOVERY
// ============================================================================

/// Explicit paths win; otherwise the first directory holding all three files
pub fn locate(config: &Config) -> Result<ArtifactPaths, LoadError> {
    if let (Some(model), Some(scaler), Some(features)) =
        (&config.model_path, &config.scaler_path, &config.features_path)
    {
        return Ok(ArtifactPaths {
            model: model.clone(),
            scaler: scaler.clone(),
            features: features.clone(),
        });
    }

    for dir in &config.artifact_dirs {
        let candidate = ArtifactPaths {
            model: dir.join(&config.model_file),
            scaler: dir.join(&config.scaler_file),
            features: dir.join(&config.features_file),
        };
        if candidate.model.exists() && candidate.scaler.exists() && candidate.features.exists() {
            return Ok(candidate);
        }
    }

    Err(LoadError::NotFound {
        model: config.model_file.clone(),
        scaler: config.scaler_file.clone(),
        features: config.features_file.clone(),
        searched: config
            .artifact_dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

// ============================================================================
// LOADING
// ============================================================================

/// Load and cross-check all three artifacts
pub fn load(paths: &ArtifactPaths, aliases: AliasRegistry) -> Result<ServiceContext, LoadError> {
    let schema = FeatureSchema::load(&paths.features)?;
    let scaler = Scaler::load(&paths.scaler).map_err(LoadError::Scaler)?;
    let predictor = model::load_predictor(&paths.model).map_err(LoadError::Model)?;

    check_width("scaler", schema.len(), scaler.n_features())?;
    check_width("model", schema.len(), predictor.n_features())?;

    let fingerprints = ArtifactFingerprints {
        model_sha256: fingerprint(&paths.model)?,
        scaler_sha256: fingerprint(&paths.scaler)?,
        features_sha256: fingerprint(&paths.features)?,
    };

    tracing::info!(
        "Loaded {} scaler and {} model (sha256 {})",
        scaler.kind(),
        predictor.kind(),
        &fingerprints.model_sha256[..12]
    );

    let adapter = InferenceAdapter::new(Box::new(scaler), predictor);
    let mut ctx = ServiceContext::new(schema, aliases, adapter);
    ctx.paths = Some(paths.clone());
    ctx.fingerprints = fingerprints;

    Ok(ctx)
}

fn check_width(artifact: &'static str, expected: usize, actual: Option<usize>) -> Result<(), LoadError> {
    match actual {
        Some(actual) if actual != expected => Err(LoadError::DimensionMismatch { artifact, expected, actual }),
        _ => Ok(()),
    }
}

fn fingerprint(path: &Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Fingerprint {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Startup entry point: never fails, returns `Unready` with a reason instead
pub fn initialize(config: &Config) -> ServiceState {
    log_diagnostics(config);

    let paths = match locate(config) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!("{}", e);
            return ServiceState::unready(e.to_string());
        }
    };

    tracing::info!(
        "Using MODEL_PATH={}, SCALER_PATH={}, FEATURES_PATH={}",
        paths.model.display(),
        paths.scaler.display(),
        paths.features.display()
    );

    let aliases = AliasRegistry::cmapss();
    tracing::debug!("{} readable aliases registered", aliases.len());

    match load(&paths, aliases) {
        Ok(ctx) => {
            tracing::info!(
                "Model and scaler loaded successfully. Number of features: {}",
                ctx.schema.len()
            );
            ServiceState::Ready(ctx)
        }
        Err(e) => {
            tracing::error!("Failed to load model/scaler/features: {}", e);
            ServiceState::Unready {
                reason: e.to_string(),
                paths: Some(paths),
            }
        }
    }
}

fn log_diagnostics(config: &Config) {
    match std::env::current_dir() {
        Ok(cwd) => tracing::info!("cwd: {}", cwd.display()),
        Err(e) => tracing::warn!("could not read cwd: {}", e),
    }

    for dir in &config.artifact_dirs {
        match std::fs::read_dir(dir) {
            Ok(entries) => {
                let names: Vec<String> = entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect();
                tracing::debug!("files in {}: {:?}", dir.display(), names);
            }
            Err(e) => tracing::debug!("could not list {}: {}", dir.display(), e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::xgboost::tests::two_stump_document;

    /// Writes a consistent 2-feature artifact set into `dir`
    pub(crate) fn write_artifacts(dir: &Path) {
        std::fs::write(dir.join("features.txt"), "op_setting1\ns1\n").unwrap();
        std::fs::write(
            dir.join("scaler.json"),
            r#"{"kind": "standard", "mean": [0.0, 0.0], "scale": [1.0, 1.0]}"#,
        )
        .unwrap();
        std::fs::write(dir.join("xgboost_model.json"), two_stump_document().to_string()).unwrap();
    }

    fn config_for(dirs: Vec<PathBuf>) -> Config {
        Config {
            artifact_dirs: dirs,
            ..Config::default()
        }
    }

    #[test]
    fn test_locate_prefers_first_complete_dir() {
        let root = tempfile::tempdir().unwrap();
        let partial = root.path().join("partial");
        let models = root.path().join("models");
        std::fs::create_dir_all(&partial).unwrap();
        std::fs::create_dir_all(&models).unwrap();
        std::fs::write(partial.join("features.txt"), "s1\n").unwrap();
        write_artifacts(&models);

        let paths = locate(&config_for(vec![partial, models.clone()])).unwrap();
        assert_eq!(paths.model, models.join("xgboost_model.json"));
    }

    #[test]
    fn test_locate_not_found() {
        let root = tempfile::tempdir().unwrap();
        let err = locate(&config_for(vec![root.path().to_path_buf()])).unwrap_err();
        assert!(err.to_string().starts_with("Model artifacts not found"));
    }

    #[test]
    fn test_explicit_paths_skip_discovery() {
        let config = Config {
            model_path: Some(PathBuf::from("/a/m.json")),
            scaler_path: Some(PathBuf::from("/a/s.json")),
            features_path: Some(PathBuf::from("/a/f.txt")),
            ..config_for(vec![])
        };
        assert_eq!(locate(&config).unwrap().features, PathBuf::from("/a/f.txt"));
    }

    #[test]
    fn test_initialize_ready() {
        let root = tempfile::tempdir().unwrap();
        write_artifacts(root.path());

        let state = initialize(&config_for(vec![root.path().to_path_buf()]));
        let ctx = state.context().expect("should be ready");
        assert_eq!(ctx.schema.ordered(), ["op_setting1", "s1"]);
        assert_eq!(ctx.fingerprints.model_sha256.len(), 64);
    }

    #[test]
    fn test_scaler_width_mismatch_is_unready() {
        let root = tempfile::tempdir().unwrap();
        write_artifacts(root.path());
        std::fs::write(
            root.path().join("scaler.json"),
            r#"{"kind": "standard", "mean": [0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0]}"#,
        )
        .unwrap();

        let state = initialize(&config_for(vec![root.path().to_path_buf()]));
        match state {
            ServiceState::Unready { reason, paths } => {
                assert!(reason.contains("scaler expects 3 features"));
                assert!(paths.is_some());
            }
            ServiceState::Ready(_) => panic!("mismatched artifacts must not be ready"),
        }
    }

    #[test]
    fn test_empty_feature_list_is_unready() {
        let root = tempfile::tempdir().unwrap();
        write_artifacts(root.path());
        std::fs::write(root.path().join("features.txt"), "\n\n").unwrap();

        let err = load(
            &locate(&config_for(vec![root.path().to_path_buf()])).unwrap(),
            AliasRegistry::cmapss(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, LoadError::Schema(SchemaError::Empty)));
    }
}
