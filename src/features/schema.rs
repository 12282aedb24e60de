//! Feature Schema - ordered model inputs
//!
//! The order here MUST match the order the scaler and model were fit with.
//! Loaded once at startup, read-only afterwards.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Schema could not be obtained; fatal at startup
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("feature list unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("feature list is empty")]
    Empty,

    #[error("duplicate feature identifier '{0}'")]
    Duplicate(String),
}

/// Ordered canonical feature identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    features: Vec<String>,
}

impl FeatureSchema {
    pub fn new<S: Into<String>>(features: impl IntoIterator<Item = S>) -> Result<Self, SchemaError> {
        let features: Vec<String> = features.into_iter().map(Into::into).collect();

        if features.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(features.len());
        for feature in &features {
            if !seen.insert(feature.as_str()) {
                return Err(SchemaError::Duplicate(feature.clone()));
            }
        }

        Ok(Self { features })
    }

    /// One identifier per line; surrounding whitespace and blank lines are dropped
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        Self::new(text.lines().map(str::trim).filter(|line| !line.is_empty()))
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn ordered(&self) -> &[String] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_blank_lines() {
        let schema = FeatureSchema::parse("op_setting1\n\n  s2  \r\ns3\n").unwrap();
        assert_eq!(schema.ordered(), ["op_setting1", "s2", "s3"]);
    }

    #[test]
    fn test_empty_is_rejected() {
        assert!(matches!(FeatureSchema::parse("\n  \n"), Err(SchemaError::Empty)));
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let err = FeatureSchema::parse("s1\ns2\ns1\n").unwrap_err();
        assert!(matches!(err, SchemaError::Duplicate(ref id) if id == "s1"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s2\ns3\ns4").unwrap();

        let schema = FeatureSchema::load(file.path()).unwrap();
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = FeatureSchema::load(&dir.path().join("features.txt")).unwrap_err();
        assert!(matches!(err, SchemaError::Unavailable { .. }));
    }
}
