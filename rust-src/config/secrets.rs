//! Warehouse credentials loaded from a TOML secrets file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::settings::{get_secrets_path, DEFAULT_DATABASE, DEFAULT_SCHEMA};


#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("no secrets file found (looked in: {searched})")]
    NotFound { searched: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid secrets file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}


#[derive(Debug, Clone, Deserialize)]
pub struct Secrets {
    pub warehouse: WarehouseConfig,
}


/// Connection settings for the warehouse session.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WarehouseConfig {
    /// Database file backing the warehouse.
    pub path: PathBuf,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_schema")]
    pub schema: String,
}


fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}


impl WarehouseConfig {
    /// Config for a local warehouse file with default namespace.
    #[allow(dead_code)]
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            account: None,
            user: None,
            database: default_database(),
            schema: default_schema(),
        }
    }

    /// Human-readable session label, e.g. `analyst@ca-hcai`.
    pub fn label(&self) -> String {
        match (&self.user, &self.account) {
            (Some(u), Some(a)) => format!("{u}@{a}"),
            (None, Some(a)) => a.clone(),
            (Some(u), None) => u.clone(),
            (None, None) => self.path.display().to_string(),
        }
    }
}


/// Parse a secrets file.
pub fn load_secrets_file(path: &Path) -> Result<Secrets, SecretsError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SecretsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_secrets(&contents, path)
}


fn parse_secrets(contents: &str, path: &Path) -> Result<Secrets, SecretsError> {
    let mut secrets: Secrets = toml::from_str(contents).map_err(|source| SecretsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    // Relative warehouse paths are relative to the secrets file
    if secrets.warehouse.path.is_relative() {
        if let Some(dir) = path.parent() {
            secrets.warehouse.path = dir.join(&secrets.warehouse.path);
        }
    }

    Ok(secrets)
}


/// Candidate secrets locations in search order.
pub fn secrets_search_path(explicit: Option<&Path>) -> Vec<PathBuf> {
    match explicit {
        Some(p) => vec![p.to_path_buf()],
        None => vec![PathBuf::from("secrets.toml"), get_secrets_path()],
    }
}


/// Find and load the first secrets file on the search path.
pub fn load_secrets(explicit: Option<&Path>) -> Result<Secrets, SecretsError> {
    let candidates = secrets_search_path(explicit);

    for candidate in &candidates {
        if candidate.is_file() {
            tracing::info!(path = %candidate.display(), "loading secrets");
            return load_secrets_file(candidate);
        }
    }

    Err(SecretsError::NotFound {
        searched: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_applied() {
        let secrets = parse_secrets(
            "[warehouse]\npath = \"/data/warehouse.db\"\n",
            Path::new("/etc/hpm/secrets.toml"),
        )
        .unwrap();
        assert_eq!(secrets.warehouse, WarehouseConfig::local("/data/warehouse.db"));
    }

    #[test]
    fn test_relative_path_resolved_against_file() {
        let secrets = parse_secrets(
            "[warehouse]\npath = \"warehouse.db\"\naccount = \"ca-hcai\"\nuser = \"analyst\"\n",
            Path::new("/etc/hpm/secrets.toml"),
        )
        .unwrap();
        assert_eq!(secrets.warehouse.path, PathBuf::from("/etc/hpm/warehouse.db"));
        assert_eq!(secrets.warehouse.label(), "analyst@ca-hcai");
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let err = parse_secrets("[other]\nx = 1\n", Path::new("s.toml")).unwrap_err();
        assert!(matches!(err, SecretsError::Parse { .. }));
    }

    #[test]
    fn test_explicit_missing_file_not_found() {
        let tmp_dir = TempDir::new().unwrap();
        let missing = tmp_dir.path().join("nope.toml");
        let err = load_secrets(Some(&missing)).unwrap_err();
        assert!(matches!(err, SecretsError::NotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("secrets.toml");
        std::fs::write(&path, "[warehouse]\npath = \"wh.db\"\nschema = \"REPORTING\"\n").unwrap();

        let secrets = load_secrets(Some(&path)).unwrap();
        assert_eq!(secrets.warehouse.schema, "REPORTING");
        assert_eq!(secrets.warehouse.path, tmp_dir.path().join("wh.db"));
    }
}
