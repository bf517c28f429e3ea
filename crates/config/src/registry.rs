// Estate connection registry
//
// Each estate runs its own Firebird database behind `isql`. The
// registry maps short estate names to connection settings so the CLI
// can fetch scan extracts without credentials on the command line.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Connection settings for one estate database.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Estate {
    /// Database path or alias as `isql` expects it, e.g.
    /// `192.168.1.7:/data/ffb.fdb`.
    pub database: String,
    #[serde(default = "default_user")]
    pub user: String,
    pub password: String,
    /// Connection character set. The scanner terminals write
    /// Windows-1252 names, so that is the default.
    #[serde(default = "default_charset")]
    pub charset: String,
}

fn default_user() -> String {
    "SYSDBA".to_string()
}

fn default_charset() -> String {
    "WIN1252".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EstateRegistry {
    pub estates: BTreeMap<String, Estate>,
}

#[derive(Debug)]
pub enum RegistryError {
    Io(String),
    Parse(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "estate registry: {msg}"),
            Self::Parse(msg) => write!(f, "estate registry: {msg}"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl EstateRegistry {
    /// Get the registry file path.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ffbaudit");
        config_dir.join("estates.toml")
    }

    /// Load the registry from the default location. A missing file is
    /// an empty registry, not an error; a malformed file is an error.
    pub fn load() -> Result<Self, RegistryError> {
        Self::load_or_default(&Self::config_path())
    }

    pub fn load_or_default(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self, RegistryError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| RegistryError::Io(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&contents).map_err(|e| RegistryError::Parse(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Estate> {
        self.estates.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.estates.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.estates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REGISTRY: &str = r#"
[estates.sungai-lala]
database = "192.168.1.7:/data/ffb.fdb"
password = "masterkey"

[estates.teluk-bakau]
database = "192.168.2.7:/data/ffb.fdb"
user = "AUDITOR"
password = "s3cret"
charset = "UTF8"
"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_estates_with_defaults() {
        let file = write_temp(REGISTRY);
        let registry = EstateRegistry::load_from(file.path()).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["sungai-lala", "teluk-bakau"]);

        let lala = registry.get("sungai-lala").unwrap();
        assert_eq!(lala.user, "SYSDBA");
        assert_eq!(lala.charset, "WIN1252");

        let bakau = registry.get("teluk-bakau").unwrap();
        assert_eq!(bakau.user, "AUDITOR");
        assert_eq!(bakau.charset, "UTF8");
    }

    #[test]
    fn unknown_estate_is_none() {
        let file = write_temp(REGISTRY);
        let registry = EstateRegistry::load_from(file.path()).unwrap();
        assert!(registry.get("pulau-burung").is_none());
    }

    #[test]
    fn missing_file_is_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = EstateRegistry::load_or_default(&dir.path().join("estates.toml")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_file_is_empty_registry() {
        let file = write_temp("");
        let registry = EstateRegistry::load_from(file.path()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_temp("[estates.broken]\ndatabase = 12\n");
        let err = EstateRegistry::load_from(file.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
    }
}
