//! @ai:module:intent TOML configuration: style table overrides and scan settings
//! @ai:module:layer infrastructure
//! @ai:module:public_api Config, ScanConfig, DEFAULT_CONFIG_FILE
//! @ai:module:depends_on style, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::style::StyleTable;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "rinex-lens.toml";

/// @ai:intent Main configuration of the rinex-lens tools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub style: StyleTable,
    #[serde(default)]
    pub scan: ScanConfig,
}

/// @ai:intent Directory scan settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extra file extensions treated as observation files, without the dot
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl Config {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// @ai:intent Load an explicit config, else the default file if present, else built-in defaults
    /// @ai:effects fs:read
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    tracing::debug!("Using {}", fallback.display());
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_then_load_keeps_overrides() {
        let mut config = Config::default();
        config.style.rinex2.insert("C1".to_string(), "#123456".to_string());
        config.scan.extensions.push("dat".to_string());

        let file = NamedTempFile::new().unwrap();
        config.save(file.path()).unwrap();

        assert_eq!(Config::load(file.path()).unwrap(), config);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[scan]\nextensions = [\"obs2\"]").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.scan.extensions, vec!["obs2".to_string()]);
        assert_eq!(config.style, StyleTable::default());
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[style\nrinex2 = 3").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load_or_default(Some(Path::new("/nonexistent/rinex-lens.toml")));
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }
}
