//! Player configuration loaded from ~/.qust/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::midi::MidiConfig;
use crate::render::LayoutConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QustConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl QustConfig {
    /// Standard location, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qust").join("config.yaml"))
    }

    /// Load config from the standard path.
    /// Returns None if the file doesn't exist or doesn't parse.
    pub fn load() -> Option<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path).ok()
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CellSizing;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config: QustConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, QustConfig::default());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "midi:\n  device: pd\nlayout:\n  sizing: exact\n  frame_width: 2"
        )
        .unwrap();
        let config = QustConfig::load_from(file.path()).unwrap();
        assert_eq!(config.midi.device.as_deref(), Some("pd"));
        assert_eq!(config.midi.resolve_device("pd"), "Pure Data");
        assert_eq!(config.layout.sizing, CellSizing::Exact);
        assert_eq!(config.layout.frame_width, 2);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = QustConfig::load_from(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn bad_yaml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "layout:\n  sizing: sideways").unwrap();
        let err = QustConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_does_not_panic() {
        let _ = QustConfig::load();
    }
}
