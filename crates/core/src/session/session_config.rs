use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::domain::capture_device::DevicePosition;
use crate::capture::domain::metadata_object::MetadataObjectType;
use crate::shared::constants::{APP_DIR_NAME, DEFAULT_FRAME_QUEUE_CAPACITY, SETTINGS_FILE_NAME};
use crate::shared::pixel_format::PixelFormat;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// What to do when the session refuses an input or output during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionPolicy {
    /// Skip the component and log at debug level.
    Ignore,
    /// Skip the component and log a warning.
    #[default]
    Warn,
    /// Abort opening the session.
    Fail,
}

impl std::str::FromStr for RejectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(RejectionPolicy::Ignore),
            "warn" => Ok(RejectionPolicy::Warn),
            "fail" => Ok(RejectionPolicy::Fail),
            other => Err(format!(
                "Rejection policy must be one of: ignore, warn, fail, got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub device_position: DevicePosition,
    pub pixel_format: PixelFormat,
    pub metadata_types: Vec<MetadataObjectType>,
    pub frame_queue_capacity: usize,
    pub rejection_policy: RejectionPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_position: DevicePosition::Front,
            pixel_format: PixelFormat::Bgra32,
            metadata_types: vec![MetadataObjectType::Face],
            frame_queue_capacity: DEFAULT_FRAME_QUEUE_CAPACITY,
            rejection_policy: RejectionPolicy::Warn,
        }
    }
}

impl SessionConfig {
    /// `<config_dir>/BlinkCam/session.json`
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Loads the user's config, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load() -> Self {
        let Ok(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config: {e}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "frame_queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_match_front_camera_face_detection() {
        let config = SessionConfig::default();
        assert_eq!(config.device_position, DevicePosition::Front);
        assert_eq!(config.pixel_format, PixelFormat::Bgra32);
        assert_eq!(config.metadata_types, vec![MetadataObjectType::Face]);
        assert_eq!(config.frame_queue_capacity, DEFAULT_FRAME_QUEUE_CAPACITY);
        assert_eq!(config.rejection_policy, RejectionPolicy::Warn);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let config = SessionConfig {
            device_position: DevicePosition::Back,
            pixel_format: PixelFormat::Rgb24,
            frame_queue_capacity: 3,
            rejection_policy: RejectionPolicy::Fail,
            ..SessionConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(SessionConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"pixel_format": "rgb24"}"#).unwrap();
        let config = SessionConfig::load_from(&path).unwrap();
        assert_eq!(config.pixel_format, PixelFormat::Rgb24);
        assert_eq!(config.device_position, DevicePosition::Front);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SessionConfig::load_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();
        let err = SessionConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_queue_capacity_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"frame_queue_capacity": 0}"#).unwrap();
        let err = SessionConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[rstest]
    #[case("ignore", RejectionPolicy::Ignore)]
    #[case("WARN", RejectionPolicy::Warn)]
    #[case("fail", RejectionPolicy::Fail)]
    fn test_rejection_policy_parse(#[case] input: &str, #[case] expected: RejectionPolicy) {
        assert_eq!(input.parse::<RejectionPolicy>().unwrap(), expected);
    }

    #[test]
    fn test_rejection_policy_parse_rejects_unknown() {
        assert!("crash".parse::<RejectionPolicy>().is_err());
    }
}
