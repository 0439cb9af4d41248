use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::domain::capture_device::DevicePosition;
use crate::capture::domain::connection::Connection;
use crate::capture::domain::metadata_object::{MetadataObject, MetadataObjectType};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::region::NormalizedRect;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to list frames in {path}: {source}")]
    FramesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no image frames found in {0}")]
    NoFrames(PathBuf),
}

/// A recorded capture: a directory of frames plus the face detections that
/// accompanied them.
///
/// ```json
/// {
///   "device": { "name": "FaceTime HD", "position": "front" },
///   "fps": 30,
///   "frames_dir": "frames",
///   "rotation": 90,
///   "mirrored": true,
///   "metadata": [
///     { "at_frame": 0, "objects": [{ "x": 0.3, "y": 0.2, "width": 0.2, "height": 0.3, "face_id": 1 }] },
///     { "at_frame": 45, "objects": [] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayManifest {
    #[serde(default)]
    pub device: ReplayDevice,
    /// Playback rate; zero or less replays as fast as possible.
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Relative paths are resolved against the manifest's directory.
    pub frames_dir: PathBuf,
    #[serde(flatten)]
    pub connection: Connection,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayDevice {
    pub name: String,
    #[serde(default)]
    pub position: DevicePosition,
}

impl Default for ReplayDevice {
    fn default() -> Self {
        Self {
            name: "Replay Camera".to_string(),
            position: DevicePosition::Front,
        }
    }
}

/// A metadata delivery, due when frame `at_frame` is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub at_frame: u64,
    #[serde(default)]
    pub objects: Vec<ReplayObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayObject {
    #[serde(rename = "type", default = "default_object_type")]
    pub object_type: MetadataObjectType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub face_id: Option<u32>,
}

fn default_fps() -> f64 {
    30.0
}

fn default_object_type() -> MetadataObjectType {
    MetadataObjectType::Face
}

impl ReplayObject {
    pub fn to_metadata(&self, time: Duration) -> MetadataObject {
        MetadataObject {
            object_type: self.object_type,
            bounds: NormalizedRect::new(self.x, self.y, self.width, self.height),
            face_id: self.face_id,
            time,
        }
    }
}

impl ReplayManifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let json = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest: Self =
            serde_json::from_str(&json).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if manifest.frames_dir.is_relative() {
            if let Some(base) = path.parent() {
                manifest.frames_dir = base.join(&manifest.frames_dir);
            }
        }
        manifest.metadata.sort_by_key(|entry| entry.at_frame);
        Ok(manifest)
    }

    /// Image files in `frames_dir`, in name order.
    pub fn frame_paths(&self) -> Result<Vec<PathBuf>, ManifestError> {
        let entries = fs::read_dir(&self.frames_dir).map_err(|source| ManifestError::FramesDir {
            path: self.frames_dir.clone(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image(path))
            .collect();
        if paths.is_empty() {
            return Err(ManifestError::NoFrames(self.frames_dir.clone()));
        }
        paths.sort();
        Ok(paths)
    }

    /// When frame `index` is due relative to session start, or `None` when
    /// playback is unpaced.
    pub fn frame_time(&self, index: u64) -> Option<Duration> {
        (self.fps > 0.0).then(|| Duration::from_secs_f64(index as f64 / self.fps))
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
