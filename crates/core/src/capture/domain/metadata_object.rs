use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::region::NormalizedRect;

/// Kinds of objects a metadata output can be asked to detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataObjectType {
    Face,
    HumanBody,
    Barcode,
}

impl MetadataObjectType {
    pub const ALL: &[MetadataObjectType] = &[
        MetadataObjectType::Face,
        MetadataObjectType::HumanBody,
        MetadataObjectType::Barcode,
    ];
}

impl std::fmt::Display for MetadataObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataObjectType::Face => write!(f, "face"),
            MetadataObjectType::HumanBody => write!(f, "human_body"),
            MetadataObjectType::Barcode => write!(f, "barcode"),
        }
    }
}

/// A detected region of interest, in normalized capture-space coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataObject {
    pub object_type: MetadataObjectType,
    pub bounds: NormalizedRect,
    pub face_id: Option<u32>,
    pub time: Duration,
}

impl MetadataObject {
    pub fn face(bounds: NormalizedRect, face_id: Option<u32>) -> Self {
        Self {
            object_type: MetadataObjectType::Face,
            bounds,
            face_id,
            time: Duration::ZERO,
        }
    }

    pub fn is_face(&self) -> bool {
        self.object_type == MetadataObjectType::Face
    }
}

/// One metadata delivery, shared immutably between the worker and readers.
pub type MetadataSnapshot = Arc<[MetadataObject]>;

pub fn empty_snapshot() -> MetadataSnapshot {
    Arc::from(Vec::new())
}
