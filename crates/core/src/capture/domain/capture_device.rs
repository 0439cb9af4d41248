use serde::{Deserialize, Serialize};

/// Which way a camera faces relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    #[default]
    Front,
    Back,
    Unspecified,
}

impl std::fmt::Display for DevicePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DevicePosition::Front => write!(f, "front"),
            DevicePosition::Back => write!(f, "back"),
            DevicePosition::Unspecified => write!(f, "unspecified"),
        }
    }
}

impl std::str::FromStr for DevicePosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" => Ok(DevicePosition::Front),
            "back" => Ok(DevicePosition::Back),
            "unspecified" => Ok(DevicePosition::Unspecified),
            other => Err(format!(
                "Device position must be one of: front, back, unspecified, got '{other}'"
            )),
        }
    }
}

/// A video capture device as reported by device enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevice {
    pub id: String,
    pub name: String,
    pub position: DevicePosition,
}

impl CaptureDevice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: DevicePosition) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
        }
    }

    /// First device facing `position`, in enumeration order.
    pub fn select(devices: &[CaptureDevice], position: DevicePosition) -> Option<&CaptureDevice> {
        devices.iter().find(|d| d.position == position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<CaptureDevice> {
        vec![
            CaptureDevice::new("0", "Back Wide", DevicePosition::Back),
            CaptureDevice::new("1", "FaceTime", DevicePosition::Front),
            CaptureDevice::new("2", "FaceTime Secondary", DevicePosition::Front),
        ]
    }

    #[test]
    fn test_select_returns_first_matching_position() {
        let devices = devices();
        let selected = CaptureDevice::select(&devices, DevicePosition::Front).unwrap();
        assert_eq!(selected.id, "1");
    }

    #[test]
    fn test_select_none_when_position_missing() {
        let devices = devices();
        assert!(CaptureDevice::select(&devices, DevicePosition::Unspecified).is_none());
    }

    #[test]
    fn test_select_empty_list() {
        assert!(CaptureDevice::select(&[], DevicePosition::Front).is_none());
    }

    #[test]
    fn test_position_parse_roundtrip() {
        for position in [DevicePosition::Front, DevicePosition::Back] {
            let parsed: DevicePosition = position.to_string().parse().unwrap();
            assert_eq!(parsed, position);
        }
        assert!("left".parse::<DevicePosition>().is_err());
    }
}
