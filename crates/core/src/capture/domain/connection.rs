use serde::{Deserialize, Serialize};

/// Clockwise rotation applied between capture space and delivered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Half,
    Clockwise270,
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Clockwise90),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::Clockwise270),
            other => Err(format!("rotation must be 0, 90, 180 or 270, got {other}")),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Half => 180,
            Rotation::Clockwise270 => 270,
        }
    }
}

/// Geometry of the connection a frame was delivered on.
///
/// Metadata is reported in capture space; this is what it takes to map it
/// onto the pixels of a particular frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub rotation: Rotation,
    /// Horizontal flip applied after rotation (front cameras usually mirror).
    #[serde(default)]
    pub mirrored: bool,
}

impl Connection {
    pub fn new(rotation: Rotation, mirrored: bool) -> Self {
        Self { rotation, mirrored }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Rotation::None)]
    #[case(90, Rotation::Clockwise90)]
    #[case(180, Rotation::Half)]
    #[case(270, Rotation::Clockwise270)]
    fn test_rotation_from_degrees(#[case] degrees: u16, #[case] expected: Rotation) {
        assert_eq!(Rotation::try_from(degrees).unwrap(), expected);
        assert_eq!(u16::from(expected), degrees);
    }

    #[test]
    fn test_rotation_rejects_odd_angles() {
        assert!(Rotation::try_from(45).is_err());
    }

    #[test]
    fn test_connection_deserializes_degrees() {
        let c: Connection = serde_json::from_str(r#"{"rotation": 90, "mirrored": true}"#).unwrap();
        assert_eq!(c, Connection::new(Rotation::Clockwise90, true));
    }

    #[test]
    fn test_connection_defaults() {
        let c: Connection = serde_json::from_str("{}").unwrap();
        assert_eq!(c, Connection::default());
    }
}
