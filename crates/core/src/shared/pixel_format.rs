use serde::{Deserialize, Serialize};

/// Pixel layout of frames delivered by the video-data output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 32-bit BGRA, the layout camera frameworks hand out natively.
    #[default]
    Bgra32,
    Rgb24,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> u8 {
        match self {
            PixelFormat::Bgra32 => 4,
            PixelFormat::Rgb24 => 3,
        }
    }

    /// Converts packed RGBA pixels into this format.
    pub fn from_rgba(self, rgba: &[u8]) -> Vec<u8> {
        match self {
            PixelFormat::Bgra32 => rgba
                .chunks_exact(4)
                .flat_map(|px| [px[2], px[1], px[0], px[3]])
                .collect(),
            PixelFormat::Rgb24 => rgba
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
        }
    }

    /// Converts pixels in this format into packed RGBA.
    pub fn to_rgba(self, data: &[u8]) -> Vec<u8> {
        match self {
            PixelFormat::Bgra32 => data
                .chunks_exact(4)
                .flat_map(|px| [px[2], px[1], px[0], px[3]])
                .collect(),
            PixelFormat::Rgb24 => data
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], u8::MAX])
                .collect(),
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Bgra32 => write!(f, "bgra32"),
            PixelFormat::Rgb24 => write!(f, "rgb24"),
        }
    }
}

impl std::str::FromStr for PixelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bgra32" | "bgra" => Ok(PixelFormat::Bgra32),
            "rgb24" | "rgb" => Ok(PixelFormat::Rgb24),
            other => Err(format!(
                "Pixel format must be 'bgra32' or 'rgb24', got '{other}'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bgra(PixelFormat::Bgra32, 4)]
    #[case::rgb(PixelFormat::Rgb24, 3)]
    fn test_bytes_per_pixel(#[case] format: PixelFormat, #[case] expected: u8) {
        assert_eq!(format.bytes_per_pixel(), expected);
    }

    #[test]
    fn test_from_rgba_swaps_red_and_blue_for_bgra() {
        let rgba = [10, 20, 30, 255, 40, 50, 60, 128];
        assert_eq!(
            PixelFormat::Bgra32.from_rgba(&rgba),
            vec![30, 20, 10, 255, 60, 50, 40, 128]
        );
    }

    #[test]
    fn test_from_rgba_drops_alpha_for_rgb() {
        let rgba = [10, 20, 30, 255];
        assert_eq!(PixelFormat::Rgb24.from_rgba(&rgba), vec![10, 20, 30]);
    }

    #[test]
    fn test_to_rgba_restores_bgra_pixels() {
        let rgba = [1, 2, 3, 4, 5, 6, 7, 8];
        let bgra = PixelFormat::Bgra32.from_rgba(&rgba);
        assert_eq!(PixelFormat::Bgra32.to_rgba(&bgra), rgba.to_vec());
    }

    #[test]
    fn test_to_rgba_fills_opaque_alpha_for_rgb() {
        assert_eq!(PixelFormat::Rgb24.to_rgba(&[9, 8, 7]), vec![9, 8, 7, 255]);
    }

    #[rstest]
    #[case("bgra32", PixelFormat::Bgra32)]
    #[case("BGRA", PixelFormat::Bgra32)]
    #[case("rgb24", PixelFormat::Rgb24)]
    fn test_parse(#[case] input: &str, #[case] expected: PixelFormat) {
        assert_eq!(input.parse::<PixelFormat>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("yuv420".parse::<PixelFormat>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&PixelFormat::Rgb24).unwrap();
        assert_eq!(json, "\"rgb24\"");
    }
}
