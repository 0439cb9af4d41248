use std::time::Duration;

use ndarray::ArrayView3;

use crate::shared::pixel_format::PixelFormat;

/// A single captured frame: contiguous pixels in row-major order.
///
/// Frames are handed through the session by value. The coordinator gives
/// ownership to the display sink once processing is done and keeps nothing.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    index: u64,
    timestamp: Duration,
}

impl Frame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        index: u64,
        timestamp: Duration,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (pixel_format.bytes_per_pixel() as usize),
            "data length must equal width * height * bytes per pixel"
        );
        Self {
            data,
            width,
            height,
            pixel_format,
            index,
            timestamp,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Presentation time relative to the start of the capture session.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("frame buffer length is checked against its dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.pixel_format.bytes_per_pixel() as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_carries_capture_position() {
        let frame = Frame::new(
            vec![0u8; 4 * 6],
            3,
            2,
            PixelFormat::Bgra32,
            41,
            Duration::from_millis(1366),
        );
        assert_eq!((frame.width(), frame.height()), (3, 2));
        assert_eq!(frame.index(), 41);
        assert_eq!(frame.timestamp(), Duration::from_millis(1366));
        assert_eq!(frame.data().len(), 24);
    }

    #[rstest]
    #[case::bgra(PixelFormat::Bgra32, [2, 5, 4])]
    #[case::rgb(PixelFormat::Rgb24, [2, 5, 3])]
    fn test_view_shape_is_rows_cols_channels(
        #[case] format: PixelFormat,
        #[case] shape: [usize; 3],
    ) {
        let len = shape.iter().product();
        let frame = Frame::new(vec![0u8; len], 5, 2, format, 0, Duration::ZERO);
        assert_eq!(frame.as_ndarray().shape(), &shape);
    }

    #[test]
    fn test_view_indexes_row_major_pixels() {
        // Second row, first pixel, green channel.
        let mut data = vec![0u8; 2 * 2 * 3];
        data[6 + 1] = 77;
        let frame = Frame::new(data, 2, 2, PixelFormat::Rgb24, 0, Duration::ZERO);
        assert_eq!(frame.as_ndarray()[[1, 0, 1]], 77);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "data length must equal width * height * bytes per pixel")]
    fn test_rejects_buffer_sized_for_another_format() {
        Frame::new(vec![0u8; 12], 2, 2, PixelFormat::Bgra32, 0, Duration::ZERO);
    }
}
