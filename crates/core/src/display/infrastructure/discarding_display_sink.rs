use crate::display::domain::display_sink::DisplaySink;
use crate::shared::frame::Frame;

/// Drops frames on arrival, keeping only a count.
#[derive(Default)]
pub struct DiscardingDisplaySink {
    frames: u64,
}

impl DiscardingDisplaySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl DisplaySink for DiscardingDisplaySink {
    fn enqueue(&mut self, frame: Frame) {
        self.frames += 1;
        log::trace!("Discarded frame #{}", frame.index());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::pixel_format::PixelFormat;
    use std::time::Duration;

    #[test]
    fn test_counts_frames() {
        let mut sink = DiscardingDisplaySink::new();
        for i in 0..3 {
            sink.enqueue(Frame::new(vec![0; 3], 1, 1, PixelFormat::Rgb24, i, Duration::ZERO));
        }
        assert_eq!(sink.frames(), 3);
    }
}
