use std::path::{Path, PathBuf};

use crate::display::domain::display_sink::DisplaySink;
use crate::shared::frame::Frame;

/// Presents frames by writing them out as numbered PNGs.
///
/// Only every `every`-th enqueued frame is written. Write failures are
/// logged; the sink has no way to report them back.
pub struct ImageSequenceSink {
    dir: PathBuf,
    every: u64,
    enqueued: u64,
    written: u64,
}

impl ImageSequenceSink {
    pub fn new(dir: impl Into<PathBuf>, every: u64) -> Self {
        Self {
            dir: dir.into(),
            every: every.max(1),
            enqueued: 0,
            written: 0,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path_for(&self, frame: &Frame) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", frame.index()))
    }

    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.dir)?;
        let rgba = frame.pixel_format().to_rgba(frame.data());
        let img = image::RgbaImage::from_raw(frame.width(), frame.height(), rgba)
            .ok_or("Failed to create image from frame data")?;
        img.save(path)?;
        Ok(())
    }
}

impl DisplaySink for ImageSequenceSink {
    fn enqueue(&mut self, frame: Frame) {
        let due = self.enqueued % self.every == 0;
        self.enqueued += 1;
        if !due {
            return;
        }
        let path = self.path_for(&frame);
        match self.write(&path, &frame) {
            Ok(()) => self.written += 1,
            Err(e) => log::warn!("Failed to write {}: {e}", path.display()),
        }
    }
}
