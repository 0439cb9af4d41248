use ndarray::s;

use crate::processing::domain::frame_processor::FrameProcessor;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Stand-in for the external landmark library.
///
/// Logs what it would analyze, with the mean brightness of each face
/// region, and keeps simple tallies. It never detects a blink, so its count
/// stays at zero.
#[derive(Default)]
pub struct LoggingFrameProcessor {
    prepared: bool,
    frames: u64,
    regions: u64,
    last_brightness: Vec<f64>,
}

impl LoggingFrameProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn regions(&self) -> u64 {
        self.regions
    }

    /// Mean brightness (0-255) of each non-empty region in the last frame.
    pub fn last_brightness(&self) -> &[f64] {
        &self.last_brightness
    }
}

fn mean_brightness(frame: &Frame, region: &Region) -> Option<f64> {
    let r = region.clamp_to(frame.width(), frame.height());
    if r.is_empty() {
        return None;
    }
    let (x, y) = (r.x as usize, r.y as usize);
    let (w, h) = (r.width as usize, r.height as usize);
    // Colour channels only; BGR and RGB average the same.
    let view = frame.as_ndarray();
    let patch = view.slice(s![y..y + h, x..x + w, 0..3]);
    let sum: f64 = patch.iter().map(|&v| v as f64).sum();
    Some(sum / patch.len() as f64)
}

impl FrameProcessor for LoggingFrameProcessor {
    fn prepare(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.prepared = true;
        log::debug!("Frame processor ready");
        Ok(())
    }

    fn process(
        &mut self,
        frame: &Frame,
        regions: &[Region],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !self.prepared {
            return Err("process called before prepare".into());
        }
        self.frames += 1;
        self.regions += regions.len() as u64;
        self.last_brightness = regions
            .iter()
            .filter_map(|r| mean_brightness(frame, r))
            .collect();
        log::debug!(
            "Frame #{} at {:?} ({}x{}): {} face region(s) {:?}, brightness {:.0?}",
            frame.index(),
            frame.timestamp(),
            frame.width(),
            frame.height(),
            regions.len(),
            regions,
            self.last_brightness
        );
        Ok(())
    }

    fn current_blink_count(&self) -> u64 {
        0
    }
}
