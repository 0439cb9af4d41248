use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Per-frame facial landmark analysis with a running eye-blink count.
///
/// The analysis itself lives in an external library; this is the seam it
/// plugs into. Implementations are stateful across frames, hence `&mut self`.
pub trait FrameProcessor: Send {
    /// One-time setup before the first frame (model loading etc.).
    fn prepare(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Analyzes `frame` within the given face regions, in frame pixels.
    fn process(
        &mut self,
        frame: &Frame,
        regions: &[Region],
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Blinks counted so far. Meaningful after at least one `process`.
    fn current_blink_count(&self) -> u64;
}
