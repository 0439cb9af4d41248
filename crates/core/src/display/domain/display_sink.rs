use crate::shared::frame::Frame;

/// Presents frames. Takes ownership; nothing is acknowledged back.
pub trait DisplaySink: Send {
    fn enqueue(&mut self, frame: Frame);
}
