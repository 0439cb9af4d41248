use std::sync::Arc;
use std::time::Instant;

use crate::capture::domain::capture_callbacks::FrameEvent;
use crate::capture::domain::connection::Connection;
use crate::capture::domain::metadata_object::{empty_snapshot, MetadataSnapshot};
use crate::capture::domain::metadata_transform::faces_to_frame;
use crate::display::domain::display_sink::DisplaySink;
use crate::display::domain::readout_surface::ReadoutSurface;
use crate::processing::domain::frame_processor::FrameProcessor;
use crate::session::session_logger::SessionLogger;
use crate::session::shared_snapshot::SharedSnapshot;
use crate::shared::frame::Frame;
use crate::shared::session_stats::SessionStats;

/// Merges the two capture streams into calls on the frame processor.
///
/// Owned by the consolidation worker, which is the only writer of the held
/// metadata snapshot. Every frame ends up on the display sink; frames that
/// arrive while a non-empty snapshot is held are analyzed first.
pub struct FrameBridge {
    processor: Box<dyn FrameProcessor>,
    display: Box<dyn DisplaySink>,
    readout: Box<dyn ReadoutSurface>,
    logger: Box<dyn SessionLogger>,
    current: MetadataSnapshot,
    published: SharedSnapshot,
    stats: Arc<SessionStats>,
}

impl FrameBridge {
    pub fn new(
        processor: Box<dyn FrameProcessor>,
        display: Box<dyn DisplaySink>,
        readout: Box<dyn ReadoutSurface>,
        logger: Box<dyn SessionLogger>,
        published: SharedSnapshot,
        stats: Arc<SessionStats>,
    ) -> Self {
        Self {
            processor,
            display,
            readout,
            logger,
            current: empty_snapshot(),
            published,
            stats,
        }
    }

    pub fn handle(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::Delivered { frame, connection } => self.on_frame(frame, &connection),
            FrameEvent::Dropped { index, reason } => self.on_frame_dropped(index, &reason),
        }
    }

    /// Replaces the held snapshot. No merging with the previous batch.
    pub fn on_metadata(&mut self, batch: MetadataSnapshot) {
        self.stats.record_metadata();
        self.logger.metric("objects_per_batch", batch.len() as f64);
        match (self.current.is_empty(), batch.is_empty()) {
            (true, false) => self.logger.info("Faces in view; analyzing frames"),
            (false, true) => self.logger.info("Faces lost; frames are displayed only"),
            _ => {}
        }
        self.published.store(batch.clone());
        self.current = batch;
    }

    pub fn on_frame(&mut self, frame: Frame, connection: &Connection) {
        self.stats.record_delivered();
        self.logger.frame(frame.index());

        if !self.current.is_empty() {
            self.analyze(&frame, connection);
        }

        self.display.enqueue(frame);
        self.stats.record_displayed();
    }

    pub fn on_frame_dropped(&mut self, index: u64, reason: &str) {
        let total = self.stats.record_dropped();
        log::info!("Capture dropped frame #{index}: {reason} (dropped total: {total})");
    }

    pub fn current_metadata(&self) -> &MetadataSnapshot {
        &self.current
    }

    pub fn summary(&self) {
        self.logger.summary();
    }

    fn analyze(&mut self, frame: &Frame, connection: &Connection) {
        let regions = faces_to_frame(&self.current, connection, frame.width(), frame.height());

        let start = Instant::now();
        let result = self.processor.process(frame, &regions);
        self.logger
            .timing("process", start.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(()) => {
                let count = self.processor.current_blink_count();
                self.stats.record_processed(count);
                self.readout.set_text(&count.to_string());
            }
            Err(e) => {
                self.stats.record_processor_error();
                log::warn!("Frame processor failed on frame #{}: {e}", frame.index());
            }
        }
    }
}
