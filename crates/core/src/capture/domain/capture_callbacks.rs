//! Delivery channels between the capture queues and the consolidation worker.
//!
//! The frame queue and the metadata queue each get a sender. Frames go over a
//! bounded channel and are dropped when it is full. Metadata goes over a
//! single-slot channel where a newer batch overwrites a pending one, so the
//! worker only ever sees the latest detection.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::capture::domain::connection::Connection;
use crate::capture::domain::metadata_object::{MetadataObject, MetadataSnapshot};
use crate::shared::constants::METADATA_QUEUE_CAPACITY;
use crate::shared::frame::Frame;
use crate::shared::session_stats::SessionStats;

/// Events emitted by the frame queue.
#[derive(Debug)]
pub enum FrameEvent {
    Delivered { frame: Frame, connection: Connection },
    /// The capture framework discarded a frame before delivery.
    Dropped { index: u64, reason: String },
}

/// Frame-queue side of the delivery channels.
#[derive(Clone)]
pub struct FrameCallbackSender {
    tx: Sender<FrameEvent>,
    stats: Arc<SessionStats>,
}

impl FrameCallbackSender {
    /// Hands a frame to the worker without blocking the capture queue.
    ///
    /// Returns `false` if the frame was dropped, either because the worker
    /// is behind or because it has gone away.
    pub fn deliver(&self, frame: Frame, connection: Connection) -> bool {
        let index = frame.index();
        match self.tx.try_send(FrameEvent::Delivered { frame, connection }) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let total = self.stats.record_dropped();
                log::debug!(
                    "Dropping frame #{index} (consolidation backlog, dropped total: {total})"
                );
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Forwards a drop notice from the capture framework.
    pub fn dropped(&self, index: u64, reason: impl Into<String>) {
        let event = FrameEvent::Dropped {
            index,
            reason: reason.into(),
        };
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            let total = self.stats.record_dropped();
            log::info!("Frame #{index} dropped while frame queue was full (dropped total: {total})");
        }
    }
}

/// Metadata-queue side of the delivery channels.
#[derive(Clone)]
pub struct MetadataCallbackSender {
    tx: Sender<MetadataSnapshot>,
    /// Used only to evict a stale pending batch.
    evict: Receiver<MetadataSnapshot>,
    stats: Arc<SessionStats>,
}

impl MetadataCallbackSender {
    /// Publishes a batch, replacing any batch the worker has not taken yet.
    pub fn deliver(&self, objects: Vec<MetadataObject>) {
        let mut batch: MetadataSnapshot = objects.into();
        loop {
            match self.tx.try_send(batch) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if self.evict.try_recv().is_ok() {
                        self.stats.record_superseded();
                    }
                    batch = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Frames the worker has taken in, plus frames dropped on the way.
    pub fn frames_settled(&self) -> u64 {
        let stats = self.stats.snapshot();
        stats.frames_delivered + stats.frames_dropped
    }
}

/// The pair of senders handed to a capture session when it starts.
#[derive(Clone)]
pub struct CaptureCallbacks {
    pub frames: FrameCallbackSender,
    pub metadata: MetadataCallbackSender,
}

/// Worker side of the delivery channels.
pub struct CallbackReceivers {
    pub frames: Receiver<FrameEvent>,
    pub metadata: Receiver<MetadataSnapshot>,
}

pub fn callback_channels(
    frame_capacity: usize,
    stats: Arc<SessionStats>,
) -> (CaptureCallbacks, CallbackReceivers) {
    let (frame_tx, frame_rx) = crossbeam_channel::bounded(frame_capacity.max(1));
    let (meta_tx, meta_rx) = crossbeam_channel::bounded(METADATA_QUEUE_CAPACITY);

    let callbacks = CaptureCallbacks {
        frames: FrameCallbackSender {
            tx: frame_tx,
            stats: stats.clone(),
        },
        metadata: MetadataCallbackSender {
            tx: meta_tx,
            evict: meta_rx.clone(),
            stats,
        },
    };
    let receivers = CallbackReceivers {
        frames: frame_rx,
        metadata: meta_rx,
    };
    (callbacks, receivers)
}
