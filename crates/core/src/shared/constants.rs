use std::time::Duration;

/// Frames buffered between the frame queue and the consolidation worker.
pub const DEFAULT_FRAME_QUEUE_CAPACITY: usize = 8;

/// Metadata is a latest-value handoff: one pending batch at most.
pub const METADATA_QUEUE_CAPACITY: usize = 1;

pub const SAMPLE_QUEUE_LABEL: &str = "blinkcam.sampleQueue";
pub const FACE_QUEUE_LABEL: &str = "blinkcam.faceQueue";
pub const CONSOLIDATION_THREAD_LABEL: &str = "blinkcam.consolidator";

/// Frames between heartbeat log lines from the consolidation worker.
pub const HEARTBEAT_FRAMES: u64 = 30;

/// Upper bound on a single pacing sleep in the replay source, so a stop
/// request is noticed promptly even at very low frame rates.
pub const MAX_PACING_SLEEP: Duration = Duration::from_millis(50);

/// Poll step for the lock-step handoff between replay queues when playback
/// is unpaced.
pub const UNPACED_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const APP_DIR_NAME: &str = "BlinkCam";
pub const SETTINGS_FILE_NAME: &str = "session.json";
