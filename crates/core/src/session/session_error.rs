use thiserror::Error;

use crate::capture::domain::capture_device::DevicePosition;
use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::capture_output::OutputKind;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no {0}-facing capture device found")]
    DeviceNotFound(DevicePosition),
    #[error("session rejected input device {0}")]
    InputRejected(String),
    #[error("session rejected {0} output")]
    OutputRejected(OutputKind),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("frame processor failed to prepare: {0}")]
    Prepare(String),
    #[error("failed to spawn consolidation worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("consolidation worker panicked")]
    WorkerPanicked,
}
