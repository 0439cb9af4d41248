use thiserror::Error;

use crate::capture::domain::capture_output::OutputKind;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("session is not inside begin/commit configuration")]
    NotConfiguring,
    #[error("device {0} cannot be added as an input")]
    InputUnavailable(String),
    #[error("{0} output cannot be added")]
    OutputUnavailable(OutputKind),
    #[error("{0} output is not attached to the session")]
    OutputNotAttached(OutputKind),
    #[error("capture source unavailable: {0}")]
    Source(String),
    #[error("session is already running")]
    AlreadyRunning,
    #[error("failed to spawn {label} thread: {source}")]
    Spawn {
        label: &'static str,
        #[source]
        source: std::io::Error,
    },
}
