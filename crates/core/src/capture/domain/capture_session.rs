use crate::capture::domain::capture_callbacks::CaptureCallbacks;
use crate::capture::domain::capture_device::CaptureDevice;
use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::capture_output::OutputKind;
use crate::capture::domain::metadata_object::MetadataObjectType;
use crate::shared::pixel_format::PixelFormat;

/// A configurable capture session.
///
/// Inputs and outputs are added between `begin_configuration` and
/// `commit_configuration`. Callers are expected to ask `can_add_*` first;
/// `add_*` on a rejected component returns an error.
pub trait CaptureSession: Send {
    fn begin_configuration(&mut self);

    fn can_add_input(&self, device: &CaptureDevice) -> bool;

    fn add_input(&mut self, device: &CaptureDevice) -> Result<(), CaptureError>;

    fn can_add_output(&self, kind: OutputKind) -> bool;

    fn add_output(&mut self, kind: OutputKind) -> Result<(), CaptureError>;

    fn commit_configuration(&mut self) -> Result<(), CaptureError>;

    fn has_output(&self, kind: OutputKind) -> bool;

    /// Pixel layout for the video-data output.
    fn set_pixel_format(&mut self, format: PixelFormat) -> Result<(), CaptureError>;

    /// Object types the metadata output can detect. Empty until a metadata
    /// output has been attached.
    fn available_metadata_types(&self) -> Vec<MetadataObjectType>;

    fn set_metadata_types(&mut self, types: &[MetadataObjectType]) -> Result<(), CaptureError>;

    /// Starts delivery. Frames and metadata arrive on the session's own
    /// queues through `callbacks`; the session drops them when it stops.
    fn start_running(&mut self, callbacks: CaptureCallbacks) -> Result<(), CaptureError>;

    fn stop_running(&mut self);

    fn is_running(&self) -> bool;
}
