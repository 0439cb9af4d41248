use crate::capture::domain::capture_device::CaptureDevice;
use crate::capture::domain::capture_session::CaptureSession;

/// Entry point into a platform capture stack.
pub trait CaptureFramework: Send {
    /// Video devices, in the platform's enumeration order.
    fn devices(&self) -> Vec<CaptureDevice>;

    fn new_session(&self) -> Box<dyn CaptureSession>;
}
