//! Test doubles for the session ports.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::capture::domain::capture_callbacks::CaptureCallbacks;
use crate::capture::domain::capture_device::{CaptureDevice, DevicePosition};
use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::capture_framework::CaptureFramework;
use crate::capture::domain::capture_output::OutputKind;
use crate::capture::domain::capture_session::CaptureSession;
use crate::capture::domain::metadata_object::{MetadataObject, MetadataObjectType, MetadataSnapshot};
use crate::display::domain::display_sink::DisplaySink;
use crate::display::domain::readout_surface::ReadoutSurface;
use crate::processing::domain::frame_processor::FrameProcessor;
use crate::shared::frame::Frame;
use crate::shared::pixel_format::PixelFormat;
use crate::shared::region::{NormalizedRect, Region};

pub fn make_frame(index: u64, width: u32, height: u32) -> Frame {
    Frame::new(
        vec![0u8; (width * height * 4) as usize],
        width,
        height,
        PixelFormat::Bgra32,
        index,
        Duration::from_millis(index * 33),
    )
}

/// `(face_id, x, y, width, height)` in normalized coordinates.
pub fn face_batch(faces: &[(u32, f64, f64, f64, f64)]) -> MetadataSnapshot {
    faces
        .iter()
        .map(|&(id, x, y, w, h)| MetadataObject::face(NormalizedRect::new(x, y, w, h), Some(id)))
        .collect::<Vec<_>>()
        .into()
}

// --- Frame processor ---

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessCall {
    pub index: u64,
    pub regions: Vec<Region>,
}

/// Records every `process` call; the blink count is the number of calls.
#[derive(Clone, Default)]
pub struct RecordingProcessor {
    calls: Arc<Mutex<Vec<ProcessCall>>>,
    prepared: Arc<Mutex<usize>>,
    fail_prepare: bool,
    fail_process: bool,
}

impl RecordingProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_prepare() -> Self {
        Self {
            fail_prepare: true,
            ..Self::default()
        }
    }

    pub fn failing_process() -> Self {
        Self {
            fail_process: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prepare_count(&self) -> usize {
        *self.prepared.lock().unwrap()
    }
}

impl FrameProcessor for RecordingProcessor {
    fn prepare(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail_prepare {
            return Err("model missing".into());
        }
        *self.prepared.lock().unwrap() += 1;
        Ok(())
    }

    fn process(
        &mut self,
        frame: &Frame,
        regions: &[Region],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail_process {
            return Err("landmarks unavailable".into());
        }
        self.calls.lock().unwrap().push(ProcessCall {
            index: frame.index(),
            regions: regions.to_vec(),
        });
        Ok(())
    }

    fn current_blink_count(&self) -> u64 {
        self.calls.lock().unwrap().len() as u64
    }
}

// --- Display and readout ---

/// Forwards displayed frames to a channel the test can wait on.
pub struct ChannelDisplay {
    tx: Sender<Frame>,
}

impl ChannelDisplay {
    pub fn new() -> (Self, Receiver<Frame>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl DisplaySink for ChannelDisplay {
    fn enqueue(&mut self, frame: Frame) {
        let _ = self.tx.send(frame);
    }
}

#[derive(Clone, Default)]
pub struct RecordingReadout {
    texts: Arc<Mutex<Vec<String>>>,
}

impl RecordingReadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl ReadoutSurface for RecordingReadout {
    fn set_text(&mut self, text: &str) {
        self.texts.lock().unwrap().push(text.to_string());
    }
}

// --- Capture framework ---

/// Which components the scripted session refuses.
#[derive(Clone, Copy, Default)]
pub struct Rejections {
    pub input: bool,
    pub video_output: bool,
    pub metadata_output: bool,
}

/// Shared view into what a scripted session was asked to do, plus the
/// callbacks it was started with so tests can play the capture queues.
#[derive(Clone, Default)]
pub struct SessionProbe {
    calls: Arc<Mutex<Vec<String>>>,
    callbacks: Arc<Mutex<Option<CaptureCallbacks>>>,
    pixel_format: Arc<Mutex<Option<PixelFormat>>>,
    metadata_types: Arc<Mutex<Option<Vec<MetadataObjectType>>>>,
}

impl SessionProbe {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Takes the delivery callbacks. Dropping them ends the stream.
    pub fn take_callbacks(&self) -> Option<CaptureCallbacks> {
        self.callbacks.lock().unwrap().take()
    }

    pub fn pixel_format(&self) -> Option<PixelFormat> {
        *self.pixel_format.lock().unwrap()
    }

    pub fn metadata_types(&self) -> Option<Vec<MetadataObjectType>> {
        self.metadata_types.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

pub struct ScriptedFramework {
    devices: Vec<CaptureDevice>,
    rejections: Rejections,
    available_types: Vec<MetadataObjectType>,
    fail_start: bool,
    probe: SessionProbe,
}

impl ScriptedFramework {
    pub fn new(devices: Vec<CaptureDevice>) -> Self {
        Self {
            devices,
            rejections: Rejections::default(),
            available_types: vec![MetadataObjectType::Face],
            fail_start: false,
            probe: SessionProbe::default(),
        }
    }

    pub fn with_front_camera() -> Self {
        Self::new(vec![
            CaptureDevice::new("back", "Back Camera", DevicePosition::Back),
            CaptureDevice::new("front", "Front Camera", DevicePosition::Front),
        ])
    }

    pub fn rejecting(mut self, rejections: Rejections) -> Self {
        self.rejections = rejections;
        self
    }

    pub fn offering(mut self, types: Vec<MetadataObjectType>) -> Self {
        self.available_types = types;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn probe(&self) -> SessionProbe {
        self.probe.clone()
    }
}

impl CaptureFramework for ScriptedFramework {
    fn devices(&self) -> Vec<CaptureDevice> {
        self.devices.clone()
    }

    fn new_session(&self) -> Box<dyn CaptureSession> {
        Box::new(ScriptedSession {
            rejections: self.rejections,
            available_types: self.available_types.clone(),
            fail_start: self.fail_start,
            outputs: Vec::new(),
            running: false,
            probe: self.probe.clone(),
        })
    }
}

struct ScriptedSession {
    rejections: Rejections,
    available_types: Vec<MetadataObjectType>,
    fail_start: bool,
    outputs: Vec<OutputKind>,
    running: bool,
    probe: SessionProbe,
}

impl CaptureSession for ScriptedSession {
    fn begin_configuration(&mut self) {
        self.probe.record("begin");
    }

    fn can_add_input(&self, _device: &CaptureDevice) -> bool {
        !self.rejections.input
    }

    fn add_input(&mut self, device: &CaptureDevice) -> Result<(), CaptureError> {
        self.probe.record(format!("input:{}", device.id));
        Ok(())
    }

    fn can_add_output(&self, kind: OutputKind) -> bool {
        match kind {
            OutputKind::VideoData => !self.rejections.video_output,
            OutputKind::Metadata => !self.rejections.metadata_output,
        }
    }

    fn add_output(&mut self, kind: OutputKind) -> Result<(), CaptureError> {
        self.probe.record(format!("output:{kind}"));
        self.outputs.push(kind);
        Ok(())
    }

    fn commit_configuration(&mut self) -> Result<(), CaptureError> {
        self.probe.record("commit");
        Ok(())
    }

    fn has_output(&self, kind: OutputKind) -> bool {
        self.outputs.contains(&kind)
    }

    fn set_pixel_format(&mut self, format: PixelFormat) -> Result<(), CaptureError> {
        self.probe.record("pixel_format");
        *self.probe.pixel_format.lock().unwrap() = Some(format);
        Ok(())
    }

    fn available_metadata_types(&self) -> Vec<MetadataObjectType> {
        if self.has_output(OutputKind::Metadata) {
            self.available_types.clone()
        } else {
            Vec::new()
        }
    }

    fn set_metadata_types(&mut self, types: &[MetadataObjectType]) -> Result<(), CaptureError> {
        self.probe.record("metadata_types");
        *self.probe.metadata_types.lock().unwrap() = Some(types.to_vec());
        Ok(())
    }

    fn start_running(&mut self, callbacks: CaptureCallbacks) -> Result<(), CaptureError> {
        if self.fail_start {
            return Err(CaptureError::AlreadyRunning);
        }
        self.probe.record("start");
        *self.probe.callbacks.lock().unwrap() = Some(callbacks);
        self.running = true;
        Ok(())
    }

    fn stop_running(&mut self) {
        self.probe.record("stop");
        self.probe.callbacks.lock().unwrap().take();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
