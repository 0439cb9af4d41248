use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::capture::domain::capture_callbacks::{
    CaptureCallbacks, FrameCallbackSender, MetadataCallbackSender,
};
use crate::capture::domain::capture_device::CaptureDevice;
use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::capture_framework::CaptureFramework;
use crate::capture::domain::capture_output::OutputKind;
use crate::capture::domain::capture_session::CaptureSession;
use crate::capture::domain::connection::Connection;
use crate::capture::domain::metadata_object::{MetadataObject, MetadataObjectType};
use crate::capture::infrastructure::replay_manifest::{ManifestError, ReplayManifest};
use crate::shared::constants::{
    FACE_QUEUE_LABEL, MAX_PACING_SLEEP, SAMPLE_QUEUE_LABEL, UNPACED_POLL_INTERVAL,
};
use crate::shared::frame::Frame;
use crate::shared::pixel_format::PixelFormat;

/// Capture framework that plays back a recorded [`ReplayManifest`].
///
/// Exposes a single device described by the manifest. Frames and metadata
/// are delivered from two independent threads, the way a live camera stack
/// delivers them on separate queues.
pub struct ReplayCaptureFramework {
    manifest: Arc<ReplayManifest>,
    device: CaptureDevice,
}

impl ReplayCaptureFramework {
    pub fn new(manifest: ReplayManifest) -> Self {
        let device = CaptureDevice::new(
            format!("replay:{}", manifest.frames_dir.display()),
            manifest.device.name.clone(),
            manifest.device.position,
        );
        Self {
            manifest: Arc::new(manifest),
            device,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        Ok(Self::new(ReplayManifest::load(path)?))
    }
}

impl CaptureFramework for ReplayCaptureFramework {
    fn devices(&self) -> Vec<CaptureDevice> {
        vec![self.device.clone()]
    }

    fn new_session(&self) -> Box<dyn CaptureSession> {
        Box::new(ReplaySession::new(self.manifest.clone(), self.device.clone()))
    }
}

struct ReplaySession {
    manifest: Arc<ReplayManifest>,
    device: CaptureDevice,
    configuring: bool,
    input: Option<CaptureDevice>,
    outputs: Vec<OutputKind>,
    pixel_format: PixelFormat,
    metadata_types: Vec<MetadataObjectType>,
    running: bool,
    stop: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl ReplaySession {
    fn new(manifest: Arc<ReplayManifest>, device: CaptureDevice) -> Self {
        Self {
            manifest,
            device,
            configuring: false,
            input: None,
            outputs: Vec::new(),
            pixel_format: PixelFormat::default(),
            metadata_types: Vec::new(),
            running: false,
            stop: Arc::new(AtomicBool::new(false)),
            threads: Vec::new(),
        }
    }

    fn require_configuring(&self) -> Result<(), CaptureError> {
        if self.configuring {
            Ok(())
        } else {
            Err(CaptureError::NotConfiguring)
        }
    }

    fn spawn_frame_queue(
        &mut self,
        frames: FrameCallbackSender,
        start: Instant,
        gate: Option<Arc<UnpacedGate>>,
    ) -> Result<(), CaptureError> {
        let paths = self
            .manifest
            .frame_paths()
            .map_err(|e| CaptureError::Source(e.to_string()))?;
        let manifest = self.manifest.clone();
        let pixel_format = self.pixel_format;
        let stop = self.stop.clone();

        let handle = std::thread::Builder::new()
            .name(SAMPLE_QUEUE_LABEL.to_string())
            .spawn(move || {
                run_frame_queue(
                    &paths,
                    &manifest,
                    pixel_format,
                    start,
                    &stop,
                    gate.as_deref(),
                    &frames,
                );
                if let Some(gate) = &gate {
                    gate.frames_done.store(true, Ordering::SeqCst);
                }
            })
            .map_err(|source| CaptureError::Spawn {
                label: SAMPLE_QUEUE_LABEL,
                source,
            })?;
        self.threads.push(handle);
        Ok(())
    }

    fn spawn_metadata_queue(
        &mut self,
        metadata: MetadataCallbackSender,
        start: Instant,
        gate: Option<Arc<UnpacedGate>>,
    ) -> Result<(), CaptureError> {
        let mut batches: Vec<(u64, Option<Duration>, Vec<MetadataObject>)> = self
            .manifest
            .metadata
            .iter()
            .map(|entry| {
                let due = self.manifest.frame_time(entry.at_frame);
                let objects = entry
                    .objects
                    .iter()
                    .filter(|o| self.metadata_types.contains(&o.object_type))
                    .map(|o| o.to_metadata(due.unwrap_or_default()))
                    .collect();
                (entry.at_frame, due, objects)
            })
            .collect();
        batches.sort_by_key(|(at_frame, _, _)| *at_frame);
        let stop = self.stop.clone();

        let handle = std::thread::Builder::new()
            .name(FACE_QUEUE_LABEL.to_string())
            .spawn(move || {
                for (at_frame, due, objects) in batches {
                    let ready = match &gate {
                        Some(gate) => wait_for(&stop, || {
                            gate.frames_done.load(Ordering::SeqCst)
                                || metadata.frames_settled() >= at_frame
                        }),
                        None => wait_until(start, due, &stop),
                    };
                    if !ready {
                        break;
                    }
                    metadata.deliver(objects);
                    if let Some(gate) = &gate {
                        gate.batches_out.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
            .map_err(|source| CaptureError::Spawn {
                label: FACE_QUEUE_LABEL,
                source,
            })?;
        self.threads.push(handle);
        Ok(())
    }
}

impl CaptureSession for ReplaySession {
    fn begin_configuration(&mut self) {
        self.configuring = true;
    }

    fn can_add_input(&self, device: &CaptureDevice) -> bool {
        self.input.is_none() && device.id == self.device.id
    }

    fn add_input(&mut self, device: &CaptureDevice) -> Result<(), CaptureError> {
        self.require_configuring()?;
        if !self.can_add_input(device) {
            return Err(CaptureError::InputUnavailable(device.name.clone()));
        }
        self.input = Some(device.clone());
        Ok(())
    }

    fn can_add_output(&self, kind: OutputKind) -> bool {
        !self.outputs.contains(&kind)
    }

    fn add_output(&mut self, kind: OutputKind) -> Result<(), CaptureError> {
        self.require_configuring()?;
        if !self.can_add_output(kind) {
            return Err(CaptureError::OutputUnavailable(kind));
        }
        self.outputs.push(kind);
        Ok(())
    }

    fn commit_configuration(&mut self) -> Result<(), CaptureError> {
        self.require_configuring()?;
        self.configuring = false;
        Ok(())
    }

    fn has_output(&self, kind: OutputKind) -> bool {
        self.outputs.contains(&kind)
    }

    fn set_pixel_format(&mut self, format: PixelFormat) -> Result<(), CaptureError> {
        if !self.has_output(OutputKind::VideoData) {
            return Err(CaptureError::OutputNotAttached(OutputKind::VideoData));
        }
        self.pixel_format = format;
        Ok(())
    }

    fn available_metadata_types(&self) -> Vec<MetadataObjectType> {
        if self.has_output(OutputKind::Metadata) {
            MetadataObjectType::ALL.to_vec()
        } else {
            Vec::new()
        }
    }

    fn set_metadata_types(&mut self, types: &[MetadataObjectType]) -> Result<(), CaptureError> {
        if !self.has_output(OutputKind::Metadata) {
            return Err(CaptureError::OutputNotAttached(OutputKind::Metadata));
        }
        self.metadata_types = types.to_vec();
        Ok(())
    }

    fn start_running(&mut self, callbacks: CaptureCallbacks) -> Result<(), CaptureError> {
        if self.running {
            return Err(CaptureError::AlreadyRunning);
        }
        self.stop.store(false, Ordering::SeqCst);
        let start = Instant::now();
        let CaptureCallbacks { frames, metadata } = callbacks;

        // Without an input there is nothing to deliver; the callbacks are
        // dropped, which tells the consumer the stream has ended.
        if self.input.is_some() {
            let both_queues =
                self.has_output(OutputKind::VideoData) && self.has_output(OutputKind::Metadata);
            let gate = (both_queues && self.manifest.fps <= 0.0).then(|| {
                Arc::new(UnpacedGate::new(
                    self.manifest.metadata.iter().map(|e| e.at_frame).collect(),
                ))
            });
            if self.has_output(OutputKind::VideoData) {
                self.spawn_frame_queue(frames, start, gate.clone())?;
            }
            if self.has_output(OutputKind::Metadata) {
                if let Err(e) = self.spawn_metadata_queue(metadata, start, gate) {
                    self.stop_running();
                    return Err(e);
                }
            }
        }
        self.running = true;
        Ok(())
    }

    fn stop_running(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                log::warn!("Replay capture thread panicked");
            }
        }
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running && self.threads.iter().any(|h| !h.is_finished())
    }
}

impl Drop for ReplaySession {
    fn drop(&mut self) {
        self.stop_running();
    }
}

/// Lock-step between the two queues when playback is unpaced.
///
/// A batch due at frame `n` is held until the worker has taken in the `n`
/// frames before it, and frame `n` is held until that batch is out.
struct UnpacedGate {
    /// `at_frame` of every batch, ascending.
    batch_frames: Vec<u64>,
    batches_out: AtomicU64,
    frames_done: AtomicBool,
}

impl UnpacedGate {
    fn new(mut batch_frames: Vec<u64>) -> Self {
        batch_frames.sort_unstable();
        Self {
            batch_frames,
            batches_out: AtomicU64::new(0),
            frames_done: AtomicBool::new(false),
        }
    }

    /// Batches that must be delivered before frame `index`.
    fn batches_due(&self, index: u64) -> u64 {
        self.batch_frames.partition_point(|&at| at <= index) as u64
    }
}

fn run_frame_queue(
    paths: &[PathBuf],
    manifest: &ReplayManifest,
    pixel_format: PixelFormat,
    start: Instant,
    stop: &AtomicBool,
    gate: Option<&UnpacedGate>,
    frames: &FrameCallbackSender,
) {
    let connection: Connection = manifest.connection;
    for (i, path) in paths.iter().enumerate() {
        let index = i as u64;
        let due = manifest.frame_time(index);
        let ready = match gate {
            Some(gate) => {
                let needed = gate.batches_due(index);
                wait_for(stop, || gate.batches_out.load(Ordering::SeqCst) >= needed)
            }
            None => wait_until(start, due, stop),
        };
        if !ready {
            break;
        }
        let timestamp = due.unwrap_or_else(|| start.elapsed());
        match load_frame(path, pixel_format, index, timestamp) {
            Ok(frame) => {
                frames.deliver(frame, connection);
            }
            Err(e) => frames.dropped(index, format!("failed to decode {}: {e}", path.display())),
        }
    }
}

fn load_frame(
    path: &Path,
    pixel_format: PixelFormat,
    index: u64,
    timestamp: Duration,
) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path)?.to_rgba8();
    let (width, height) = img.dimensions();
    let data = pixel_format.from_rgba(img.as_raw());
    Ok(Frame::new(data, width, height, pixel_format, index, timestamp))
}

/// Sleeps until `due` (relative to `start`) in short steps.
///
/// Returns `false` if a stop was requested first. `None` means unpaced.
fn wait_until(start: Instant, due: Option<Duration>, stop: &AtomicBool) -> bool {
    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let Some(due) = due else {
            return true;
        };
        let elapsed = start.elapsed();
        if elapsed >= due {
            return true;
        }
        std::thread::sleep((due - elapsed).min(MAX_PACING_SLEEP));
    }
}

/// Polls `ready` until it holds. Returns `false` if a stop came first.
fn wait_for(stop: &AtomicBool, ready: impl Fn() -> bool) -> bool {
    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        if ready() {
            return true;
        }
        std::thread::sleep(UNPACED_POLL_INTERVAL);
    }
}
