use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::capture::domain::capture_callbacks::{callback_channels, CallbackReceivers};
use crate::capture::domain::capture_device::CaptureDevice;
use crate::capture::domain::capture_framework::CaptureFramework;
use crate::capture::domain::capture_output::OutputKind;
use crate::capture::domain::capture_session::CaptureSession;
use crate::capture::domain::metadata_object::{MetadataObjectType, MetadataSnapshot};
use crate::display::domain::display_sink::DisplaySink;
use crate::display::domain::readout_surface::ReadoutSurface;
use crate::display::infrastructure::readouts::NullReadout;
use crate::processing::domain::frame_processor::FrameProcessor;
use crate::session::frame_bridge::FrameBridge;
use crate::session::session_config::{RejectionPolicy, SessionConfig};
use crate::session::session_error::SessionError;
use crate::session::session_logger::{NullSessionLogger, SessionLogger};
use crate::session::shared_snapshot::SharedSnapshot;
use crate::shared::constants::CONSOLIDATION_THREAD_LABEL;
use crate::shared::session_stats::{SessionStats, StatsSnapshot};

/// Opens a capture session and bridges its two delivery streams into the
/// frame processor, display sink and readout surface.
///
/// Consumed by [`SessionCoordinator::open`]; the returned [`RunningSession`]
/// owns everything from then on.
pub struct SessionCoordinator {
    framework: Box<dyn CaptureFramework>,
    processor: Box<dyn FrameProcessor>,
    display: Box<dyn DisplaySink>,
    readout: Box<dyn ReadoutSurface>,
    logger: Box<dyn SessionLogger>,
    config: SessionConfig,
}

/// A setup component the session may refuse.
enum Component<'a> {
    Input(&'a CaptureDevice),
    Output(OutputKind),
}

impl SessionCoordinator {
    pub fn new(
        framework: Box<dyn CaptureFramework>,
        processor: Box<dyn FrameProcessor>,
        display: Box<dyn DisplaySink>,
        config: SessionConfig,
    ) -> Self {
        Self {
            framework,
            processor,
            display,
            readout: Box::new(NullReadout),
            logger: Box::new(NullSessionLogger),
            config,
        }
    }

    /// Sets where the blink count is written after each processed frame.
    pub fn set_readout(&mut self, readout: Box<dyn ReadoutSurface>) {
        self.readout = readout;
    }

    pub fn with_logger(mut self, logger: Box<dyn SessionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn open(self) -> Result<RunningSession, SessionError> {
        let Self {
            framework,
            mut processor,
            display,
            readout,
            logger,
            config,
        } = self;

        let devices = framework.devices();
        let device = CaptureDevice::select(&devices, config.device_position)
            .ok_or(SessionError::DeviceNotFound(config.device_position))?
            .clone();

        let mut session = framework.new_session();
        configure(session.as_mut(), &device, &config)?;

        processor
            .prepare()
            .map_err(|e| SessionError::Prepare(e.to_string()))?;

        let stats = Arc::new(SessionStats::new());
        let published = SharedSnapshot::new();
        let (callbacks, receivers) = callback_channels(config.frame_queue_capacity, stats.clone());
        let bridge = FrameBridge::new(
            processor,
            display,
            readout,
            logger,
            published.clone(),
            stats.clone(),
        );

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let worker = spawn_consolidator(bridge, receivers, stop_rx).map_err(SessionError::Spawn)?;

        if let Err(e) = session.start_running(callbacks) {
            drop(stop_tx);
            let _ = worker.join();
            return Err(e.into());
        }
        log::info!(
            "Capture session running on {} ({}-facing)",
            device.name,
            device.position
        );

        Ok(RunningSession {
            session,
            stop_tx,
            worker,
            stats,
            published,
            started_at: Instant::now(),
        })
    }
}

fn configure(
    session: &mut dyn CaptureSession,
    device: &CaptureDevice,
    config: &SessionConfig,
) -> Result<(), SessionError> {
    let policy = config.rejection_policy;

    session.begin_configuration();
    if session.can_add_input(device) {
        session.add_input(device)?;
    } else {
        handle_rejection(policy, Component::Input(device))?;
    }
    for kind in [OutputKind::VideoData, OutputKind::Metadata] {
        if session.can_add_output(kind) {
            session.add_output(kind)?;
        } else {
            handle_rejection(policy, Component::Output(kind))?;
        }
    }
    session.commit_configuration()?;

    if session.has_output(OutputKind::VideoData) {
        session.set_pixel_format(config.pixel_format)?;
    }

    // Available types are only known once the metadata output is attached.
    if session.has_output(OutputKind::Metadata) {
        let available = session.available_metadata_types();
        let (supported, unsupported): (Vec<MetadataObjectType>, Vec<MetadataObjectType>) = config
            .metadata_types
            .iter()
            .copied()
            .partition(|t| available.contains(t));
        for t in &unsupported {
            log::warn!("Metadata output cannot detect {t} objects; leaving them out");
        }
        session.set_metadata_types(&supported)?;
    }

    Ok(())
}

fn handle_rejection(policy: RejectionPolicy, component: Component<'_>) -> Result<(), SessionError> {
    let description = match &component {
        Component::Input(device) => format!("input device {}", device.name),
        Component::Output(kind) => format!("{kind} output"),
    };
    match policy {
        RejectionPolicy::Ignore => {
            log::debug!("Session rejected {description}; skipping");
            Ok(())
        }
        RejectionPolicy::Warn => {
            log::warn!("Session rejected {description}; skipping");
            Ok(())
        }
        RejectionPolicy::Fail => Err(match component {
            Component::Input(device) => SessionError::InputRejected(device.name.clone()),
            Component::Output(kind) => SessionError::OutputRejected(kind),
        }),
    }
}

fn spawn_consolidator(
    mut bridge: FrameBridge,
    receivers: CallbackReceivers,
    stop_rx: Receiver<()>,
) -> std::io::Result<JoinHandle<FrameBridge>> {
    std::thread::Builder::new()
        .name(CONSOLIDATION_THREAD_LABEL.to_string())
        .spawn(move || {
            run_consolidation(&mut bridge, receivers, &stop_rx);
            bridge
        })
}

/// Worker loop. Pending metadata is always drained before a frame is
/// handled, so a frame never sees a batch older than one already queued.
///
/// Returns when stop is signaled or every frame sender is gone.
fn run_consolidation(bridge: &mut FrameBridge, receivers: CallbackReceivers, stop_rx: &Receiver<()>) {
    let CallbackReceivers { frames, metadata } = receivers;
    let closed = crossbeam_channel::never();
    let mut metadata_open = true;

    loop {
        let metadata_rx = if metadata_open { &metadata } else { &closed };
        crossbeam_channel::select! {
            recv(stop_rx) -> _ => break,
            recv(frames) -> event => match event {
                Ok(event) => {
                    if metadata_open {
                        metadata_open = drain_metadata(bridge, &metadata);
                    }
                    bridge.handle(event);
                }
                Err(_) => break,
            },
            recv(metadata_rx) -> batch => match batch {
                Ok(batch) => bridge.on_metadata(batch),
                Err(_) => metadata_open = false,
            },
        }
    }
}

/// Returns `false` once the metadata stream has disconnected.
fn drain_metadata(bridge: &mut FrameBridge, metadata: &Receiver<MetadataSnapshot>) -> bool {
    loop {
        match metadata.try_recv() {
            Ok(batch) => bridge.on_metadata(batch),
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

/// Final numbers for a session that has been stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionReport {
    pub stats: StatsSnapshot,
    pub elapsed: Duration,
}

/// Handle to a started session.
pub struct RunningSession {
    session: Box<dyn CaptureSession>,
    stop_tx: Sender<()>,
    worker: JoinHandle<FrameBridge>,
    stats: Arc<SessionStats>,
    published: SharedSnapshot,
    started_at: Instant,
}

impl RunningSession {
    pub fn status(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// The metadata batch the worker currently holds.
    pub fn current_metadata(&self) -> MetadataSnapshot {
        self.published.load()
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_running()
    }

    /// `true` once the capture source is exhausted and the worker has
    /// handled every frame it was given.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Stops capture, discards frames still queued, and joins the worker.
    pub fn stop(self) -> Result<SessionReport, SessionError> {
        let Self {
            mut session,
            stop_tx,
            worker,
            stats,
            started_at,
            ..
        } = self;
        session.stop_running();
        drop(stop_tx);
        finish(worker, &stats, started_at)
    }

    /// Blocks until the capture source runs dry, then stops the session.
    pub fn wait(self) -> Result<SessionReport, SessionError> {
        let Self {
            mut session,
            stop_tx,
            worker,
            stats,
            started_at,
            ..
        } = self;
        let result = finish(worker, &stats, started_at);
        session.stop_running();
        drop(stop_tx);
        result
    }
}

fn finish(
    worker: JoinHandle<FrameBridge>,
    stats: &SessionStats,
    started_at: Instant,
) -> Result<SessionReport, SessionError> {
    let bridge = worker.join().map_err(|_| SessionError::WorkerPanicked)?;
    bridge.summary();
    let report = SessionReport {
        stats: stats.snapshot(),
        elapsed: started_at.elapsed(),
    };
    log::info!(
        "Capture session stopped: {} frames displayed, {} processed, {} dropped, blink count {}",
        report.stats.frames_displayed,
        report.stats.frames_processed,
        report.stats.frames_dropped,
        report.stats.blink_count
    );
    Ok(report)
}
