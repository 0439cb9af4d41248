use std::collections::BTreeMap;
use std::time::Instant;

use crate::shared::constants::HEARTBEAT_FRAMES;

/// Observer for consolidation events.
///
/// Keeps the worker loop independent of how a caller wants to watch it.
pub trait SessionLogger: Send {
    /// Called once per delivered frame.
    fn frame(&mut self, index: u64);

    /// How long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time sample, e.g. objects per metadata batch.
    fn metric(&mut self, name: &str, value: f64);

    /// Session-level status changes.
    fn info(&mut self, message: &str);

    /// Emitted once when the session stops.
    fn summary(&self) {}
}

pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _index: u64) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running aggregate of one stage or metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregate {
    pub count: u64,
    pub total: f64,
    pub max: f64,
}

impl Aggregate {
    fn add(&mut self, value: f64) {
        self.max = if self.count == 0 { value } else { self.max.max(value) };
        self.count += 1;
        self.total += value;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Aggregates stage timings and metrics over a session and logs a summary
/// when it stops.
///
/// Memory stays constant however long the camera runs. Every
/// `heartbeat_frames` frames a heartbeat line goes to the debug log.
pub struct SummarySessionLogger {
    heartbeat_frames: u64,
    started: Instant,
    frames: u64,
    stages: BTreeMap<String, Aggregate>,
    metrics: BTreeMap<String, Aggregate>,
}

impl SummarySessionLogger {
    pub fn new(heartbeat_frames: u64) -> Self {
        Self {
            heartbeat_frames: heartbeat_frames.max(1),
            started: Instant::now(),
            frames: 0,
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn stage(&self, name: &str) -> Option<Aggregate> {
        self.stages.get(name).copied()
    }

    pub fn metric_aggregate(&self, name: &str) -> Option<Aggregate> {
        self.metrics.get(name).copied()
    }

    /// `None` until something has been recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 && self.stages.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let secs = self.started.elapsed().as_secs_f64();
        let mut out = format!("Session summary ({} frames, {secs:.1}s):", self.frames);
        for (name, agg) in &self.stages {
            out.push_str(&format!(
                "\n  {name:12}: avg {:6.2}ms  max {:6.2}ms  ({} frames)",
                agg.mean(),
                agg.max,
                agg.count
            ));
        }
        for (name, agg) in &self.metrics {
            out.push_str(&format!(
                "\n  {name}: avg {:.1}  max {:.0}",
                agg.mean(),
                agg.max
            ));
        }
        if self.frames > 0 && secs > 0.0 {
            out.push_str(&format!(
                "\n  Throughput: {:.1} fps",
                self.frames as f64 / secs
            ));
        }
        Some(out)
    }
}

impl Default for SummarySessionLogger {
    fn default() -> Self {
        Self::new(HEARTBEAT_FRAMES)
    }
}

impl SessionLogger for SummarySessionLogger {
    fn frame(&mut self, index: u64) {
        self.frames += 1;
        if self.frames % self.heartbeat_frames == 0 {
            log::debug!(
                "Heartbeat: {} frames, latest #{index}, {:.1}s in",
                self.frames,
                self.started.elapsed().as_secs_f64()
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.stages
            .entry(stage.to_string())
            .or_default()
            .add(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().add(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("[{:.1}s] {message}", self.started.elapsed().as_secs_f64());
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}
