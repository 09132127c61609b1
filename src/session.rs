//! Live-frame session: configuration, the frame loop boundary, and the per-tick scheduler.

mod pool;
mod scheduler;

pub use pool::{BufferDesc, BufferFormat, BufferPool, BufferPoolOpts, BufferPoolStats};
pub use scheduler::FrameScheduler;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::effects::{EffectKind, EffectParams};
use crate::foundation::core::Frame;
use crate::foundation::error::{FaceFxError, FaceFxResult};

/// Detector score a face must exceed to be processed.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 50.0;

/// Session-wide settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Faces at or below this score are skipped.
    pub confidence_threshold: f32,
    /// Worker threads for the per-face fan-out. `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Active effect.
    pub effect: EffectKind,
    /// Initial effect parameters.
    pub params: EffectParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            threads: None,
            effect: EffectKind::default(),
            params: EffectParams::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> FaceFxResult<()> {
        if !self.confidence_threshold.is_finite() {
            return Err(FaceFxError::validation(
                "confidence_threshold must be finite",
            ));
        }
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(FaceFxError::validation("threads must be >= 1 when set"));
        }
        self.params.validate()
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(s: &str) -> FaceFxResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| FaceFxError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Cooperative stop flag shared between the frame loop and whoever wants to end it.
///
/// Setting it prevents the next tick from starting. A tick already in flight completes.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Producer of frames for the loop. `Ok(None)` ends the stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> FaceFxResult<Option<Frame>>;
}

impl<F> FrameSource for F
where
    F: FnMut() -> FaceFxResult<Option<Frame>>,
{
    fn next_frame(&mut self) -> FaceFxResult<Option<Frame>> {
        self()
    }
}

/// A contained per-face failure.
#[derive(Debug)]
pub struct FaceFailure {
    /// Position of the face in the tick's detection list.
    pub index: usize,
    pub error: FaceFxError,
}

/// What happened during one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    /// Faces returned by the detector.
    pub detections: usize,
    /// Faces whose patch was written back.
    pub processed: usize,
    /// Faces at or under the confidence threshold.
    pub skipped_low_confidence: usize,
    /// Faces whose region clipped to nothing or whose geometry degenerated.
    pub skipped_empty: usize,
    /// Faces whose pipeline failed.
    pub failed: usize,
    pub errors: Vec<FaceFailure>,
    /// Set when a whole-frame effect failed; the frame is then returned unchanged.
    pub background_error: Option<FaceFxError>,
}

/// Totals over a run of ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub detections: u64,
    pub processed: u64,
    pub failed: u64,
    /// Ticks abandoned because capture or detection failed.
    pub tick_errors: u64,
}

impl RunStats {
    pub(crate) fn absorb(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.detections += report.detections as u64;
        self.processed += report.processed as u64;
        self.failed += report.failed as u64;
    }
}

#[cfg(test)]
#[path = "../tests/unit/session/config.rs"]
mod tests;
