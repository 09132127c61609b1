use std::sync::Mutex;

use rayon::prelude::*;

use crate::composite::Compositor;
use crate::detect::{Detection, FaceDetector};
use crate::effects::{EffectBackend, EffectParams, SharedParams, create_backend};
use crate::foundation::core::{Frame, PixelRect, SubImage};
use crate::foundation::error::{FaceFxError, FaceFxResult};
use crate::geometry::{RegionGeometry, RegionProfile};
use crate::pixels::{extract_rect, extract_square, to_grayscale_into, write_sub_image};
use crate::session::{
    BufferDesc, BufferPool, BufferPoolStats, FaceFailure, FrameSource, RunStats, SessionConfig,
    StopSignal, TickReport,
};

/// Runs the per-tick pipeline: grayscale, detect, one task per face, join, write back.
///
/// Each face task reads the frame as it was when the tick started and returns a blended
/// patch. Patches are written after every task has joined, in detection order, so an
/// overlapping later face wins over an earlier one.
///
/// A background effect (see [`EffectKind::is_background`](crate::EffectKind::is_background))
/// runs once over the whole frame instead, and each face task blends the original face back
/// over the result.
pub struct FrameScheduler<D> {
    config: SessionConfig,
    params: SharedParams,
    detector: D,
    backend: Mutex<Box<dyn EffectBackend>>,
    profile: RegionProfile,
    pool: rayon::ThreadPool,
    buffers: BufferPool,
    ticks: u64,
}

impl<D: FaceDetector> FrameScheduler<D> {
    /// Scheduler using the default backend for `config.effect`.
    pub fn new(config: SessionConfig, detector: D) -> FaceFxResult<Self> {
        let backend = create_backend(config.effect);
        Self::with_backend(config, detector, backend)
    }

    /// Scheduler with a caller-supplied backend. `config.effect` is replaced by the backend's
    /// kind.
    pub fn with_backend(
        mut config: SessionConfig,
        detector: D,
        backend: Box<dyn EffectBackend>,
    ) -> FaceFxResult<Self> {
        config.validate()?;
        config.effect = backend.kind();
        let pool = build_thread_pool(config.threads)?;
        Ok(Self {
            params: SharedParams::new(config.params),
            profile: config.effect.profile(),
            config,
            detector,
            backend: Mutex::new(backend),
            pool,
            buffers: BufferPool::default(),
            ticks: 0,
        })
    }

    /// Handle for changing effect parameters between ticks.
    pub fn params(&self) -> SharedParams {
        self.params.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn buffer_stats(&self) -> BufferPoolStats {
        self.buffers.stats()
    }

    /// Swap the active effect. Takes effect on the next tick.
    pub fn set_backend(&mut self, backend: Box<dyn EffectBackend>) {
        self.config.effect = backend.kind();
        self.profile = self.config.effect.profile();
        self.backend = Mutex::new(backend);
    }

    /// Override the region calibration of the active effect.
    pub fn set_profile(&mut self, profile: RegionProfile) {
        self.profile = profile;
    }

    /// Process one frame and return the stylized copy.
    ///
    /// Detection errors abort the tick. Per-face failures are logged, counted in the report
    /// and leave that face's region untouched.
    #[tracing::instrument(
        skip_all,
        fields(tick = self.ticks, width = frame.width(), height = frame.height())
    )]
    pub fn tick(&mut self, frame: &Frame) -> FaceFxResult<(Frame, TickReport)> {
        let tick = self.ticks;
        self.ticks += 1;
        let params = self.params.snapshot();
        let (w, h) = (frame.width(), frame.height());

        let gray_desc = BufferDesc::gray(w, h);
        let mut gray = self.buffers.borrow(gray_desc);
        to_grayscale_into(frame, &mut gray)?;
        let detected = self.detector.detect_faces(&gray, h, w);
        self.buffers.release(gray_desc, gray);
        let detections = detected.map_err(as_detection_error)?;

        let mut report = TickReport {
            tick,
            detections: detections.len(),
            ..TickReport::default()
        };
        let threshold = self.config.confidence_threshold;
        let candidates: Vec<(usize, Detection)> = detections
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, det)| det.passes(threshold))
            .collect();
        report.skipped_low_confidence = detections.len() - candidates.len();

        let background = if self.config.effect.is_background() {
            match self.blur_background(frame, &params) {
                Ok(blurred) => Some(blurred),
                Err(error) => {
                    tracing::warn!(%error, "background effect failed, frame left as is");
                    report.background_error = Some(error);
                    return Ok((self.copy_frame(frame)?, report));
                }
            }
        } else {
            None
        };

        let face = FaceJob {
            detector: &self.detector,
            backend: &self.backend,
            compositor: Compositor::new(params.mask),
            profile: self.profile,
            params: &params,
            frame,
            background: background.as_ref(),
        };
        let outcomes: Vec<(usize, FaceFxResult<Option<SubImage>>)> = self.pool.install(|| {
            candidates
                .par_iter()
                .map(|(index, det)| (*index, face.run(*index, det)))
                .collect()
        });

        let mut out = match background {
            Some(blurred) => blurred,
            None => self.copy_frame(frame)?,
        };

        for (index, outcome) in outcomes {
            let written = outcome.and_then(|patch| match patch {
                Some(patch) => write_sub_image(&mut out, &patch).map(|()| true),
                None => Ok(false),
            });
            match written {
                Ok(true) => report.processed += 1,
                Ok(false) => report.skipped_empty += 1,
                Err(error) => {
                    tracing::warn!(face = index, %error, "face pipeline failed, region left as is");
                    report.failed += 1;
                    report.errors.push(FaceFailure { index, error });
                }
            }
        }

        tracing::debug!(
            detections = report.detections,
            processed = report.processed,
            skipped = report.skipped_low_confidence + report.skipped_empty,
            failed = report.failed,
            "tick complete"
        );
        Ok((out, report))
    }

    /// Pooled copy of `frame`.
    fn copy_frame(&mut self, frame: &Frame) -> FaceFxResult<Frame> {
        let (w, h) = (frame.width(), frame.height());
        let mut data = self.buffers.borrow(BufferDesc::rgba(w, h));
        data.copy_from_slice(frame.data());
        Frame::from_rgba(w, h, data)
    }

    /// Run the backend once over the whole frame.
    fn blur_background(&mut self, frame: &Frame, params: &EffectParams) -> FaceFxResult<Frame> {
        let (w, h) = (frame.width(), frame.height());
        let rect = PixelRect::new(0, 0, w, h);
        let mut data = self.buffers.borrow(BufferDesc::rgba(w, h));
        data.copy_from_slice(frame.data());
        let whole = SubImage::new(rect, data)?;

        let blurred = self
            .backend
            .get_mut()
            .map_err(|_| FaceFxError::backend("effect backend lock poisoned"))?
            .transform(&whole, params)?;
        self.buffers.release(BufferDesc::rgba(w, h), whole.into_data());
        if blurred.rect() != rect {
            return Err(FaceFxError::backend(format!(
                "background effect returned {:?} for frame {:?}",
                blurred.rect(),
                rect
            )));
        }
        Frame::from_rgba(w, h, blurred.into_data())
    }

    /// Hand a presented frame's buffer back for reuse.
    pub fn recycle(&mut self, frame: Frame) {
        let desc = BufferDesc::rgba(frame.width(), frame.height());
        self.buffers.release(desc, frame.into_data());
    }

    /// Drive ticks until the source ends or `stop` is set.
    ///
    /// Capture and detection failures abandon only their tick: they are logged and counted in
    /// [`RunStats::tick_errors`], and the loop moves on to the next frame. Any other error,
    /// including one returned by `present`, ends the run.
    pub fn run<S, P>(
        &mut self,
        source: &mut S,
        mut present: P,
        stop: &StopSignal,
    ) -> FaceFxResult<RunStats>
    where
        S: FrameSource + ?Sized,
        P: FnMut(&Frame, &TickReport) -> FaceFxResult<()>,
    {
        let mut stats = RunStats::default();
        while !stop.is_stopped() {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    let error = as_capture_error(e);
                    tracing::warn!(%error, "capture failed, skipping tick");
                    stats.tick_errors += 1;
                    continue;
                }
            };
            match self.tick(&frame) {
                Ok((out, report)) => {
                    present(&out, &report)?;
                    stats.absorb(&report);
                    self.recycle(out);
                }
                Err(error) if error.is_tick_fatal() => {
                    tracing::warn!(%error, "tick abandoned");
                    stats.tick_errors += 1;
                }
                Err(error) => return Err(error),
            }
        }
        tracing::info!(
            ticks = stats.ticks,
            processed = stats.processed,
            failed = stats.failed,
            tick_errors = stats.tick_errors,
            "frame loop finished"
        );
        Ok(stats)
    }
}

/// Everything a face task needs, all borrowed from the scheduler for the tick.
struct FaceJob<'a, D> {
    detector: &'a D,
    backend: &'a Mutex<Box<dyn EffectBackend>>,
    compositor: Compositor,
    profile: RegionProfile,
    params: &'a EffectParams,
    frame: &'a Frame,
    /// Whole-frame effect output, when the effect is a background one.
    background: Option<&'a Frame>,
}

impl<D: FaceDetector> FaceJob<'_, D> {
    #[tracing::instrument(level = "trace", skip(self, det), fields(row = det.row, col = det.col))]
    fn run(&self, index: usize, det: &Detection) -> FaceFxResult<Option<SubImage>> {
        let left = self.detector.detect_left_pupil(det);
        let right = self.detector.detect_right_pupil(det);
        let Some(geom) =
            RegionGeometry::from_detection(det, self.profile, left.as_ref(), right.as_ref())
        else {
            return Ok(None);
        };

        let original = extract_square(
            self.frame,
            geom.center.x as i64,
            geom.center.y as i64,
            geom.side,
        )?;
        if original.rect().is_empty() {
            return Ok(None);
        }

        if let Some(blurred) = self.background {
            let behind = extract_rect(blurred, original.rect())?;
            return self.compositor.composite(&behind, &original, &geom).map(Some);
        }

        let effect = {
            let mut backend = self
                .backend
                .lock()
                .map_err(|_| FaceFxError::backend("effect backend lock poisoned"))?;
            backend.transform(&original, self.params)?
        };
        if effect.rect() != original.rect() {
            return Err(FaceFxError::backend(format!(
                "backend returned {:?} for region {:?}",
                effect.rect(),
                original.rect()
            )));
        }

        self.compositor.composite(&original, &effect, &geom).map(Some)
    }
}

fn as_detection_error(e: FaceFxError) -> FaceFxError {
    if e.is_tick_fatal() {
        e
    } else {
        FaceFxError::detection(e.to_string())
    }
}

fn as_capture_error(e: FaceFxError) -> FaceFxError {
    if e.is_tick_fatal() {
        e
    } else {
        FaceFxError::capture(e.to_string())
    }
}

fn build_thread_pool(threads: Option<usize>) -> FaceFxResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FaceFxError::validation(
            "session 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("facefx-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FaceFxError::backend(format!("failed to build rayon thread pool: {e}")))
}
