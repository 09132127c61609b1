//! facefx stylizes faces in live video frames.
//!
//! Every tick converts a frame to grayscale, asks a [`FaceDetector`] for faces, runs one task
//! per confident face (extract the region, apply the active [`EffectBackend`], blend the result
//! back through a soft tilted ellipse) and joins them before the frame is presented.
//!
//! - Configure a [`SessionConfig`] and build a [`FrameScheduler`]
//! - Call [`FrameScheduler::tick`] per frame, or drive a [`FrameSource`] with
//!   [`FrameScheduler::run`]
//! - Adjust effect knobs between ticks through [`SharedParams`]
#![forbid(unsafe_code)]

mod foundation;

/// Soft ellipse masks and blending.
pub mod composite;
/// Face detector boundary and the replay detector.
pub mod detect;
/// Effect backends and their parameters.
pub mod effects;
/// Region geometry derived from detections.
pub mod geometry;
/// Frame conversions and region access.
pub mod pixels;
/// Palette reduction, cell averaging and noise.
pub mod quantize;
/// Frame loop, scheduler and buffer reuse.
pub mod session;

pub use crate::foundation::core::{Affine, Frame, PixelRect, Point, SubImage, Vec2};
pub use crate::foundation::error::{FaceFxError, FaceFxResult};

pub use crate::composite::{AlphaMask, Compositor};
pub use crate::detect::{Detection, FaceDetector, LandmarkPoint, PupilPoint, ReplayDetector};
pub use crate::effects::{
    EffectBackend, EffectKind, EffectParams, SharedParams, create_backend,
};
pub use crate::geometry::{RegionGeometry, RegionProfile};
pub use crate::quantize::Quantizer;
pub use crate::session::{
    FrameScheduler, FrameSource, RunStats, SessionConfig, StopSignal, TickReport,
};
