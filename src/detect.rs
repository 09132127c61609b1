//! Face detector boundary.
//!
//! Detection itself is an external collaborator. The pipeline only needs face boxes and
//! optional pupil landmarks, expressed through [`FaceDetector`]. [`ReplayDetector`] feeds
//! recorded detections back in, which is what the binary and the tests use.

use std::io::Read;

use crate::foundation::error::{FaceFxError, FaceFxResult};

/// One candidate face: a square box of side `scale` centered on `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Detection {
    /// Box center row (y).
    pub row: i32,
    /// Box center column (x).
    pub col: i32,
    /// Box side in pixels.
    pub scale: i32,
    /// Detector score.
    pub confidence: f32,
}

impl Detection {
    /// Return `true` when the detection clears `threshold` (strictly greater).
    pub fn passes(&self, threshold: f32) -> bool {
        self.confidence > threshold
    }
}

/// A pupil landmark. `scale` is the landmark's own size, not the face size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PupilPoint {
    /// Row (y).
    pub row: i32,
    /// Column (x).
    pub col: i32,
    /// Landmark scale.
    pub scale: f32,
}

/// A generic `(row, col)` landmark, used for mouth corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LandmarkPoint {
    /// Row (y).
    pub row: i32,
    /// Column (x).
    pub col: i32,
}

/// The detector contract consumed by the frame scheduler.
///
/// `detect_faces` runs once per tick on the compact grayscale buffer. The landmark lookups run
/// inside the per-face tasks and therefore take `&self`.
pub trait FaceDetector: Send + Sync {
    /// Find faces in a `rows x cols` grayscale buffer.
    fn detect_faces(&mut self, gray: &[u8], rows: u32, cols: u32)
    -> FaceFxResult<Vec<Detection>>;

    /// Left pupil for `det`, if one was found.
    fn detect_left_pupil(&self, det: &Detection) -> Option<PupilPoint>;

    /// Right pupil for `det`, if one was found.
    fn detect_right_pupil(&self, det: &Detection) -> Option<PupilPoint>;

    /// Mouth corners derived from a pupil pair. Detectors without a mouth model return `None`.
    ///
    /// The frame scheduler never calls this: region geometry needs only the face box and the
    /// pupils. It is exposed for callers that draw or log landmarks on top of the output.
    fn detect_mouth_points(
        &self,
        _left: &PupilPoint,
        _right: &PupilPoint,
    ) -> Option<[LandmarkPoint; 2]> {
        None
    }
}

/// A face recorded with its landmarks.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecordedFace {
    /// Face box and score.
    #[serde(flatten)]
    pub detection: Detection,
    /// Left pupil, if any.
    #[serde(default)]
    pub left_pupil: Option<PupilPoint>,
    /// Right pupil, if any.
    #[serde(default)]
    pub right_pupil: Option<PupilPoint>,
    /// Mouth corners, if any.
    #[serde(default)]
    pub mouth: Option<[LandmarkPoint; 2]>,
}

/// All faces recorded for one frame.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecordedFrame {
    /// Faces in this frame.
    #[serde(default)]
    pub faces: Vec<RecordedFace>,
}

/// JSON document holding a sequence of recorded frames.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Recording {
    /// Frames in playback order.
    pub frames: Vec<RecordedFrame>,
}

/// Deterministic detector that plays back a [`Recording`], one frame per `detect_faces` call.
#[derive(Clone, Debug)]
pub struct ReplayDetector {
    frames: Vec<RecordedFrame>,
    cursor: usize,
    looping: bool,
    current: Vec<RecordedFace>,
}

impl ReplayDetector {
    /// Play `recording` once; calls past the end fail with a detection error.
    pub fn new(recording: Recording) -> Self {
        Self {
            frames: recording.frames,
            cursor: 0,
            looping: false,
            current: Vec::new(),
        }
    }

    /// Restart from the first frame when the recording runs out.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Parse a recording from JSON.
    pub fn from_json_reader(reader: impl Read) -> FaceFxResult<Self> {
        let recording: Recording =
            serde_json::from_reader(reader).map_err(|e| FaceFxError::serde(e.to_string()))?;
        Ok(Self::new(recording))
    }

    /// Parse a recording from a JSON string.
    pub fn from_json_str(s: &str) -> FaceFxResult<Self> {
        Self::from_json_reader(s.as_bytes())
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when the recording holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn lookup(&self, det: &Detection) -> Option<&RecordedFace> {
        self.current.iter().find(|f| f.detection == *det)
    }
}

impl FaceDetector for ReplayDetector {
    fn detect_faces(
        &mut self,
        _gray: &[u8],
        _rows: u32,
        _cols: u32,
    ) -> FaceFxResult<Vec<Detection>> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Err(FaceFxError::detection(format!(
                    "replay exhausted after {} frames",
                    self.frames.len()
                )));
            }
            self.cursor = 0;
        }
        self.current = self.frames[self.cursor].faces.clone();
        self.cursor += 1;
        Ok(self.current.iter().map(|f| f.detection).collect())
    }

    fn detect_left_pupil(&self, det: &Detection) -> Option<PupilPoint> {
        self.lookup(det).and_then(|f| f.left_pupil)
    }

    fn detect_right_pupil(&self, det: &Detection) -> Option<PupilPoint> {
        self.lookup(det).and_then(|f| f.right_pupil)
    }

    fn detect_mouth_points(
        &self,
        left: &PupilPoint,
        right: &PupilPoint,
    ) -> Option<[LandmarkPoint; 2]> {
        self.current
            .iter()
            .find(|f| f.left_pupil.as_ref() == Some(left) && f.right_pupil.as_ref() == Some(right))
            .and_then(|f| f.mouth)
    }
}

#[cfg(test)]
#[path = "../tests/unit/detect.rs"]
mod tests;
