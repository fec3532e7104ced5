//! Cascade face detector backed by the `rustface` crate (SeetaFace engine).
//!
//! The pre-trained funnel-structured cascade is loaded from a model file
//! once; a fresh detector is built from it per call because the engine's
//! detector handle is not `Send`.
use std::fs;
use std::io::BufReader;
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Image pyramid growth between scales, as OpenCV's `scaleFactor`.
pub const DEFAULT_SCALE_FACTOR: f64 = 1.3;

/// Smallest face edge, in pixels, that the cascade looks for.
pub const DEFAULT_MIN_FACE_SIZE: u32 = 30;

/// Minimum classifier score for a window to count as a face.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 2.0;

const SLIDE_WINDOW_STEP: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CascadeParams {
    pub scale_factor: f64,
    pub min_face_size: u32,
    pub score_threshold: f64,
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

impl CascadeParams {
    /// The engine shrinks the image by a factor in (0, 1) per pyramid level,
    /// the reciprocal of the growth factor.
    fn pyramid_scale(&self) -> f32 {
        let growth = self.scale_factor.max(1.01);
        (1.0 / growth).clamp(0.1, 0.99) as f32
    }
}

pub struct CascadeFaceDetector {
    model: rustface::Model,
    params: CascadeParams,
}

impl CascadeFaceDetector {
    pub fn new(model_path: &Path, params: CascadeParams) -> Result<Self, Box<dyn std::error::Error>> {
        let file = fs::File::open(model_path)
            .map_err(|e| format!("cannot open cascade model {}: {e}", model_path.display()))?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| format!("cannot read cascade model {}: {e}", model_path.display()))?;
        log::info!("Loaded cascade model from {}", model_path.display());
        Ok(Self { model, params })
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let gray = frame.grayscale();
        if gray.is_empty() {
            return Err("cannot convert frame to grayscale".into());
        }

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.params.min_face_size.max(20));
        detector.set_score_thresh(self.params.score_threshold);
        detector.set_pyramid_scale_factor(self.params.pyramid_scale());
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        let faces = detector.detect(&rustface::ImageData::new(
            &gray,
            frame.width(),
            frame.height(),
        ));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                Region::new(
                    bbox.x(),
                    bbox.y(),
                    bbox.width() as i32,
                    bbox.height() as i32,
                    face.score(),
                )
            })
            .collect())
    }
}
