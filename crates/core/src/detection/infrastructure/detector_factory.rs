use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{
    BUNDLED_MODEL_DIR, CASCADE_MODEL_NAME, CASCADE_MODEL_URL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};

use super::cascade_face_detector::{
    CascadeFaceDetector, CascadeParams, DEFAULT_MIN_FACE_SIZE, DEFAULT_SCALE_FACTOR,
    DEFAULT_SCORE_THRESHOLD,
};
use super::model_resolver::{self, ModelSource, ProgressFn};
use super::onnx_yolo_detector::{OnnxYoloDetector, DEFAULT_CONFIDENCE};

/// Face detection engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// Funnel-structured cascade classifier on a grayscale image.
    #[default]
    Cascade,
    /// YOLO face model through ONNX Runtime.
    Yolo,
}

impl std::fmt::Display for DetectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorBackend::Cascade => write!(f, "cascade"),
            DetectorBackend::Yolo => write!(f, "yolo"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub enabled: bool,
    pub backend: DetectorBackend,
    /// Model file to use instead of the cached or downloaded default.
    pub model_path: Option<PathBuf>,
    pub min_face_size: u32,
    pub scale_factor: f64,
    pub score_threshold: f64,
    /// YOLO only: minimum detection confidence (0.0-1.0).
    pub confidence: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: DetectorBackend::Cascade,
            model_path: None,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            scale_factor: DEFAULT_SCALE_FACTOR,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl DetectionSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.scale_factor <= 1.0 {
            return Err(format!(
                "scale_factor must be greater than 1.0, got {}",
                self.scale_factor
            ));
        }
        if self.min_face_size < 20 {
            return Err(format!(
                "min_face_size must be at least 20 pixels, got {}",
                self.min_face_size
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            ));
        }
        Ok(())
    }

    fn model_source(&self) -> ModelSource<'_> {
        let (name, url) = match self.backend {
            DetectorBackend::Cascade => (CASCADE_MODEL_NAME, CASCADE_MODEL_URL),
            DetectorBackend::Yolo => (YOLO_MODEL_NAME, YOLO_MODEL_URL),
        };
        ModelSource {
            name,
            url,
            explicit_path: self.model_path.as_deref(),
            bundled_dir: Some(Path::new(BUNDLED_MODEL_DIR)),
        }
    }

    fn cascade_params(&self) -> CascadeParams {
        CascadeParams {
            scale_factor: self.scale_factor,
            min_face_size: self.min_face_size,
            score_threshold: self.score_threshold,
        }
    }
}

/// Resolves the configured model (downloading it if needed) and builds the
/// matching detector. Blocks on network I/O.
pub fn create_detector(
    settings: &DetectionSettings,
    progress: Option<ProgressFn>,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    settings.validate()?;
    let model_path = model_resolver::resolve(&settings.model_source(), progress)?;
    log::info!(
        "Using {} face detector with model {}",
        settings.backend,
        model_path.display()
    );
    match settings.backend {
        DetectorBackend::Cascade => Ok(Box::new(CascadeFaceDetector::new(
            &model_path,
            settings.cascade_params(),
        )?)),
        DetectorBackend::Yolo => Ok(Box::new(OnnxYoloDetector::new(
            &model_path,
            settings.confidence,
        )?)),
    }
}
