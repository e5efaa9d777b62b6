//! The face-analysis capability boundary.
//!
//! [`FaceAnalyzer`] is the seam between the comparison pipeline and the
//! detection/embedding backend: one operation, image in, zero or more
//! detected faces out. [`OnnxFaceAnalyzer`] is the production backend
//! (SCRFD + ArcFace, the insightface buffalo_l bundle); tests substitute
//! fakes.

use crate::detector::{DetectorError, FaceDetector};
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::BoundingBox;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

/// Detection model file name within the buffalo_l bundle.
pub const DETECTOR_MODEL_FILE: &str = "det_10g.onnx";
/// Recognition model file name within the buffalo_l bundle.
pub const RECOGNIZER_MODEL_FILE: &str = "w600k_r50.onnx";

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("face detection failed: {0}")]
    Detector(#[from] DetectorError),
    #[error("embedding extraction failed: {0}")]
    Recognizer(#[from] RecognizerError),
}

/// One candidate face found in an image: its bounding box and the raw
/// embedding vector the backend produced for it (if any).
#[derive(Debug, Clone)]
pub struct DetectedFace {
    pub bbox: BoundingBox,
    pub embedding: Option<Vec<f32>>,
}

/// The external face-analysis capability.
pub trait FaceAnalyzer {
    fn analyze(&mut self, image: &DynamicImage) -> Result<Vec<DetectedFace>, AnalyzerError>;
}

/// SCRFD detection + ArcFace embedding via ONNX Runtime.
#[derive(Debug)]
pub struct OnnxFaceAnalyzer {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl OnnxFaceAnalyzer {
    /// Load both models of the bundle from `model_dir`, failing fast on a
    /// missing file.
    pub fn load(model_dir: &Path) -> Result<Self, AnalyzerError> {
        let detector_path = model_dir.join(DETECTOR_MODEL_FILE);
        let recognizer_path = model_dir.join(RECOGNIZER_MODEL_FILE);

        let detector = FaceDetector::load(&detector_path.to_string_lossy())?;
        let recognizer = FaceRecognizer::load(&recognizer_path.to_string_lossy())?;

        tracing::info!(dir = %model_dir.display(), "face analyzer ready");

        Ok(Self {
            detector,
            recognizer,
        })
    }
}

impl FaceAnalyzer for OnnxFaceAnalyzer {
    fn analyze(&mut self, image: &DynamicImage) -> Result<Vec<DetectedFace>, AnalyzerError> {
        let gray = image.to_luma8();

        let boxes = self.detector.detect(&gray)?;
        tracing::debug!(count = boxes.len(), "detector returned faces");

        let mut faces = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            let embedding = self.recognizer.extract(&gray, &bbox)?;
            faces.push(DetectedFace {
                bbox,
                embedding: Some(embedding),
            });
        }

        Ok(faces)
    }
}
