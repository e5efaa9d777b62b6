//! Single-image embedding extraction pipeline.
//!
//! Decode → analyze → face-count policy → normalize. Every failure mode is a
//! typed [`ExtractionError`] whose `Display` text is the message surfaced to
//! API callers; nothing panics across this boundary.

use crate::analyzer::{AnalyzerError, FaceAnalyzer};
use crate::types::Embedding;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Invalid or corrupted image file: {path}")]
    InvalidImage {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("No face detected.")]
    NoFaceDetected,
    #[error("Multiple faces detected ({0}). Only one face is allowed.")]
    MultipleFaces(usize),
    #[error("Failed to extract face embedding.")]
    EmbeddingUnavailable,
    #[error("{0}")]
    Analyzer(#[from] AnalyzerError),
}

/// Extract a unit-normalized face embedding from the image at `path`.
///
/// Exactly one face must be present; images with zero or multiple faces are
/// rejected with a caller-facing message (the multi-face message carries the
/// detected count).
pub fn extract_embedding<A: FaceAnalyzer + ?Sized>(
    analyzer: &mut A,
    path: &Path,
) -> Result<Embedding, ExtractionError> {
    let image = image::open(path).map_err(|source| ExtractionError::InvalidImage {
        path: path.display().to_string(),
        source,
    })?;

    let faces = analyzer.analyze(&image)?;

    match faces.len() {
        0 => {
            tracing::debug!(path = %path.display(), "no face detected");
            return Err(ExtractionError::NoFaceDetected);
        }
        1 => {}
        n => {
            tracing::debug!(count = n, path = %path.display(), "rejecting multi-face image");
            return Err(ExtractionError::MultipleFaces(n));
        }
    }

    // Largest horizontal extent wins. Moot while multi-face images are
    // rejected above; the rule survives any future relaxation of that policy.
    let Some(face) = faces.iter().max_by(|a, b| {
        a.bbox
            .width
            .partial_cmp(&b.bbox.width)
            .unwrap_or(std::cmp::Ordering::Equal)
    }) else {
        return Err(ExtractionError::NoFaceDetected);
    };

    let raw = face
        .embedding
        .clone()
        .filter(|e| !e.is_empty())
        .ok_or(ExtractionError::EmbeddingUnavailable)?;

    Embedding::unit_normalized(raw).ok_or(ExtractionError::EmbeddingUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::DetectedFace;
    use crate::detector::DetectorError;
    use crate::types::BoundingBox;
    use image::{GrayImage, Luma};
    use std::path::PathBuf;

    struct FakeAnalyzer {
        faces: Vec<DetectedFace>,
        fail: Option<String>,
    }

    impl FakeAnalyzer {
        fn returning(faces: Vec<DetectedFace>) -> Self {
            Self { faces, fail: None }
        }

        fn failing(msg: &str) -> Self {
            Self {
                faces: vec![],
                fail: Some(msg.to_string()),
            }
        }
    }

    impl FaceAnalyzer for FakeAnalyzer {
        fn analyze(
            &mut self,
            _image: &image::DynamicImage,
        ) -> Result<Vec<DetectedFace>, AnalyzerError> {
            if let Some(msg) = &self.fail {
                return Err(AnalyzerError::Detector(DetectorError::InferenceFailed(
                    msg.clone(),
                )));
            }
            Ok(self.faces.clone())
        }
    }

    fn face_with(embedding: Option<Vec<f32>>) -> DetectedFace {
        DetectedFace {
            bbox: BoundingBox {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 60.0,
                confidence: 0.95,
                landmarks: None,
            },
            embedding,
        }
    }

    fn write_test_png(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("face.png");
        let img = GrayImage::from_pixel(8, 8, Luma([127u8]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_invalid_image_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let mut analyzer = FakeAnalyzer::returning(vec![face_with(Some(vec![1.0]))]);
        let err = extract_embedding(&mut analyzer, &path).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidImage { .. }));
        assert!(err.to_string().contains("Invalid or corrupted image file"));
    }

    #[test]
    fn test_no_face_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(&dir);

        let mut analyzer = FakeAnalyzer::returning(vec![]);
        let err = extract_embedding(&mut analyzer, &path).unwrap_err();
        assert_eq!(err.to_string(), "No face detected.");
    }

    #[test]
    fn test_multiple_faces_rejected_with_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(&dir);

        let mut analyzer = FakeAnalyzer::returning(vec![
            face_with(Some(vec![1.0, 0.0])),
            face_with(Some(vec![0.0, 1.0])),
        ]);
        let err = extract_embedding(&mut analyzer, &path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Multiple faces detected (2). Only one face is allowed."
        );
    }

    #[test]
    fn test_missing_embedding_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(&dir);

        let mut analyzer = FakeAnalyzer::returning(vec![face_with(None)]);
        let err = extract_embedding(&mut analyzer, &path).unwrap_err();
        assert_eq!(err.to_string(), "Failed to extract face embedding.");
    }

    #[test]
    fn test_empty_embedding_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(&dir);

        let mut analyzer = FakeAnalyzer::returning(vec![face_with(Some(vec![]))]);
        let err = extract_embedding(&mut analyzer, &path).unwrap_err();
        assert!(matches!(err, ExtractionError::EmbeddingUnavailable));
    }

    #[test]
    fn test_successful_extraction_is_unit_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(&dir);

        let mut analyzer = FakeAnalyzer::returning(vec![face_with(Some(vec![3.0, 4.0]))]);
        let embedding = extract_embedding(&mut analyzer, &path).unwrap();

        let norm: f32 = embedding.values().iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_analyzer_failure_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(&dir);

        let mut analyzer = FakeAnalyzer::failing("tensor shape mismatch");
        let err = extract_embedding(&mut analyzer, &path).unwrap_err();
        assert!(matches!(err, ExtractionError::Analyzer(_)));
        assert!(err.to_string().contains("tensor shape mismatch"));
    }
}
