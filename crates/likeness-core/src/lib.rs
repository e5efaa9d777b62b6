//! likeness-core — Face detection and embedding engine.
//!
//! Uses SCRFD for face detection and ArcFace for embedding extraction,
//! both running via ONNX Runtime for CPU inference. The analyzer sits
//! behind the [`FaceAnalyzer`] trait so the comparison pipeline can run
//! against alternative backends (or fakes, in tests).

pub mod alignment;
pub mod analyzer;
pub mod detector;
pub mod extractor;
pub mod recognizer;
pub mod types;

pub use analyzer::{AnalyzerError, DetectedFace, FaceAnalyzer, OnnxFaceAnalyzer};
pub use extractor::{extract_embedding, ExtractionError};
pub use types::{compare, BoundingBox, ComparisonResult, Embedding, MATCH_THRESHOLD};

use std::path::PathBuf;

/// Default directory for the ONNX model bundle:
/// `$XDG_DATA_HOME/likeness/models` (falling back to `~/.local/share`).
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("likeness/models")
}
