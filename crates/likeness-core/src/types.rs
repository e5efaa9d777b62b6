use serde::{Deserialize, Serialize};

/// Default cosine similarity threshold for a positive match.
///
/// Calibrated for ArcFace w600k_r50 embeddings; a different model bundle
/// needs its own threshold, so the daemon exposes this as configuration.
pub const MATCH_THRESHOLD: f32 = 0.30;

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

/// Face embedding vector (512-dimensional for ArcFace), unit-normalized
/// at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    values: Vec<f32>,
}

impl Embedding {
    /// Build a unit-normalized embedding from a raw vector.
    ///
    /// Returns `None` for an empty vector — an embedding with no components
    /// is never valid. A zero vector is kept as-is (its norm is undefined).
    pub fn unit_normalized(raw: Vec<f32>) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
        let values = if norm > 0.0 {
            raw.iter().map(|x| x / norm).collect()
        } else {
            raw
        };
        Some(Self { values })
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Compute cosine similarity between two embeddings.
    ///
    /// Returns a value in [-1, 1]. Higher = more similar. Computes the full
    /// `dot / (‖a‖·‖b‖)` formula rather than assuming unit inputs, so the
    /// comparator stays correct for callers holding unnormalized vectors.
    pub fn similarity(&self, other: &Embedding) -> f32 {
        let mut dot = 0.0f32;
        let mut norm_a = 0.0f32;
        let mut norm_b = 0.0f32;

        for (a, b) in self.values.iter().zip(other.values.iter()) {
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        let denom = norm_a.sqrt() * norm_b.sqrt();
        if denom > 0.0 { dot / denom } else { 0.0 }
    }
}

/// Outcome of comparing two face embeddings.
///
/// `similarity` is rounded to 3 decimals for presentation; the verdict is
/// decided on the unrounded value.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub matched: bool,
    pub similarity: f32,
}

/// Compare two embeddings: cosine similarity against a decision threshold.
///
/// The match requires strictly greater similarity than the threshold.
pub fn compare(a: &Embedding, b: &Embedding, threshold: f32) -> ComparisonResult {
    let similarity = a.similarity(b);
    ComparisonResult {
        matched: similarity > threshold,
        similarity: round3(similarity),
    }
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}
