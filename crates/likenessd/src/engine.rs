//! Inference engine thread.
//!
//! The face analyzer lives on a dedicated OS thread running a blocking
//! request loop; handlers reach it through a clone-safe [`EngineHandle`].
//! This keeps decode and model inference off the async runtime and
//! serializes access to the ONNX sessions.

use likeness_core::{extract_embedding, Embedding, ExtractionError, FaceAnalyzer};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Extraction(#[from] ExtractionError),
    #[error("analysis engine unavailable")]
    ChannelClosed,
}

enum EngineRequest {
    Extract {
        path: PathBuf,
        reply: oneshot::Sender<Result<Embedding, ExtractionError>>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Extract the single-face embedding from the image at `path`.
    pub async fn extract(&self, path: PathBuf) -> Result<Embedding, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Extract {
                path,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        let result = reply_rx.await.map_err(|_| EngineError::ChannelClosed)?;
        Ok(result?)
    }
}

/// Spawn the engine on a dedicated OS thread, taking ownership of the
/// analyzer. The thread exits when every handle is dropped.
pub fn spawn_engine<A>(mut analyzer: A) -> EngineHandle
where
    A: FaceAnalyzer + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(4);

    std::thread::Builder::new()
        .name("likeness-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Extract { path, reply } => {
                        let result = extract_embedding(&mut analyzer, &path);
                        if let Err(err) = &result {
                            tracing::warn!(path = %path.display(), error = %err, "extraction failed");
                        }
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })
        .expect("failed to spawn engine thread");

    EngineHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use likeness_core::{AnalyzerError, BoundingBox, DetectedFace};

    struct OneFaceAnalyzer;

    impl FaceAnalyzer for OneFaceAnalyzer {
        fn analyze(
            &mut self,
            _image: &image::DynamicImage,
        ) -> Result<Vec<DetectedFace>, AnalyzerError> {
            Ok(vec![DetectedFace {
                bbox: BoundingBox {
                    x: 0.0,
                    y: 0.0,
                    width: 20.0,
                    height: 20.0,
                    confidence: 0.9,
                    landmarks: None,
                },
                embedding: Some(vec![0.0, 3.0, 4.0]),
            }])
        }
    }

    #[tokio::test]
    async fn test_extract_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.png");
        image::GrayImage::from_pixel(4, 4, image::Luma([80u8]))
            .save(&path)
            .unwrap();

        let engine = spawn_engine(OneFaceAnalyzer);
        let embedding = engine.extract(path).await.unwrap();
        assert!((embedding.values()[1] - 0.6).abs() < 1e-6);
        assert!((embedding.values()[2] - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_extraction_error_reaches_caller() {
        let engine = spawn_engine(OneFaceAnalyzer);
        let err = engine
            .extract(PathBuf::from("/nonexistent/image.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid or corrupted image file"));
    }
}
