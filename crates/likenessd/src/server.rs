//! HTTP surface: routing, multipart ingestion, and the comparison
//! orchestrator.
//!
//! Every outcome of the comparison endpoint — including storage and
//! extraction failures — is an HTTP 200 with the uniform response shape;
//! errors travel in the payload, never as protocol failures.

use crate::engine::EngineHandle;
use crate::storage::UploadStore;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use likeness_core::{compare, ComparisonResult};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MATCH_YES: &str = "YES ✅";
const MATCH_NO: &str = "NO ❌";
const STORAGE_FAILURE_MESSAGE: &str = "Failed to save uploaded images.";

/// Shared per-process state handed to the handler.
pub struct AppState {
    pub engine: EngineHandle,
    pub store: UploadStore,
    pub match_threshold: f32,
}

/// Response body for every path of the comparison endpoint.
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    #[serde(rename = "match")]
    pub verdict: &'static str,
    pub similarity_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CompareResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            verdict: MATCH_NO,
            similarity_score: 0.0,
            message: Some(message.into()),
        }
    }

    fn from_result(result: ComparisonResult) -> Self {
        Self {
            verdict: if result.matched { MATCH_YES } else { MATCH_NO },
            similarity_score: result.similarity,
            message: None,
        }
    }
}

/// Build the application router: the single comparison endpoint, permissive
/// CORS (deployments front this with their own policy), request tracing,
/// and the configured upload size cap.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/compare_faces", post(compare_faces))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /compare_faces
///
/// Store both uploads, extract both embeddings, release the transient files,
/// compare. Terminal states only: no retries, no partial responses.
async fn compare_faces(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Json<CompareResponse> {
    let Some((image1, image2)) = read_uploads(multipart).await else {
        return Json(CompareResponse::failure(STORAGE_FAILURE_MESSAGE));
    };

    let stored1 = state.store.store(&image1);
    let stored2 = state.store.store(&image2);

    let (Ok(upload1), Ok(upload2)) = (stored1, stored2) else {
        // Whichever of the two did get stored is released by its guard here.
        return Json(CompareResponse::failure(STORAGE_FAILURE_MESSAGE));
    };

    let result1 = state.engine.extract(upload1.path().to_path_buf()).await;
    let result2 = state.engine.extract(upload2.path().to_path_buf()).await;

    // Transient files are released before the response is built.
    drop(upload1);
    drop(upload2);

    match (result1, result2) {
        (Ok(embedding1), Ok(embedding2)) => {
            let result = compare(&embedding1, &embedding2, state.match_threshold);
            tracing::debug!(
                similarity = result.similarity,
                matched = result.matched,
                "comparison complete"
            );
            Json(CompareResponse::from_result(result))
        }
        // image1's error takes precedence when both extractions fail.
        (Err(err), _) => Json(CompareResponse::failure(err.to_string())),
        (_, Err(err)) => Json(CompareResponse::failure(err.to_string())),
    }
}

/// Pull the `image1` and `image2` file fields out of a multipart body.
/// Returns `None` when either field is missing or unreadable.
async fn read_uploads(mut multipart: Multipart) -> Option<(Vec<u8>, Vec<u8>)> {
    let mut image1: Option<Vec<u8>> = None;
    let mut image2: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        let name = field.name().unwrap_or("").to_string();

        if name == "image1" {
            image1 = field.bytes().await.ok().map(|b| b.to_vec());
        } else if name == "image2" {
            image2 = field.bytes().await.ok().map(|b| b.to_vec());
        }
    }

    Some((image1?, image2?))
}
