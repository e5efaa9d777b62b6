use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// Address the HTTP server binds to (default: 127.0.0.1:8000).
    pub bind_addr: String,
    /// Directory containing the ONNX model bundle.
    pub model_dir: PathBuf,
    /// Directory for transient upload files; OS temp dir when unset.
    pub upload_dir: Option<PathBuf>,
    /// Cosine similarity threshold for a positive match.
    pub match_threshold: f32,
    /// Per-request body size cap in bytes.
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from `LIKENESS_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("LIKENESS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| likeness_core::default_model_dir());

        Self {
            bind_addr: std::env::var("LIKENESS_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8000".to_string()),
            model_dir,
            upload_dir: std::env::var("LIKENESS_UPLOAD_DIR").map(PathBuf::from).ok(),
            match_threshold: env_f32("LIKENESS_MATCH_THRESHOLD", likeness_core::MATCH_THRESHOLD),
            max_upload_bytes: env_usize("LIKENESS_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
