use anyhow::Result;
use clap::{Parser, Subcommand};
use likeness_core::{compare, extract_embedding, OnnxFaceAnalyzer, MATCH_THRESHOLD};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "likeness", about = "Likeness face comparison CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the faces in two images without the daemon
    Compare {
        image1: PathBuf,
        image2: PathBuf,
        /// Directory containing the ONNX model bundle
        #[arg(long)]
        model_dir: Option<PathBuf>,
        /// Cosine similarity threshold for a positive match
        #[arg(long, default_value_t = MATCH_THRESHOLD)]
        threshold: f32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            image1,
            image2,
            model_dir,
            threshold,
        } => {
            let model_dir = model_dir.unwrap_or_else(likeness_core::default_model_dir);
            let mut analyzer = OnnxFaceAnalyzer::load(&model_dir)?;

            let result1 = extract_embedding(&mut analyzer, &image1);
            let result2 = extract_embedding(&mut analyzer, &image2);

            let body = match (result1, result2) {
                (Ok(embedding1), Ok(embedding2)) => {
                    let result = compare(&embedding1, &embedding2, threshold);
                    serde_json::json!({
                        "match": if result.matched { "YES ✅" } else { "NO ❌" },
                        "similarity_score": result.similarity,
                    })
                }
                // image1's error takes precedence when both fail.
                (Err(err), _) | (_, Err(err)) => serde_json::json!({
                    "match": "NO ❌",
                    "similarity_score": 0.0,
                    "message": err.to_string(),
                }),
            };

            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
