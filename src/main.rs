//! Docs Chart Gen - Documentation chart generator
//!
//! Synthesizes representative sensor and performance data for the aquaculture
//! monitor and renders the five static charts embedded in its documentation.

mod artifact;
mod charts;
mod data;
mod pipeline;

use artifact::ArtifactWriter;
use charts::Theme;
use data::DataSynthesizer;
use pipeline::{ChartPipeline, OUTPUT_DIR};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs stay quiet unless RUST_LOG asks for them
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Theme is configured once and shared by every chart
    let theme = Theme::documentation();
    let writer = ArtifactWriter::new(OUTPUT_DIR, &theme);
    let anchor = chrono::Local::now().naive_local();

    let mut pipeline = ChartPipeline::new(theme, DataSynthesizer::from_entropy(), writer, anchor);
    let artifacts = pipeline.run()?;

    tracing::debug!(count = artifacts.len(), "run complete");
    Ok(())
}
