//! Chart Pipeline
//! Runs synthesize -> render -> write for each chart, in a fixed order.
//!
//! The first failure aborts the run; charts after it are not attempted.

use crate::artifact::{Artifact, ArtifactWriter};
use crate::charts::{Canvas, ChartKind, ChartRenderer, ChartSpec, Theme};
use crate::data::DataSynthesizer;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rand::Rng;
use std::io::{self, Write};

/// Artifacts land here, relative to the working directory.
pub const OUTPUT_DIR: &str = "images";

pub struct ChartPipeline<R: Rng> {
    theme: Theme,
    synthesizer: DataSynthesizer<R>,
    writer: ArtifactWriter,
    /// End of the simulated sensor window.
    anchor: NaiveDateTime,
}

impl<R: Rng> ChartPipeline<R> {
    pub fn new(
        theme: Theme,
        synthesizer: DataSynthesizer<R>,
        writer: ArtifactWriter,
        anchor: NaiveDateTime,
    ) -> Self {
        Self {
            theme,
            synthesizer,
            writer,
            anchor,
        }
    }

    /// Generate every chart and report progress on stdout.
    pub fn run(&mut self) -> Result<Vec<Artifact>> {
        let stdout = io::stdout();
        self.run_reporting(&mut stdout.lock())
    }

    /// Generate every chart, writing one progress line per chart to `out`.
    pub fn run_reporting<W: Write>(&mut self, out: &mut W) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::with_capacity(ChartKind::ALL.len());
        writeln!(out, "Generating performance and sensor charts...")?;

        for kind in ChartKind::ALL {
            let artifact = self
                .generate(kind)
                .with_context(|| format!("Failed to generate {}", kind.file_name()))?;
            writeln!(out, "✓ {} chart created", kind.label())?;
            artifacts.push(artifact);
        }

        writeln!(
            out,
            "\nAll charts generated successfully in {}/",
            self.writer.output_dir().display()
        )?;
        Ok(artifacts)
    }

    /// One chart: fresh dataset and spec, render, persist.
    pub fn generate(&mut self, kind: ChartKind) -> Result<Artifact> {
        let spec = ChartSpec::builtin(kind, &self.theme);
        let canvas = self.render(&spec)?;
        let artifact = self.writer.write(canvas, spec.file_name())?;
        Ok(artifact)
    }

    fn render(&mut self, spec: &ChartSpec) -> Result<Canvas> {
        let theme = &self.theme;
        let canvas = match spec.kind {
            ChartKind::SensorAccuracy => {
                let data = self.synthesizer.sensor_accuracy();
                ChartRenderer::sensor_accuracy(&data, spec, theme)?
            }
            ChartKind::SystemPerformance => {
                let data = self.synthesizer.system_performance();
                ChartRenderer::system_performance(&data, spec, theme)?
            }
            ChartKind::NetworkReliability => {
                let data = self.synthesizer.network_reliability()?;
                ChartRenderer::network_reliability(&data, spec, theme)?
            }
            ChartKind::SensorSimulation => {
                let data = self.synthesizer.sensor_simulation(self.anchor)?;
                ChartRenderer::sensor_simulation(&data, spec, theme)?
            }
            ChartKind::MemoryUsage => {
                let data = self.synthesizer.memory_usage()?;
                ChartRenderer::memory_usage(&data, spec, theme)?
            }
        };
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn pipeline(dir: &Path, seed: u64) -> ChartPipeline<StdRng> {
        let theme = Theme::documentation().with_dpi(40);
        let anchor = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        ChartPipeline::new(
            theme,
            DataSynthesizer::seeded(seed),
            ArtifactWriter::new(dir, &theme),
            anchor,
        )
    }

    fn listing(dir: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_run_writes_one_artifact_per_chart() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = pipeline(dir.path(), 3).run().unwrap();

        assert_eq!(artifacts.len(), ChartKind::ALL.len());
        for (artifact, kind) in artifacts.iter().zip(ChartKind::ALL) {
            assert_eq!(artifact.path, dir.path().join(kind.file_name()));
            assert!(artifact.bytes > 0);
            assert_eq!(fs::metadata(&artifact.path).unwrap().len(), artifact.bytes);
        }
    }

    #[test]
    fn test_progress_report_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        pipeline(dir.path(), 3).run_reporting(&mut out).unwrap();

        let report = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Generating performance and sensor charts...");
        assert_eq!(lines[1], "✓ Sensor accuracy chart created");
        assert_eq!(lines[5], "✓ Memory usage chart created");
        assert_eq!(lines[6], "");
        assert!(lines[7].starts_with("All charts generated successfully in "));
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_failed_run_reports_only_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let result = pipeline(&dir.path().join(OUTPUT_DIR), 3).run_reporting(&mut out);

        assert!(result.is_err());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Generating performance and sensor charts...\n"
        );
    }

    #[test]
    fn test_second_run_overwrites_same_paths() {
        let dir = tempfile::tempdir().unwrap();
        let first: Vec<PathBuf> = pipeline(dir.path(), 3)
            .run()
            .unwrap()
            .into_iter()
            .map(|a| a.path)
            .collect();
        let second: Vec<PathBuf> = pipeline(dir.path(), 4)
            .run()
            .unwrap()
            .into_iter()
            .map(|a| a.path)
            .collect();

        assert_eq!(first, second);
        assert_eq!(listing(dir.path()).len(), ChartKind::ALL.len());
    }

    #[test]
    fn test_missing_output_dir_aborts_on_first_chart() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(OUTPUT_DIR);

        let err = pipeline(&missing, 3).run().unwrap_err();
        assert!(err.to_string().contains(ChartKind::SensorAccuracy.file_name()));
        assert!(!missing.exists());
        assert!(listing(dir.path()).is_empty());
    }
}
