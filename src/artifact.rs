//! Artifact Writer Module
//! Crops a rendered canvas to its content and persists it as a PNG.
//!
//! The image is staged in a temporary file next to its destination and
//! renamed into place, so a failed write never leaves a partial file at the
//! final path and never disturbs artifacts already written.

use crate::charts::{Canvas, Theme};
use image::codecs::png::PngEncoder;
use image::{imageops, ExtendedColorType, ImageEncoder, ImageError, RgbImage};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Output directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("Canvas buffer does not match its {width}x{height} dimensions")]
    CorruptCanvas { width: u32, height: u32 },
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

/// A chart image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub dpi: u32,
    pub bytes: u64,
}

/// Writes canvases into a fixed output directory.
pub struct ArtifactWriter {
    output_dir: PathBuf,
    background: [u8; 3],
    pad: u32,
    dpi: u32,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>, theme: &Theme) -> Self {
        let bg = theme.background;
        Self {
            output_dir: output_dir.into(),
            background: [bg.0, bg.1, bg.2],
            pad: theme.pad_pixels(),
            dpi: theme.dpi,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Crop, encode and atomically place `canvas` at `output_dir/file_name`,
    /// replacing any previous artifact of the same name. The canvas is
    /// consumed whether or not the write succeeds.
    pub fn write(&self, canvas: Canvas, file_name: &str) -> Result<Artifact, WriteError> {
        let path = self.output_dir.join(file_name);
        if !self.output_dir.is_dir() {
            return Err(WriteError::MissingDirectory(self.output_dir.clone()));
        }

        let (width, height) = canvas.dimensions();
        let image = canvas
            .into_image()
            .ok_or(WriteError::CorruptCanvas { width, height })?;
        let image = self.crop(image);

        let io_err = |source| WriteError::Io {
            path: path.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(&self.output_dir).map_err(io_err)?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            PngEncoder::new(&mut writer)
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|source| WriteError::Encode {
                    path: path.clone(),
                    source,
                })?;
            writer.flush().map_err(io_err)?;
        }
        staged.as_file().sync_all().map_err(io_err)?;
        Self::publish_permissions(staged.as_file()).map_err(io_err)?;
        staged.persist(&path).map_err(|e| io_err(e.error))?;

        let bytes = fs::metadata(&path).map_err(io_err)?.len();
        tracing::info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            bytes,
            "artifact written"
        );

        Ok(Artifact {
            path,
            width: image.width(),
            height: image.height(),
            bit_depth: 8,
            dpi: self.dpi,
            bytes,
        })
    }

    /// Crop to the non-background content plus padding.
    fn crop(&self, image: RgbImage) -> RgbImage {
        let Some((x0, y0, x1, y1)) = Self::content_bounds(&image, self.background) else {
            return image;
        };
        let x0 = x0.saturating_sub(self.pad);
        let y0 = y0.saturating_sub(self.pad);
        let x1 = (x1 + self.pad).min(image.width() - 1);
        let y1 = (y1 + self.pad).min(image.height() - 1);

        tracing::debug!(x0, y0, x1, y1, "tight crop");
        imageops::crop_imm(&image, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image()
    }

    /// Inclusive bounding box of pixels that differ from `background`.
    fn content_bounds(image: &RgbImage, background: [u8; 3]) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, px) in image.enumerate_pixels() {
            if px.0 == background {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds
    }

    #[cfg(unix)]
    fn publish_permissions(file: &fs::File) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o644))
    }

    #[cfg(not(unix))]
    fn publish_permissions(_file: &fs::File) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::*;

    fn theme() -> Theme {
        Theme::documentation().with_dpi(50)
    }

    /// A 200x100 canvas with a single filled block, no text.
    fn block_canvas() -> Canvas {
        let mut canvas = Canvas::new((200, 100));
        {
            let root = canvas.drawing_area();
            root.draw(&Rectangle::new([(80, 40), (120, 60)], BLUE.filled()))
                .unwrap();
            root.present().unwrap();
        }
        canvas
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_crops_to_content() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path(), &theme());

        let artifact = writer.write(block_canvas(), "block.png").unwrap();
        assert!(artifact.bytes > 0);
        assert_eq!(artifact.bit_depth, 8);
        assert_eq!(artifact.dpi, 50);
        assert!(artifact.width < 200 && artifact.height < 100);
        // 0.1 inch of padding on each side of the block
        assert!(artifact.width >= 40 + 2 * 5);

        let decoded = image::open(&artifact.path).unwrap();
        assert_eq!(decoded.width(), artifact.width);
        assert_eq!(decoded.height(), artifact.height);
    }

    #[test]
    fn test_blank_canvas_kept_whole() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path(), &theme());

        let artifact = writer.write(Canvas::new((64, 48)), "blank.png").unwrap();
        assert_eq!((artifact.width, artifact.height), (64, 48));
    }

    #[test]
    fn test_rewrite_replaces_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path(), &theme());

        let first = writer.write(block_canvas(), "chart.png").unwrap();
        let second = writer.write(Canvas::new((64, 48)), "chart.png").unwrap();

        assert_eq!(first.path, second.path);
        assert_eq!(entries(dir.path()), ["chart.png"]);
        assert_eq!(image::open(&second.path).unwrap().width(), 64);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("images");
        let writer = ArtifactWriter::new(&missing, &theme());

        let err = writer.write(block_canvas(), "chart.png").unwrap_err();
        assert!(matches!(err, WriteError::MissingDirectory(_)));
        assert!(!missing.exists());
    }

    #[test]
    fn test_failure_leaves_other_artifacts_alone() {
        let dir = tempfile::tempdir().unwrap();
        let good = ArtifactWriter::new(dir.path(), &theme());
        let kept = good.write(block_canvas(), "kept.png").unwrap();
        let before = fs::read(&kept.path).unwrap();

        let bad = ArtifactWriter::new(dir.path().join("nope"), &theme());
        assert!(bad.write(block_canvas(), "kept.png").is_err());

        assert_eq!(fs::read(&kept.path).unwrap(), before);
        assert_eq!(entries(dir.path()), ["kept.png"]);
    }
}
