//! Canvas Module
//! An owned RGB pixel buffer that charts are drawn into.
//!
//! Rendering never touches the filesystem: the canvas is handed to the
//! artifact writer, which consumes it. Dropping the canvas releases the
//! buffer on every path, including failed writes.

use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::{BitMapBackend, DrawingArea, IntoDrawingArea};

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// A white canvas of `width` x `height` pixels.
    pub fn new((width, height): (u32, u32)) -> Self {
        Self {
            width,
            height,
            pixels: vec![255; width as usize * height as usize * 3],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Root drawing area borrowing the pixel buffer.
    pub fn drawing_area(&mut self) -> DrawingArea<BitMapBackend<'_>, Shift> {
        BitMapBackend::with_buffer(&mut self.pixels, (self.width, self.height)).into_drawing_area()
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        Some([
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ])
    }

    /// Number of pixels that differ from `background`.
    #[cfg(test)]
    pub fn inked_pixels(&self, background: [u8; 3]) -> usize {
        self.pixels
            .chunks_exact(3)
            .filter(|px| *px != background)
            .count()
    }

    /// Hand the buffer over as an image. `None` only if the buffer was
    /// resized behind the canvas' back.
    pub fn into_image(self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.pixels)
    }
}
