//! Chart Theme Module
//! The single visual theme shared by every documentation chart.
//!
//! Built once in `main` and handed to each render call, so all charts agree
//! on palette order, grid transparency and the bold-annotation convention.

use crate::charts::spec::FigureSize;
use crate::data::PoolKind;
use plotters::style::{
    Color, FontDesc, FontStyle, IntoFont, RGBColor, ShapeStyle, TextStyle, BLACK, WHITE,
};

/// Category palette, assigned in order.
pub const PALETTE: [RGBColor; 7] = [
    RGBColor(0xFF, 0x6B, 0x6B), // Coral
    RGBColor(0x4E, 0xCD, 0xC4), // Teal
    RGBColor(0x45, 0xB7, 0xD1), // Sky
    RGBColor(0x96, 0xCE, 0xB4), // Sage
    RGBColor(0xFF, 0xEA, 0xA7), // Sand
    RGBColor(0xDD, 0xA0, 0xDD), // Plum
    RGBColor(0x98, 0xD8, 0xC8), // Mint
];

/// Free space in every resource pie.
pub const AVAILABLE_COLOR: RGBColor = RGBColor(0xE8, 0xE8, 0xE8);

pub const DOCUMENTATION_DPI: u32 = 300;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub font_family: &'static str,
    pub dpi: u32,
    pub background: RGBColor,
    pub text: RGBColor,
    pub available: RGBColor,
    pub grid_alpha: f64,
    pub fill_alpha: f64,
    /// Whitespace kept around the content when cropping, in inches.
    pub pad_inches: f64,
}

impl Theme {
    pub fn documentation() -> Self {
        Self {
            font_family: "sans-serif",
            dpi: DOCUMENTATION_DPI,
            background: WHITE,
            text: BLACK,
            available: AVAILABLE_COLOR,
            grid_alpha: 0.3,
            fill_alpha: 0.3,
            pad_inches: 0.1,
        }
    }

    /// Same theme at another resolution.
    #[cfg(test)]
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Convert typographic points to pixels at this DPI.
    pub fn pt(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }

    /// Whole pixels for layout sizes given in points.
    pub fn px(&self, points: f64) -> u32 {
        self.pt(points).round().max(1.0) as u32
    }

    pub fn figure_pixels(&self, figure: FigureSize) -> (u32, u32) {
        (
            (figure.width_in * self.dpi as f64).round() as u32,
            (figure.height_in * self.dpi as f64).round() as u32,
        )
    }

    pub fn pad_pixels(&self) -> u32 {
        (self.pad_inches * self.dpi as f64).round() as u32
    }

    pub fn palette(&self, index: usize) -> RGBColor {
        PALETTE[index % PALETTE.len()]
    }

    /// The "used" wedge color for a pool never changes between charts.
    pub fn pool_color(&self, pool: PoolKind) -> RGBColor {
        match pool {
            PoolKind::Ram => PALETTE[0],
            PoolKind::Flash => PALETTE[1],
        }
    }

    pub fn font(&self, points: f64) -> FontDesc<'static> {
        (self.font_family, self.pt(points)).into_font()
    }

    /// Titles, axis descriptions and value annotations are bold.
    pub fn bold(&self, points: f64) -> FontDesc<'static> {
        self.font(points).style(FontStyle::Bold)
    }

    pub fn bold_text(&self, points: f64) -> TextStyle<'static> {
        self.bold(points).color(&self.text)
    }

    pub fn grid_style(&self) -> ShapeStyle {
        self.text.mix(self.grid_alpha).stroke_width(self.px(0.8))
    }

    pub fn fine_grid_style(&self) -> ShapeStyle {
        self.text.mix(self.grid_alpha * 0.3).stroke_width(self.px(0.5))
    }

    pub fn area_fill(&self, color: RGBColor) -> ShapeStyle {
        color.mix(self.fill_alpha).filled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_scale_with_dpi() {
        let theme = Theme::documentation();
        assert_eq!(theme.pt(72.0), 300.0);
        assert_eq!(theme.with_dpi(72).pt(12.0), 12.0);
    }

    #[test]
    fn test_figure_pixels_at_documentation_dpi() {
        let theme = Theme::documentation();
        let figure = FigureSize::new(12.0, 8.0);
        assert_eq!(theme.figure_pixels(figure), (3600, 2400));
        assert_eq!(theme.pad_pixels(), 30);
    }

    #[test]
    fn test_pool_colors_are_distinct_and_stable() {
        let theme = Theme::documentation();
        assert_ne!(theme.pool_color(PoolKind::Ram), theme.pool_color(PoolKind::Flash));
        assert_eq!(theme.pool_color(PoolKind::Ram), theme.pool_color(PoolKind::Ram));
        assert_ne!(theme.pool_color(PoolKind::Ram), theme.available);
    }
}
