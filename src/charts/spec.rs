//! Chart Specification Module
//! Titles, axis labels, color assignments and output names for each chart,
//! kept separate from the data they describe.

use crate::charts::theme::Theme;
use crate::data::PoolKind;
use plotters::style::RGBColor;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("{chart}: spec declares {declared} {what} but the dataset has {actual}")]
    SpecMismatch {
        chart: &'static str,
        what: &'static str,
        declared: usize,
        actual: usize,
    },
    #[error("{chart}: series '{name}' is declared twice")]
    DuplicateSeries { chart: &'static str, name: String },
    #[error("{chart}: color of series '{name}' is already assigned to another series")]
    SharedColor { chart: &'static str, name: String },
    #[error("{chart}: series {index} is declared as '{declared}' but the dataset has '{actual}'")]
    SeriesOrder {
        chart: &'static str,
        index: usize,
        declared: String,
        actual: String,
    },
    #[error("spec for {expected} was handed to the {actual} renderer")]
    WrongKind {
        expected: &'static str,
        actual: &'static str,
    },
}

/// The five documentation charts, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    SensorAccuracy,
    SystemPerformance,
    NetworkReliability,
    SensorSimulation,
    MemoryUsage,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::SensorAccuracy,
        ChartKind::SystemPerformance,
        ChartKind::NetworkReliability,
        ChartKind::SensorSimulation,
        ChartKind::MemoryUsage,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::SensorAccuracy => "sensor_accuracy.png",
            ChartKind::SystemPerformance => "system_performance.png",
            ChartKind::NetworkReliability => "network_reliability.png",
            ChartKind::SensorSimulation => "sensor_data_simulation.png",
            ChartKind::MemoryUsage => "memory_usage.png",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::SensorAccuracy => "Sensor accuracy",
            ChartKind::SystemPerformance => "System performance",
            ChartKind::NetworkReliability => "Network reliability",
            ChartKind::SensorSimulation => "Sensor data simulation",
            ChartKind::MemoryUsage => "Memory usage",
        }
    }
}

/// Figure size in inches; pixels follow from the theme DPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl FigureSize {
    pub const fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    None,
    Circle,
    Square,
}

/// One category or series and the color that identifies it.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub name: String,
    pub color: RGBColor,
}

impl SeriesStyle {
    pub fn new(name: &str, color: RGBColor) -> Self {
        Self {
            name: name.to_string(),
            color,
        }
    }
}

/// One plotting area: a panel of a stacked chart, one pie of a pair, or
/// the whole figure for single-panel charts.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub y_range: Option<(f64, f64)>,
    pub marker: Marker,
}

impl PanelSpec {
    pub fn new() -> Self {
        Self {
            title: None,
            x_label: None,
            y_label: None,
            y_range: None,
            marker: Marker::None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn x_label(mut self, label: &str) -> Self {
        self.x_label = Some(label.to_string());
        self
    }

    pub fn y_label(mut self, label: &str) -> Self {
        self.y_label = Some(label.to_string());
        self
    }

    pub fn y_range(mut self, min: f64, max: f64) -> Self {
        self.y_range = Some((min, max));
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: Option<String>,
    pub figure: FigureSize,
    pub series: Vec<SeriesStyle>,
    pub panels: Vec<PanelSpec>,
}

impl ChartSpec {
    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }

    /// Reject a spec that does not line up with the dataset it will draw.
    /// `series` are the dataset's category or series names in draw order.
    pub fn check(&self, kind: ChartKind, series: &[&str], panels: usize) -> Result<(), SpecError> {
        if self.kind != kind {
            return Err(SpecError::WrongKind {
                expected: self.kind.label(),
                actual: kind.label(),
            });
        }
        let chart = kind.label();
        if self.series.len() != series.len() {
            return Err(SpecError::SpecMismatch {
                chart,
                what: "series",
                declared: self.series.len(),
                actual: series.len(),
            });
        }
        if self.panels.len() != panels {
            return Err(SpecError::SpecMismatch {
                chart,
                what: "panels",
                declared: self.panels.len(),
                actual: panels,
            });
        }

        let mut names = HashSet::new();
        let mut colors = HashSet::new();
        for style in &self.series {
            if !names.insert(style.name.as_str()) {
                return Err(SpecError::DuplicateSeries {
                    chart,
                    name: style.name.clone(),
                });
            }
            if !colors.insert(style.color) {
                return Err(SpecError::SharedColor {
                    chart,
                    name: style.name.clone(),
                });
            }
        }

        for (index, (style, actual)) in self.series.iter().zip(series).enumerate() {
            if style.name != *actual {
                return Err(SpecError::SeriesOrder {
                    chart,
                    index,
                    declared: style.name.clone(),
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn color_of(&self, index: usize) -> Option<RGBColor> {
        self.series.get(index).map(|s| s.color)
    }

    /// The built-in spec for `kind`.
    pub fn builtin(kind: ChartKind, theme: &Theme) -> Self {
        match kind {
            ChartKind::SensorAccuracy => Self::sensor_accuracy(theme),
            ChartKind::SystemPerformance => Self::system_performance(theme),
            ChartKind::NetworkReliability => Self::network_reliability(theme),
            ChartKind::SensorSimulation => Self::sensor_simulation(theme),
            ChartKind::MemoryUsage => Self::memory_usage(theme),
        }
    }

    fn palette_series(theme: &Theme, names: &[&str]) -> Vec<SeriesStyle> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| SeriesStyle::new(name, theme.palette(i)))
            .collect()
    }

    pub fn sensor_accuracy(theme: &Theme) -> Self {
        Self {
            kind: ChartKind::SensorAccuracy,
            title: Some("ESP32-S3 Aquaculture IoT System - Sensor Accuracy".to_string()),
            figure: FigureSize::new(12.0, 8.0),
            series: Self::palette_series(
                theme,
                &["Water Temp", "pH", "Turbidity", "Air Temp", "Humidity", "DO", "Ammonia"],
            ),
            panels: vec![PanelSpec::new().y_label("Accuracy")],
        }
    }

    pub fn system_performance(theme: &Theme) -> Self {
        Self {
            kind: ChartKind::SystemPerformance,
            title: Some("ESP32-S3 System Performance Metrics".to_string()),
            figure: FigureSize::new(12.0, 8.0),
            series: Self::palette_series(
                theme,
                &[
                    "Boot Time",
                    "WiFi Connect",
                    "Sensor Cycle",
                    "HTTP Request",
                    "Memory Usage",
                    "Flash Usage",
                ],
            ),
            panels: vec![PanelSpec::new().x_label("Performance Score")],
        }
    }

    pub fn network_reliability(theme: &Theme) -> Self {
        Self {
            kind: ChartKind::NetworkReliability,
            title: None,
            figure: FigureSize::new(14.0, 10.0),
            series: vec![
                SeriesStyle::new("Success Rate", theme.palette(1)),
                SeriesStyle::new("Response Time", theme.palette(0)),
            ],
            panels: vec![
                PanelSpec::new()
                    .title("Network Transmission Reliability (24 Hours)")
                    .y_label("Success Rate (%)")
                    .y_range(94.0, 101.0)
                    .marker(Marker::Circle),
                PanelSpec::new()
                    .title("Average HTTP Response Time (24 Hours)")
                    .x_label("Hour of Day")
                    .y_label("Response Time (s)")
                    .y_range(0.0, 7.0)
                    .marker(Marker::Square),
            ],
        }
    }

    pub fn sensor_simulation(theme: &Theme) -> Self {
        Self {
            kind: ChartKind::SensorSimulation,
            title: None,
            figure: FigureSize::new(16.0, 12.0),
            series: Self::palette_series(theme, &["Water Temp", "pH", "Turbidity"]),
            panels: vec![
                PanelSpec::new()
                    .title("Aquaculture Sensor Data - 4 Day Simulation")
                    .y_label("Water Temp (°C)")
                    .y_range(20.0, 30.0),
                PanelSpec::new().y_label("pH Level").y_range(6.5, 8.0),
                PanelSpec::new()
                    .x_label("Time")
                    .y_label("Turbidity (NTU)")
                    .y_range(5.0, 25.0),
            ],
        }
    }

    pub fn memory_usage(theme: &Theme) -> Self {
        Self {
            kind: ChartKind::MemoryUsage,
            title: None,
            figure: FigureSize::new(14.0, 7.0),
            series: vec![
                SeriesStyle::new("RAM", theme.pool_color(PoolKind::Ram)),
                SeriesStyle::new("Flash", theme.pool_color(PoolKind::Flash)),
            ],
            panels: vec![
                PanelSpec::new().title("RAM Usage (512KB Total)"),
                PanelSpec::new().title("Flash Usage (4MB Total)"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_specs_are_consistent() {
        let theme = Theme::documentation();
        for kind in ChartKind::ALL {
            let spec = ChartSpec::builtin(kind, &theme);
            assert_eq!(spec.kind, kind);
            let names: Vec<&str> = spec.series.iter().map(|s| s.name.as_str()).collect();
            spec.check(kind, &names, spec.panels.len()).unwrap();
        }
    }

    #[test]
    fn test_file_names_are_unique() {
        let names: HashSet<&str> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(names.len(), ChartKind::ALL.len());
    }

    #[test]
    fn test_series_count_mismatch() {
        let spec = ChartSpec::sensor_accuracy(&Theme::documentation());
        let names = ["Water Temp", "pH", "Turbidity", "Air Temp", "Humidity", "DO"];
        let err = spec.check(ChartKind::SensorAccuracy, &names, 1).unwrap_err();
        assert!(matches!(
            err,
            SpecError::SpecMismatch {
                declared: 7,
                actual: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let spec = ChartSpec::memory_usage(&Theme::documentation());
        assert!(matches!(
            spec.check(ChartKind::SensorAccuracy, &["RAM", "Flash"], 2),
            Err(SpecError::WrongKind { .. })
        ));
    }

    const RELIABILITY: [&str; 2] = ["Success Rate", "Response Time"];

    #[test]
    fn test_duplicate_and_shared_colors_rejected() {
        let theme = Theme::documentation();
        let mut spec = ChartSpec::network_reliability(&theme);
        spec.series[1].name = "Success Rate".to_string();
        assert!(matches!(
            spec.check(ChartKind::NetworkReliability, &RELIABILITY, 2),
            Err(SpecError::DuplicateSeries { .. })
        ));

        let mut spec = ChartSpec::network_reliability(&theme);
        spec.series[1].color = spec.series[0].color;
        assert!(matches!(
            spec.check(ChartKind::NetworkReliability, &RELIABILITY, 2),
            Err(SpecError::SharedColor { .. })
        ));
    }

    #[test]
    fn test_reordered_series_rejected() {
        let mut spec = ChartSpec::memory_usage(&Theme::documentation());
        spec.series.swap(0, 1);

        let err = spec
            .check(ChartKind::MemoryUsage, &["RAM", "Flash"], 2)
            .unwrap_err();
        assert!(matches!(
            err,
            SpecError::SeriesOrder { index: 0, ref declared, ref actual, .. }
                if declared == "Flash" && actual == "RAM"
        ));
    }

    #[test]
    fn test_panel_ranges_match_clamp_bounds() {
        let spec = ChartSpec::sensor_simulation(&Theme::documentation());
        let ranges: Vec<_> = spec.panels.iter().map(|p| p.y_range).collect();
        assert_eq!(
            ranges,
            [Some((20.0, 30.0)), Some((6.5, 8.0)), Some((5.0, 25.0))]
        );
        assert!(spec.panels[..2].iter().all(|p| p.x_label.is_none()));
        assert_eq!(spec.panels[2].x_label.as_deref(), Some("Time"));
    }
}
