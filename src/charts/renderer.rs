//! Chart Renderer
//! Draws each documentation chart onto a fresh canvas.
//!
//! Charts:
//! 1. Sensor accuracy: vertical bars, each annotated with "<value><unit>"
//! 2. System performance: horizontal bars of normalized scores, annotated
//!    with the literal measured value
//! 3. Network reliability: two stacked panels over hour of day, shaded
//! 4. Sensor simulation: three stacked panels over a 4 day time axis
//! 5. Memory usage: two pies (used vs available) side by side
//!
//! Rendering reads only its dataset, spec and theme, and returns the
//! canvas. Persisting it is the artifact writer's job.

use crate::charts::canvas::Canvas;
use crate::charts::spec::{ChartKind, ChartSpec, Marker, PanelSpec, SpecError};
use crate::charts::theme::Theme;
use crate::data::{
    AccuracyDataset, MemoryDataset, PerformanceDataset, ReliabilityDataset, SensorDataset,
    TimeSeries,
};
use chrono::NaiveDateTime;
use plotters::chart::MeshStyle;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Malformed chart spec: {0}")]
    Spec(#[from] SpecError),
    #[error("Series '{0}' has no samples to plot")]
    EmptySeries(String),
    #[error("Drawing failed: {0}")]
    Backend(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Backend(err.to_string())
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Headroom above the tallest bar, leaving space for its annotation.
const BAR_HEADROOM: f64 = 1.15;
/// Horizontal bars need more room: the annotation sits to the right.
const BARH_HEADROOM: f64 = 1.3;

pub struct ChartRenderer;

impl ChartRenderer {
    /// Vertical bar per sensor, labelled with its declared accuracy and unit.
    pub fn sensor_accuracy(
        data: &AccuracyDataset,
        spec: &ChartSpec,
        theme: &Theme,
    ) -> Result<Canvas, RenderError> {
        let names: Vec<&str> = data.metrics.iter().map(|m| m.name.as_str()).collect();
        spec.check(ChartKind::SensorAccuracy, &names, 1)?;
        let panel = &spec.panels[0];
        let tick_font = theme.font(10.0);
        let label_area = Self::rotated_label_area(&names, &tick_font, theme)?;

        let mut canvas = Canvas::new(theme.figure_pixels(spec.figure));
        {
            let root = canvas.drawing_area();
            root.fill(&theme.background)?;
            let area = Self::titled(&root, spec.title.as_deref(), theme, 16.0)?;

            let n = data.metrics.len() as u32;
            let y_max = Self::upper_bound(data.metrics.iter().map(|m| m.value), BAR_HEADROOM);

            let mut chart = ChartBuilder::on(&area)
                .margin(theme.px(12.0))
                .x_label_area_size(label_area)
                .y_label_area_size(theme.px(48.0))
                .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_max)?;

            let category = |v: &SegmentValue<u32>| Self::category_name(&names, v);
            let mut mesh = chart.configure_mesh();
            Self::describe_axes(&mut mesh, panel, theme);
            mesh.disable_x_mesh()
                .x_labels(names.len())
                .x_label_formatter(&category)
                .x_label_style(tick_font.transform(FontTransform::Rotate90))
                .draw()?;

            chart.draw_series(
                Histogram::vertical(&chart)
                    .margin(theme.px(8.0))
                    .style_func(|x, _| Self::segment_color(spec, x).filled())
                    .data(data.metrics.iter().enumerate().map(|(i, m)| (i as u32, m.value))),
            )?;

            let annotation = theme
                .bold_text(10.0)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(data.metrics.iter().enumerate().map(|(i, m)| {
                Text::new(
                    m.label(),
                    (SegmentValue::CenterOf(i as u32), m.value + y_max * 0.01),
                    annotation.clone(),
                )
            }))?;

            root.present()?;
        }

        tracing::debug!(chart = spec.kind.label(), bars = data.metrics.len(), "rendered");
        Ok(canvas)
    }

    /// Horizontal bar per metric. Bar length is the normalized score; the
    /// annotation is the literal measured value.
    pub fn system_performance(
        data: &PerformanceDataset,
        spec: &ChartSpec,
        theme: &Theme,
    ) -> Result<Canvas, RenderError> {
        let names: Vec<&str> = data.metrics.iter().map(|m| m.name.as_str()).collect();
        spec.check(ChartKind::SystemPerformance, &names, 1)?;
        let panel = &spec.panels[0];

        let mut canvas = Canvas::new(theme.figure_pixels(spec.figure));
        {
            let root = canvas.drawing_area();
            root.fill(&theme.background)?;
            let area = Self::titled(&root, spec.title.as_deref(), theme, 16.0)?;

            let n = data.metrics.len() as u32;
            let x_max = Self::upper_bound(data.metrics.iter().map(|m| m.score), BARH_HEADROOM);

            let mut chart = ChartBuilder::on(&area)
                .margin(theme.px(12.0))
                .x_label_area_size(theme.px(36.0))
                .y_label_area_size(theme.px(90.0))
                .build_cartesian_2d(0f64..x_max, (0u32..n).into_segmented())?;

            let category = |v: &SegmentValue<u32>| Self::category_name(&names, v);
            let mut mesh = chart.configure_mesh();
            Self::describe_axes(&mut mesh, panel, theme);
            mesh.disable_y_mesh()
                .y_labels(names.len())
                .y_label_formatter(&category)
                .draw()?;

            chart.draw_series(
                Histogram::horizontal(&chart)
                    .margin(theme.px(8.0))
                    .style_func(|y, _| Self::segment_color(spec, y).filled())
                    .data(data.metrics.iter().enumerate().map(|(i, m)| (i as u32, m.score))),
            )?;

            let annotation = theme
                .bold_text(10.0)
                .pos(Pos::new(HPos::Left, VPos::Center));
            chart.draw_series(data.metrics.iter().enumerate().map(|(i, m)| {
                Text::new(
                    m.actual.clone(),
                    (m.score + x_max * 0.02, SegmentValue::CenterOf(i as u32)),
                    annotation.clone(),
                )
            }))?;

            root.present()?;
        }

        tracing::debug!(chart = spec.kind.label(), bars = data.metrics.len(), "rendered");
        Ok(canvas)
    }

    /// Success rate above response time, both over hour of day and shaded
    /// down to the axis.
    pub fn network_reliability(
        data: &ReliabilityDataset,
        spec: &ChartSpec,
        theme: &Theme,
    ) -> Result<Canvas, RenderError> {
        let series = data.series();
        spec.check(ChartKind::NetworkReliability, &series.map(|s| s.name()), series.len())?;

        let mut canvas = Canvas::new(theme.figure_pixels(spec.figure));
        {
            let root = canvas.drawing_area();
            root.fill(&theme.background)?;
            let area = Self::titled(&root, spec.title.as_deref(), theme, 16.0)?;
            let panels = area.split_evenly((series.len(), 1));

            for (i, (panel_area, ts)) in panels.iter().zip(series).enumerate() {
                let panel = &spec.panels[i];
                let color = spec.series[i].color;
                Self::hourly_panel(panel_area, ts, panel, color, theme)?;
            }

            root.present()?;
        }

        tracing::debug!(chart = spec.kind.label(), hours = data.success_rate.len(), "rendered");
        Ok(canvas)
    }

    /// Water temperature, pH and turbidity stacked over a shared time axis.
    pub fn sensor_simulation(
        data: &SensorDataset,
        spec: &ChartSpec,
        theme: &Theme,
    ) -> Result<Canvas, RenderError> {
        let series = data.series();
        spec.check(ChartKind::SensorSimulation, &series.map(|s| s.name()), series.len())?;

        let mut canvas = Canvas::new(theme.figure_pixels(spec.figure));
        {
            let root = canvas.drawing_area();
            root.fill(&theme.background)?;
            let area = Self::titled(&root, spec.title.as_deref(), theme, 16.0)?;
            let panels = area.split_evenly((series.len(), 1));

            for (i, (panel_area, ts)) in panels.iter().zip(series).enumerate() {
                let panel = &spec.panels[i];
                let color = spec.series[i].color;
                Self::timeline_panel(panel_area, ts, panel, color, theme)?;
            }

            root.present()?;
        }

        tracing::debug!(chart = spec.kind.label(), samples = data.water_temp.len(), "rendered");
        Ok(canvas)
    }

    /// One pie per resource pool: used in the pool's color, available in grey.
    pub fn memory_usage(
        data: &MemoryDataset,
        spec: &ChartSpec,
        theme: &Theme,
    ) -> Result<Canvas, RenderError> {
        let pools = data.pools();
        spec.check(ChartKind::MemoryUsage, &pools.map(|p| p.name()), pools.len())?;

        let mut canvas = Canvas::new(theme.figure_pixels(spec.figure));
        {
            let root = canvas.drawing_area();
            root.fill(&theme.background)?;
            let area = Self::titled(&root, spec.title.as_deref(), theme, 16.0)?;
            let halves = area.split_evenly((1, pools.len()));

            for (i, (half, pool)) in halves.iter().zip(pools).enumerate() {
                let panel = &spec.panels[i];
                let half = Self::titled(half, panel.title.as_deref(), theme, 14.0)?;

                let (xs, ys) = half.get_pixel_range();
                let center = ((xs.start + xs.end) / 2, (ys.start + ys.end) / 2);
                let radius = (xs.end - xs.start).min(ys.end - ys.start) as f64 * 0.36;

                let sizes = pool.wedges();
                let colors = [theme.pool_color(pool.kind()), theme.available];
                let labels = pool.wedge_labels();

                let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
                pie.start_angle(-90.0);
                pie.label_style(theme.bold_text(11.0));
                pie.label_offset(radius * 0.08);
                pie.percentages(theme.bold_text(11.0));
                half.draw(&pie)?;
            }

            root.present()?;
        }

        tracing::debug!(chart = spec.kind.label(), pools = pools.len(), "rendered");
        Ok(canvas)
    }

    fn hourly_panel(
        area: &Area<'_>,
        series: &TimeSeries<u32>,
        panel: &PanelSpec,
        color: RGBColor,
        theme: &Theme,
    ) -> Result<(), RenderError> {
        let (y_min, y_max) = Self::panel_range(panel, series);
        let hours = series.len().max(1) as f64;

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(theme.px(10.0))
            .x_label_area_size(theme.px(32.0))
            .y_label_area_size(theme.px(48.0));
        if let Some(title) = &panel.title {
            builder.caption(title, theme.bold_text(14.0));
        }
        let mut chart = builder.build_cartesian_2d(-0.5f64..hours - 0.5, y_min..y_max)?;

        let whole_hour = |v: &f64| format!("{:.0}", v);
        let mut mesh = chart.configure_mesh();
        Self::describe_axes(&mut mesh, panel, theme);
        mesh.x_labels(13).x_label_formatter(&whole_hour).draw()?;

        let points: Vec<(f64, f64)> = series.points().map(|(h, v)| (h as f64, v)).collect();
        chart.draw_series(AreaSeries::new(
            points.iter().copied(),
            y_min,
            theme.area_fill(color),
        ))?;
        chart.draw_series(LineSeries::new(
            points.iter().copied(),
            color.stroke_width(theme.px(2.0)),
        ))?;

        let size = theme.px(3.0) as i32;
        match panel.marker {
            Marker::Circle => {
                chart.draw_series(
                    points
                        .iter()
                        .map(|&p| Circle::new(p, size, color.filled())),
                )?;
            }
            Marker::Square => {
                chart.draw_series(points.iter().map(|&p| {
                    EmptyElement::at(p) + Rectangle::new([(-size, -size), (size, size)], color.filled())
                }))?;
            }
            Marker::None => {}
        }
        Ok(())
    }

    fn timeline_panel(
        area: &Area<'_>,
        series: &TimeSeries<NaiveDateTime>,
        panel: &PanelSpec,
        color: RGBColor,
        theme: &Theme,
    ) -> Result<(), RenderError> {
        let (Some(start), Some(end)) = (series.first_timestamp(), series.last_timestamp()) else {
            return Err(RenderError::EmptySeries(series.name().to_string()));
        };
        let (y_min, y_max) = Self::panel_range(panel, series);

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(theme.px(10.0))
            .x_label_area_size(theme.px(64.0))
            .y_label_area_size(theme.px(48.0));
        if let Some(title) = &panel.title {
            builder.caption(title, theme.bold_text(16.0));
        }
        let mut chart =
            builder.build_cartesian_2d(RangedDateTime::from(start..end), y_min..y_max)?;

        let timestamp = |t: &NaiveDateTime| t.format("%m-%d %H:%M").to_string();
        let mut mesh = chart.configure_mesh();
        Self::describe_axes(&mut mesh, panel, theme);
        mesh.x_labels(9)
            .x_label_formatter(&timestamp)
            .x_label_style(theme.font(10.0).transform(FontTransform::Rotate90))
            .draw()?;

        chart.draw_series(LineSeries::new(
            series.points(),
            color.stroke_width(theme.px(1.5)),
        ))?;
        Ok(())
    }

    /// Room below the axis for category names turned a quarter turn: the
    /// widest name plus a little padding.
    fn rotated_label_area(
        names: &[&str],
        font: &FontDesc<'_>,
        theme: &Theme,
    ) -> Result<u32, RenderError> {
        let mut widest = 0;
        for name in names {
            let (width, _) = font
                .box_size(name)
                .map_err(|e| RenderError::Backend(e.to_string()))?;
            widest = widest.max(width);
        }
        Ok(widest + theme.px(12.0))
    }

    /// Draw a figure title and return the area below it.
    fn titled<'a>(
        area: &Area<'a>,
        title: Option<&str>,
        theme: &Theme,
        points: f64,
    ) -> Result<Area<'a>, RenderError> {
        match title {
            Some(title) => Ok(area.titled(title, theme.bold_text(points))?),
            None => Ok(area.clone()),
        }
    }

    fn describe_axes<X: Ranged, Y: Ranged, DB: DrawingBackend>(
        mesh: &mut MeshStyle<'_, '_, X, Y, DB>,
        panel: &PanelSpec,
        theme: &Theme,
    ) {
        mesh.bold_line_style(theme.grid_style())
            .light_line_style(theme.fine_grid_style())
            .label_style(theme.font(10.0))
            .axis_desc_style(theme.bold(12.0));
        if let Some(label) = &panel.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &panel.y_label {
            mesh.y_desc(label.as_str());
        }
    }

    /// Fixed panel range if the panel declares one, otherwise the series' clamp bounds.
    fn panel_range<T: PartialOrd + Copy>(panel: &PanelSpec, series: &TimeSeries<T>) -> (f64, f64) {
        panel
            .y_range
            .unwrap_or_else(|| (series.range().min(), series.range().max()))
    }

    fn upper_bound(values: impl Iterator<Item = f64>, headroom: f64) -> f64 {
        let max = values.fold(0.0f64, f64::max);
        if max > 0.0 {
            max * headroom
        } else {
            1.0
        }
    }

    fn category_name(names: &[&str], value: &SegmentValue<u32>) -> String {
        match value {
            SegmentValue::CenterOf(i) => names
                .get(*i as usize)
                .map(|name| name.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn segment_color(spec: &ChartSpec, value: &SegmentValue<u32>) -> RGBColor {
        let index = match value {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i as usize,
            SegmentValue::Last => 0,
        };
        spec.color_of(index).unwrap_or(BLACK)
    }
}
