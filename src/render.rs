//! SVG rendering of dashboard charts (plotters)

use crate::core::charts::{ChartKind, ChartSpec};
use crate::error::{FleetError, FleetResult};
use crate::format;
use plotters::prelude::*;
use std::f64::consts::PI;

/// Bounds of a rendered chart's width and height, in pixels
pub const MIN_CHART_SIZE: u32 = 100;
pub const MAX_CHART_SIZE: u32 = 4096;

/// Size and text options for a rendered chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    /// Draw the title, axis values and slice labels
    pub labels: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
            labels: true,
        }
    }
}

impl ChartStyle {
    /// The same style with width and height kept within the chart size bounds
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.clamp(MIN_CHART_SIZE, MAX_CHART_SIZE),
            height: self.height.clamp(MIN_CHART_SIZE, MAX_CHART_SIZE),
            ..self
        }
    }
}

/// Pixel box the marks are drawn into
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl PlotArea {
    fn new(style: &ChartStyle) -> Self {
        let (left, top, right, bottom) = if style.labels {
            (70, 40, 180, 40)
        } else {
            (10, 10, 10, 10)
        };
        Self {
            left,
            top,
            right: (style.width as i32 - right).max(left + 1),
            bottom: (style.height as i32 - bottom).max(top + 1),
        }
    }

    fn width(&self) -> i32 {
        self.right - self.left
    }

    fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

fn chart_err<E: std::fmt::Display>(e: E) -> FleetError {
    FleetError::Chart(e.to_string())
}

/// Render a chart to an SVG document
pub fn render_svg(spec: &ChartSpec, style: &ChartStyle) -> FleetResult<String> {
    let style = &style.clamped();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (style.width, style.height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        if style.labels {
            root.draw(&Text::new(
                spec.title.clone(),
                (10, 10),
                ("sans-serif", 20).into_font(),
            ))
            .map_err(chart_err)?;
        }

        let area = PlotArea::new(style);
        match spec.kind {
            ChartKind::Bar => draw_bars(&root, spec, area, style.labels)?,
            ChartKind::Pie => draw_pie(&root, spec, area, style.labels)?,
        }
        root.present().map_err(chart_err)?;
    }
    tracing::debug!(chart = %spec.id, bytes = svg.len(), "chart rendered");
    Ok(svg)
}

/// Stacked bars, one column per label, one color per group
fn draw_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    spec: &ChartSpec,
    area: PlotArea,
    labels: bool,
) -> FleetResult<()> {
    let x_labels = spec.labels();
    let groups = spec.groups();
    if x_labels.is_empty() {
        return Ok(());
    }

    // Positive values stack upward, negative ones downward
    let mut up = vec![0.0f64; x_labels.len()];
    let mut down = vec![0.0f64; x_labels.len()];
    for p in &spec.points {
        if let Some(i) = x_labels.iter().position(|l| *l == p.label) {
            if p.value >= 0.0 {
                up[i] += p.value;
            } else {
                down[i] += p.value;
            }
        }
    }
    let max = up.iter().cloned().fold(0.0, f64::max);
    let min = down.iter().cloned().fold(0.0, f64::min);
    let span = if max - min > 0.0 { max - min } else { 1.0 };
    let y_of = |v: f64| area.bottom - ((v - min) / span * area.height() as f64).round() as i32;
    let baseline = y_of(0.0);

    let slot = area.width() as f64 / x_labels.len() as f64;
    let mut top = vec![0.0f64; x_labels.len()];
    let mut bottom = vec![0.0f64; x_labels.len()];

    for p in &spec.points {
        let Some(i) = x_labels.iter().position(|l| *l == p.label) else {
            continue;
        };
        let color_idx = groups.iter().position(|g| *g == p.group).unwrap_or(0);
        let x0 = area.left + (slot * (i as f64 + 0.1)).round() as i32;
        let x1 = area.left + (slot * (i as f64 + 0.9)).round() as i32;
        let (from, to) = if p.value >= 0.0 {
            let from = top[i];
            top[i] += p.value;
            (from, top[i])
        } else {
            let from = bottom[i];
            bottom[i] += p.value;
            (from, bottom[i])
        };
        root.draw(&Rectangle::new(
            [(x0, y_of(to)), (x1, y_of(from))],
            Palette99::pick(color_idx).filled(),
        ))
        .map_err(chart_err)?;
    }

    root.draw(&PathElement::new(
        vec![(area.left, baseline), (area.right, baseline)],
        &BLACK,
    ))
    .map_err(chart_err)?;

    if labels {
        let font = ("sans-serif", 12).into_font();
        root.draw(&Text::new(
            format!("{} {}", format::group_integer(max), spec.unit),
            (5, area.top),
            font.clone(),
        ))
        .map_err(chart_err)?;
        for (i, label) in x_labels.iter().enumerate() {
            let x = area.left + (slot * i as f64).round() as i32;
            root.draw(&Text::new(label.clone(), (x, area.bottom + 8), font.clone()))
                .map_err(chart_err)?;
        }
        for (i, group) in groups.iter().enumerate() {
            let Some(group) = group else { continue };
            let y = area.top + 18 * i as i32;
            root.draw(&Rectangle::new(
                [(area.right + 10, y), (area.right + 22, y + 12)],
                Palette99::pick(i).filled(),
            ))
            .map_err(chart_err)?;
            root.draw(&Text::new(group.clone(), (area.right + 28, y), font.clone()))
                .map_err(chart_err)?;
        }
    }
    Ok(())
}

/// Pie slices as polygons; label shows name, share and amount
fn draw_pie<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    spec: &ChartSpec,
    area: PlotArea,
    labels: bool,
) -> FleetResult<()> {
    let total: f64 = spec.points.iter().map(|p| p.value.max(0.0)).sum();
    if total <= 0.0 {
        return Ok(());
    }
    let cx = (area.left + area.right) as f64 / 2.0;
    let cy = (area.top + area.bottom) as f64 / 2.0;
    let radius = (area.width().min(area.height()) as f64 / 2.0) * 0.8;
    let at = |angle: f64, r: f64| {
        (
            (cx + r * angle.cos()).round() as i32,
            (cy + r * angle.sin()).round() as i32,
        )
    };

    let mut start = -PI / 2.0;
    for (i, p) in spec.points.iter().enumerate() {
        if p.value <= 0.0 {
            continue;
        }
        let share = p.value / total;
        let sweep = share * 2.0 * PI;
        let steps = ((sweep / (PI / 90.0)).ceil() as usize).max(1);

        let mut polygon = Vec::with_capacity(steps + 2);
        polygon.push((cx.round() as i32, cy.round() as i32));
        for s in 0..=steps {
            polygon.push(at(start + sweep * s as f64 / steps as f64, radius));
        }
        root.draw(&Polygon::new(polygon, Palette99::pick(i).filled()))
            .map_err(chart_err)?;

        if labels {
            let text = format!(
                "{}: {:.1}% ({})",
                p.label,
                share * 100.0,
                format::money(p.value)
            );
            root.draw(&Text::new(
                text,
                at(start + sweep / 2.0, radius * 1.05),
                ("sans-serif", 12).into_font(),
            ))
            .map_err(chart_err)?;
        }
        start += sweep;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::charts::{ChartId, ChartPoint};

    fn spec(kind: ChartKind, points: Vec<(&str, Option<&str>, f64)>) -> ChartSpec {
        ChartSpec {
            id: ChartId::FuelLiters,
            kind,
            title: "Évolution Consommation (L)".to_string(),
            x_label: "Date".to_string(),
            y_label: "Litres (L)".to_string(),
            unit: "L".to_string(),
            points: points
                .into_iter()
                .map(|(label, group, value)| ChartPoint {
                    label: label.to_string(),
                    group: group.map(str::to_string),
                    value,
                })
                .collect(),
        }
    }

    fn bare() -> ChartStyle {
        ChartStyle {
            width: 400,
            height: 300,
            labels: false,
        }
    }

    #[test]
    fn test_bar_chart_svg() {
        let chart = spec(
            ChartKind::Bar,
            vec![
                ("S1", Some("Gasoil"), 30.0),
                ("S1", Some("Essence"), 10.0),
                ("S2", Some("Gasoil"), 25.0),
            ],
        );
        let svg = render_svg(&chart, &bare()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.matches("<rect").count() >= 3);
    }

    #[test]
    fn test_pie_chart_svg() {
        let chart = spec(
            ChartKind::Pie,
            vec![("Vidange", None, 75.0), ("Freins", None, 25.0)],
        );
        let svg = render_svg(&chart, &bare()).unwrap();
        assert!(svg.matches("<polygon").count() >= 2);
    }

    #[test]
    fn test_style_size_is_clamped() {
        let huge = ChartStyle {
            width: u32::MAX,
            height: 3_000_000_000,
            labels: false,
        }
        .clamped();
        assert_eq!((huge.width, huge.height), (MAX_CHART_SIZE, MAX_CHART_SIZE));

        let tiny = ChartStyle {
            width: 0,
            height: 10,
            labels: true,
        }
        .clamped();
        assert_eq!((tiny.width, tiny.height), (MIN_CHART_SIZE, MIN_CHART_SIZE));
        assert!(tiny.labels);
        assert_eq!(ChartStyle::default().clamped(), ChartStyle::default());
    }

    #[test]
    fn test_oversized_chart_renders_at_max_size() {
        let chart = spec(ChartKind::Bar, vec![("S1", None, 10.0)]);
        let style = ChartStyle {
            width: u32::MAX,
            height: u32::MAX,
            labels: false,
        };
        let svg = render_svg(&chart, &style).unwrap();
        assert!(svg.contains(&format!("width=\"{}\"", MAX_CHART_SIZE)));
        assert!(svg.matches("<rect").count() >= 1);
    }

    #[test]
    fn test_empty_chart_renders_blank() {
        let chart = spec(ChartKind::Pie, vec![]);
        let svg = render_svg(&chart, &bare()).unwrap();
        assert!(svg.contains("</svg>"));
    }
}
