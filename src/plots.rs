//! PNG rendering of the analysis plots.
//!
//! Titles, tick labels and state names need a font. When none could be
//! loaded every plot is still drawn, only without text.

use crate::analysis::{Distribution, WeightedFit};
use crate::config::PlotConfig;
use crate::error::{Error, Result};
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use std::fmt::Display;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

const FONT_FAMILY: &str = "sans-serif";
const BAR_COLOR: RGBColor = RGBColor(0x50, 0xa8, 0x4b);
const FIT_COLOR: RGBColor = RGBColor(0xa8, 0x87, 0x43);
const NO_DATA_COLOR: RGBColor = RGBColor(0xdd, 0xdd, 0xdd);
/// Ends of the map color scale, low values light
const SCALE_LOW: RGBColor = RGBColor(0xfd, 0xe7, 0x25);
const SCALE_HIGH: RGBColor = RGBColor(0x44, 0x01, 0x54);

/// Tile-grid position (column, row from the top) of each state on the map
pub const STATE_TILES: [(&str, u8, u8); 51] = [
    ("AK", 0, 0), ("ME", 11, 0),
    ("WI", 6, 1), ("VT", 10, 1), ("NH", 11, 1),
    ("WA", 1, 2), ("ID", 2, 2), ("MT", 3, 2), ("ND", 4, 2), ("MN", 5, 2), ("IL", 6, 2),
    ("MI", 7, 2), ("NY", 9, 2), ("MA", 10, 2),
    ("OR", 1, 3), ("NV", 2, 3), ("WY", 3, 3), ("SD", 4, 3), ("IA", 5, 3), ("IN", 6, 3),
    ("OH", 7, 3), ("PA", 8, 3), ("NJ", 9, 3), ("CT", 10, 3), ("RI", 11, 3),
    ("CA", 1, 4), ("UT", 2, 4), ("CO", 3, 4), ("NE", 4, 4), ("MO", 5, 4), ("KY", 6, 4),
    ("WV", 7, 4), ("VA", 8, 4), ("MD", 9, 4), ("DE", 10, 4),
    ("AZ", 2, 5), ("NM", 3, 5), ("KS", 4, 5), ("AR", 5, 5), ("TN", 6, 5), ("NC", 7, 5),
    ("SC", 8, 5), ("DC", 9, 5),
    ("OK", 4, 6), ("LA", 5, 6), ("MS", 6, 6), ("AL", 7, 6), ("GA", 8, 6),
    ("HI", 0, 7), ("TX", 4, 7), ("FL", 9, 7),
];

type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

static FONT_LOADED: OnceLock<bool> = OnceLock::new();

fn plot_error(e: impl Display) -> Error {
    Error::Plot(e.to_string())
}

/// Register the configured font once per process. Returns whether text can
/// be drawn.
fn load_font(path: Option<&Path>) -> bool {
    let Some(path) = path else {
        return FONT_LOADED.get().copied().unwrap_or(false);
    };
    *FONT_LOADED.get_or_init(|| {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                ::log::warn!("Font {} unavailable, drawing plots without text: {}", path.display(), e);
                return false;
            }
        };
        // Registered fonts live for the rest of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => true,
            Err(_) => {
                ::log::warn!("{} is not a usable font, drawing plots without text", path.display());
                false
            }
        }
    })
}

/// Image size and whether text is drawn
#[derive(Debug, Clone, Copy)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub labels: bool,
}

impl PlotStyle {
    pub fn from_config(config: &PlotConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            labels: load_font(config.font_path.as_deref()),
        }
    }
}

/// Data bounds of a chart
#[derive(Debug, Clone)]
struct Frame {
    x: Range<f64>,
    y: Range<f64>,
}

/// Which axes carry tick labels
#[derive(Debug, Clone, Copy)]
enum Ticks {
    X,
    Y,
    Both,
}

/// `lo..hi` widened by 5%, or by one unit when it is empty
fn padded(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo <= f64::EPSILON {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// `0..max` with headroom; at least `0..1`
fn from_zero(max: f64) -> Range<f64> {
    if max.is_finite() && max > 0.0 { 0.0..max * 1.1 } else { 0.0..1.0 }
}

fn open_chart<'a, 'b>(
    root: &'a DrawingArea<BitMapBackend<'b>, Shift>,
    style: &PlotStyle,
    title: &str,
    frame: &Frame,
) -> Result<Chart<'a, 'b>> {
    root.fill(&WHITE).map_err(plot_error)?;
    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if style.labels {
        builder
            .caption(title, (FONT_FAMILY, 24))
            .x_label_area_size(50)
            .y_label_area_size(80);
    }
    builder
        .build_cartesian_2d(frame.x.clone(), frame.y.clone())
        .map_err(plot_error)
}

fn draw_axes(
    chart: &mut Chart<'_, '_>,
    style: &PlotStyle,
    frame: &Frame,
    ticks: Ticks,
    x_desc: &str,
    y_desc: &str,
) -> Result<()> {
    if style.labels {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(x_desc).y_desc(y_desc);
        match ticks {
            Ticks::X => {
                mesh.y_labels(0).disable_y_mesh();
            }
            Ticks::Y => {
                mesh.x_labels(0).disable_x_mesh();
            }
            Ticks::Both => {}
        }
        return mesh.draw().map_err(plot_error);
    }

    let corner = vec![
        (frame.x.start, frame.y.end),
        (frame.x.start, frame.y.start),
        (frame.x.end, frame.y.start),
    ];
    chart
        .draw_series([PathElement::new(corner, BLACK.stroke_width(1))])
        .map_err(plot_error)?;
    Ok(())
}

/// Text at data coordinates, skipped when no font is loaded
fn annotate(chart: &mut Chart<'_, '_>, style: &PlotStyle, size: u32, items: Vec<(String, (f64, f64))>) -> Result<()> {
    if !style.labels || items.is_empty() {
        return Ok(());
    }
    chart
        .draw_series(
            items
                .into_iter()
                .map(|(text, at)| Text::new(text, at, (FONT_FAMILY, size).into_font())),
        )
        .map_err(plot_error)?;
    Ok(())
}

/// One vertical bar per category, labeled above the bar
pub fn bar_chart(
    path: &Path,
    style: &PlotStyle,
    title: &str,
    axes: (&str, &str),
    bars: &[(String, f64)],
) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    let max = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let frame = Frame {
        x: 0.0..bars.len().max(1) as f64,
        y: from_zero(max),
    };
    let mut chart = open_chart(&root, style, title, &frame)?;
    draw_axes(&mut chart, style, &frame, Ticks::Y, axes.0, axes.1)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let x = i as f64;
            Rectangle::new([(x + 0.1, 0.0), (x + 0.9, value.max(0.0))], BAR_COLOR.filled())
        }))
        .map_err(plot_error)?;
    annotate(
        &mut chart,
        style,
        10,
        bars.iter()
            .enumerate()
            .map(|(i, (name, value))| (name.clone(), (i as f64 + 0.1, value.max(0.0) + frame.y.end * 0.04)))
            .collect(),
    )?;

    root.present().map_err(plot_error)
}

/// One horizontal bar per category, listed bottom to top in input order
pub fn horizontal_bar_chart(
    path: &Path,
    style: &PlotStyle,
    title: &str,
    axes: (&str, &str),
    bars: &[(String, f64)],
) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    let max = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let frame = Frame {
        x: from_zero(max),
        y: 0.0..bars.len().max(1) as f64,
    };
    let mut chart = open_chart(&root, style, title, &frame)?;
    draw_axes(&mut chart, style, &frame, Ticks::X, axes.0, axes.1)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let y = i as f64;
            Rectangle::new([(0.0, y + 0.15), (value.max(0.0), y + 0.85)], BAR_COLOR.filled())
        }))
        .map_err(plot_error)?;
    annotate(
        &mut chart,
        style,
        14,
        bars.iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), (frame.x.end * 0.01, i as f64 + 0.65)))
            .collect(),
    )?;

    root.present().map_err(plot_error)
}

/// Box from the quartiles, a median line and whiskers to the extremes
pub fn box_plot(path: &Path, style: &PlotStyle, title: &str, variable: &str, stats: Option<&Distribution>) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    let frame = Frame {
        x: 0.0..2.0,
        y: stats.map_or(0.0..1.0, |d| padded(d.min, d.max)),
    };
    let mut chart = open_chart(&root, style, title, &frame)?;
    draw_axes(&mut chart, style, &frame, Ticks::Y, variable, "Value")?;

    if let Some(d) = stats {
        let whiskers = [
            vec![(1.0, d.min), (1.0, d.q1)],
            vec![(1.0, d.q3), (1.0, d.max)],
            vec![(0.85, d.min), (1.15, d.min)],
            vec![(0.85, d.max), (1.15, d.max)],
        ];
        chart
            .draw_series(
                whiskers
                    .into_iter()
                    .map(|line| PathElement::new(line, BLACK.stroke_width(1))),
            )
            .map_err(plot_error)?;
        chart
            .draw_series([
                Rectangle::new([(0.7, d.q1), (1.3, d.q3)], BAR_COLOR.stroke_width(2)),
            ])
            .map_err(plot_error)?;
        chart
            .draw_series([PathElement::new(
                vec![(0.7, d.median), (1.3, d.median)],
                FIT_COLOR.stroke_width(2),
            )])
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)
}

/// Points sized by weight, with the fitted line across the observed range
pub fn scatter_with_fit(
    path: &Path,
    style: &PlotStyle,
    title: &str,
    axes: (&str, &str),
    points: &[(f64, f64, f64)],
    fit: Option<WeightedFit>,
) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    let (x_lo, x_hi) = bounds(points.iter().map(|p| p.0));
    let (y_lo, y_hi) = bounds(points.iter().map(|p| p.1));
    let frame = Frame {
        x: padded(x_lo, x_hi),
        y: padded(y_lo, y_hi),
    };
    let mut chart = open_chart(&root, style, title, &frame)?;
    draw_axes(&mut chart, style, &frame, Ticks::Both, axes.0, axes.1)?;

    chart
        .draw_series(points.iter().map(|&(x, y, weight)| {
            let radius = weight.max(0.0).sqrt().clamp(2.0, 30.0) as u32;
            Circle::new((x, y), radius, BAR_COLOR.filled())
        }))
        .map_err(plot_error)?;
    if let Some(fit) = fit.filter(|_| !points.is_empty()) {
        chart
            .draw_series([PathElement::new(
                vec![(x_lo, fit.predict(x_lo)), (x_hi, fit.predict(x_hi))],
                FIT_COLOR.stroke_width(2),
            )])
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Color of `value` on the map scale spanning `lo..=hi`
pub fn scale_color(value: f64, lo: f64, hi: f64) -> RGBColor {
    let t = if hi - lo > f64::EPSILON { ((value - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.5 };
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        mix(SCALE_LOW.0, SCALE_HIGH.0),
        mix(SCALE_LOW.1, SCALE_HIGH.1),
        mix(SCALE_LOW.2, SCALE_HIGH.2),
    )
}

/// Tile-grid map of the states, each tile colored by its value. States
/// without a value are drawn grey.
pub fn state_map(path: &Path, style: &PlotStyle, title: &str, values: &[(String, f64)]) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    let frame = Frame {
        x: 0.0..12.0,
        y: -1.0..8.0,
    };
    let mut chart = open_chart(&root, style, title, &frame)?;
    let (lo, hi) = bounds(values.iter().map(|(_, v)| *v));
    let value_of = |state: &str| values.iter().find(|(s, _)| s == state).map(|(_, v)| *v);

    chart
        .draw_series(STATE_TILES.iter().map(|&(state, col, row)| {
            let (x, y) = (col as f64, 7.0 - row as f64);
            let color = value_of(state).map_or(NO_DATA_COLOR, |v| scale_color(v, lo, hi));
            Rectangle::new([(x + 0.05, y + 0.05), (x + 0.95, y + 0.95)], color.filled())
        }))
        .map_err(plot_error)?;

    // Legend: the color scale from lowest to highest value
    let steps = 20;
    chart
        .draw_series((0..steps).map(|i| {
            let x = 2.0 + 8.0 * i as f64 / steps as f64;
            let t = i as f64 / (steps - 1) as f64;
            let color = scale_color(lo + (hi - lo) * t, lo, hi);
            Rectangle::new([(x, -0.8), (x + 8.0 / steps as f64, -0.4)], color.filled())
        }))
        .map_err(plot_error)?;

    let mut labels: Vec<(String, (f64, f64))> = STATE_TILES
        .iter()
        .map(|&(state, col, row)| (state.to_string(), (col as f64 + 0.3, 7.0 - row as f64 + 0.65)))
        .collect();
    if lo.is_finite() {
        labels.push((format!("{:.0}", lo), (2.0, -0.1)));
        labels.push((format!("{:.0}", hi), (9.4, -0.1)));
    }
    annotate(&mut chart, style, 14, labels)?;

    root.present().map_err(plot_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const PNG_MAGIC: &[u8] = b"\x89PNG";

    fn plain_style() -> PlotStyle {
        PlotStyle {
            width: 320,
            height: 240,
            labels: false,
        }
    }

    fn assert_png(path: &Path) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(PNG_MAGIC), "{} is not a PNG", path.display());
    }

    #[test]
    fn test_tiles_cover_each_state_once() {
        let states: HashSet<_> = STATE_TILES.iter().map(|t| t.0).collect();
        let cells: HashSet<_> = STATE_TILES.iter().map(|t| (t.1, t.2)).collect();
        assert_eq!(states.len(), 51);
        assert_eq!(cells.len(), 51);
        assert!(states.contains("DC"));
        assert!(STATE_TILES.iter().all(|t| t.1 < 12 && t.2 < 8));
    }

    #[test]
    fn test_scale_color_ends() {
        assert_eq!(scale_color(10.0, 10.0, 20.0), SCALE_LOW);
        assert_eq!(scale_color(20.0, 10.0, 20.0), SCALE_HIGH);
        assert_eq!(scale_color(99.0, 10.0, 20.0), SCALE_HIGH);
    }

    #[test]
    fn test_padded_ranges() {
        assert_eq!(padded(5.0, 5.0), 4.0..6.0);
        assert_eq!(padded(0.0, 100.0), -5.0..105.0);
        assert_eq!(padded(f64::INFINITY, f64::NEG_INFINITY), 0.0..1.0);
        assert_eq!(from_zero(0.0), 0.0..1.0);
    }

    #[test]
    fn test_renders_each_plot_kind() {
        let dir = tempfile::tempdir().unwrap();
        let style = plain_style();
        let bars = vec![("CA".to_string(), 150.0), ("TX".to_string(), 110.0)];

        let bar = dir.path().join("bar.png");
        bar_chart(&bar, &style, "Bars", ("States", "Avg Salary"), &bars).unwrap();
        let hbar = dir.path().join("hbar.png");
        horizontal_bar_chart(&hbar, &style, "Bars", ("Avg Salary", "Job Title"), &bars).unwrap();

        let boxed = dir.path().join("box.png");
        let stats = Distribution {
            count: 4,
            mean: 2.5,
            min: 1.0,
            q1: 1.75,
            median: 2.5,
            q3: 3.25,
            max: 4.0,
        };
        box_plot(&boxed, &style, "Box", "Median Income", Some(&stats)).unwrap();

        let scatter = dir.path().join("scatter.png");
        let fit = WeightedFit {
            slope: 2.0,
            intercept: 1.0,
        };
        scatter_with_fit(
            &scatter,
            &style,
            "Scatter",
            ("Median Income", "Avg Salary"),
            &[(1.0, 3.0, 4.0), (2.0, 5.0, 9.0)],
            Some(fit),
        )
        .unwrap();

        let map = dir.path().join("map.png");
        state_map(&map, &style, "Map", &bars).unwrap();

        for path in [bar, hbar, boxed, scatter, map] {
            assert_png(&path);
        }
    }

    #[test]
    fn test_empty_data_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let style = plain_style();

        let bar = dir.path().join("bar.png");
        bar_chart(&bar, &style, "Empty", ("x", "y"), &[]).unwrap();
        let boxed = dir.path().join("box.png");
        box_plot(&boxed, &style, "Empty", "x", None).unwrap();
        let scatter = dir.path().join("scatter.png");
        scatter_with_fit(&scatter, &style, "Empty", ("x", "y"), &[], None).unwrap();
        let map = dir.path().join("map.png");
        state_map(&map, &style, "Empty", &[]).unwrap();

        for path in [bar, boxed, scatter, map] {
            assert_png(&path);
        }
    }
}
