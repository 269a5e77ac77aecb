//! SVG rendering: time x-scale, linear y-scale, ordinal device colors,
//! one smoothed line per device.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::charts::ChartSurface;

/// The category10 palette the study keyed device colors from.
pub const CATEGORY10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub fn device_color(idx: usize) -> RGBColor {
    CATEGORY10[idx % CATEGORY10.len()]
}

/// One plottable line: a device's samples projected onto a single axis.
#[derive(Debug, Clone)]
pub struct DeviceSeries {
    pub device: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// Basis-style smoothing: interior points become a 1:4:1 weighted blend of
/// their neighborhood, endpoints are kept.
pub fn smooth_basis(points: &[(NaiveDateTime, f64)]) -> Vec<(NaiveDateTime, f64)> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    for w in points.windows(3) {
        let v = (w[0].1 + 4.0 * w[1].1 + w[2].1) / 6.0;
        out.push((w[1].0, v));
    }
    out.push(points[points.len() - 1]);
    out
}

fn time_range(series: &[DeviceSeries]) -> (NaiveDateTime, NaiveDateTime) {
    let mut min: Option<NaiveDateTime> = None;
    let mut max: Option<NaiveDateTime> = None;
    for s in series {
        for (ts, _) in &s.points {
            min = Some(min.map_or(*ts, |m| m.min(*ts)));
            max = Some(max.map_or(*ts, |m| m.max(*ts)));
        }
    }
    let lo = min.unwrap_or_default();
    let hi = max.unwrap_or_default();
    if lo == hi {
        (lo, hi + chrono::Duration::seconds(1))
    } else {
        (lo, hi)
    }
}

fn value_range(series: &[DeviceSeries]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for s in series {
        for (_, v) in &s.points {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    if lo == hi {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Draw one chart surface to `<out_dir>/<person>_<wrist>_<axis>.svg`.
///
/// Charts with no surviving series still produce a valid empty chart so a
/// failed load never suppresses its surface.
pub fn render_chart(
    surface: &ChartSurface,
    series: &[DeviceSeries],
    out_dir: &Path,
) -> Result<PathBuf> {
    let path = out_dir.join(surface.svg_filename());
    let (t0, t1) = time_range(series);
    let (v0, v1) = value_range(series);

    {
        let root =
            SVGBackend::new(&path, (surface.width, surface.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(surface.title(), ("sans-serif", 20))
            .margin_top(surface.margin.top)
            .margin_right(surface.margin.right)
            .margin_bottom(surface.margin.bottom)
            .x_label_area_size(30)
            .y_label_area_size(surface.margin.left)
            .build_cartesian_2d(plotters::coord::types::RangedDateTime::from(t0..t1), v0..v1)?;

        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&|ts: &NaiveDateTime| ts.format("%m-%d %H:%M").to_string())
            .y_desc(format!("{} acceleration (g)", surface.axis))
            .draw()?;

        for (idx, s) in series.iter().enumerate() {
            let color = device_color(idx);
            let smoothed = smooth_basis(&s.points);
            chart
                .draw_series(LineSeries::new(smoothed, color.stroke_width(1)))?
                .label(s.device.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
        }

        if !series.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        root.present()
            .with_context(|| format!("cannot write {}", path.display()))?;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::parse_timestamp;

    fn t(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw, 2017).unwrap()
    }

    fn series(points: Vec<(NaiveDateTime, f64)>) -> DeviceSeries {
        DeviceSeries {
            device: "E4".to_string(),
            points,
        }
    }

    #[test]
    fn smoothing_keeps_constant_series_flat() {
        let pts = vec![
            (t("04-05 20:24:19.0"), 1.0),
            (t("04-05 20:24:19.1"), 1.0),
            (t("04-05 20:24:19.2"), 1.0),
            (t("04-05 20:24:19.3"), 1.0),
        ];
        let out = smooth_basis(&pts);
        assert_eq!(out.len(), pts.len());
        for (_, v) in out {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn smoothing_damps_spikes() {
        let pts = vec![
            (t("04-05 20:24:19.0"), 0.0),
            (t("04-05 20:24:19.1"), 6.0),
            (t("04-05 20:24:19.2"), 0.0),
        ];
        let out = smooth_basis(&pts);
        assert_eq!(out[0].1, 0.0);
        assert_eq!(out.last().unwrap().1, 0.0);
        assert!(out[1].1 < 6.0);
        assert!((out[1].1 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn smoothing_passes_short_series_through() {
        let pts = vec![(t("04-05 20:24:19.0"), 3.0), (t("04-05 20:24:19.1"), 5.0)];
        assert_eq!(smooth_basis(&pts), pts);
    }

    #[test]
    fn colors_cycle_past_palette_length() {
        assert_eq!(device_color(0), device_color(10));
        assert_ne!(device_color(0), device_color(1));
    }

    #[test]
    fn value_range_pads_and_handles_degenerate_input() {
        let s = series(vec![(t("04-05 20:24:19.0"), 2.0)]);
        let (lo, hi) = value_range(std::slice::from_ref(&s));
        assert!(lo < 2.0 && hi > 2.0);

        let (lo, hi) = value_range(&[]);
        assert_eq!((lo, hi), (-1.0, 1.0));
    }

    #[test]
    fn time_range_is_never_empty() {
        let (lo, hi) = time_range(&[]);
        assert!(hi > lo);
    }

    #[test]
    fn render_writes_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let surface = crate::charts::ChartSurface::new("Arno", "left", "x");
        let s = series(vec![
            (t("04-05 20:24:19.0"), 0.1),
            (t("04-05 20:24:20.0"), 0.3),
            (t("04-05 20:24:21.0"), 0.2),
        ]);
        let path = render_chart(&surface, &[s], dir.path()).unwrap();
        assert!(path.ends_with("Arno_left_x.svg"));
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("<svg"));
    }

    #[test]
    fn render_survives_empty_series_set() {
        let dir = tempfile::tempdir().unwrap();
        let surface = crate::charts::ChartSurface::new("Jon", "right", "z");
        let path = render_chart(&surface, &[], dir.path()).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
