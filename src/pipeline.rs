//! One-shot orchestration: build every surface, fan out the CSV loads,
//! render every chart, and account for the whole run in a summary file.

use anyhow::{Context, Result};
use futures_util::future::join_all;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::charts;
use crate::config::{Config, Dimensions};
use crate::logging::{json_log, log_load_outcome, log_render, log_surface_built, obj, v_str};
use crate::render::{render_chart, DeviceSeries};
use crate::series::{parse_rows, LoadOutcome, SampleRow};
use crate::source::SeriesSource;

#[derive(Debug, Clone, Serialize)]
pub struct LoadRecord {
    pub person: String,
    pub wrist: String,
    pub device: String,
    pub path: String,
    #[serde(flatten)]
    pub outcome: LoadOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub source: String,
    pub surfaces: usize,
    pub rendered: usize,
    pub render_failures: usize,
    pub loads_issued: usize,
    pub loads_failed: usize,
    pub rows_total: u64,
    pub loads: Vec<LoadRecord>,
}

impl RunSummary {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Render the full chart set. Every load and render is independent: a
/// failure is recorded in the summary and the run continues.
pub async fn render_all(
    cfg: &Config,
    dims: &Dimensions,
    source: &dyn SeriesSource,
) -> Result<RunSummary> {
    let out_dir = Path::new(&cfg.out_dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;

    // Step 1: every surface exists before any fetch is awaited.
    let surfaces = charts::build_surfaces(dims);
    for s in &surfaces {
        log_surface_built(&s.person, &s.wrist, &s.axis, s.width, s.height);
    }

    let mut summary = RunSummary {
        generated_at: crate::logging::ts_now(),
        source: source.describe(),
        surfaces: surfaces.len(),
        rendered: 0,
        render_failures: 0,
        loads_issued: 0,
        loads_failed: 0,
        rows_total: 0,
        loads: Vec::with_capacity(dims.load_count()),
    };

    // Step 2: per (person, wrist), load the device CSVs concurrently and
    // render that wrist's axis charts from whatever survived.
    for person in &dims.people {
        for wrist in &dims.wrists {
            let loaded = load_group(cfg, dims, source, person, wrist, &mut summary).await;

            for surface in surfaces
                .iter()
                .filter(|s| &s.person == person && &s.wrist == wrist)
            {
                let series = axis_series(&loaded, &surface.axis);
                match render_chart(surface, &series, out_dir) {
                    Ok(path) => {
                        summary.rendered += 1;
                        log_render(
                            &surface.person,
                            &surface.wrist,
                            &surface.axis,
                            &path.display().to_string(),
                            series.len(),
                        );
                    }
                    Err(err) => {
                        summary.render_failures += 1;
                        json_log(
                            "render_error",
                            obj(&[
                                ("person", v_str(&surface.person)),
                                ("wrist", v_str(&surface.wrist)),
                                ("axis", v_str(&surface.axis)),
                                ("reason", v_str(&err.to_string())),
                            ]),
                        );
                    }
                }
            }
        }
    }

    let summary_path = out_dir.join("run_summary.json");
    std::fs::write(&summary_path, summary.to_json())
        .with_context(|| format!("cannot write {}", summary_path.display()))?;

    Ok(summary)
}

/// Fetch and parse one (person, wrist) group's device CSVs. Returns the
/// surviving rows per device, sorted by timestamp.
async fn load_group(
    cfg: &Config,
    dims: &Dimensions,
    source: &dyn SeriesSource,
    person: &str,
    wrist: &str,
    summary: &mut RunSummary,
) -> Vec<(String, Vec<SampleRow>)> {
    let fetches = dims.devices.iter().map(|device| {
        let rel_path = charts::csv_filename(person, wrist, device);
        async move {
            let result = source.fetch(&rel_path).await;
            (device.clone(), rel_path, result)
        }
    });

    let mut loaded = Vec::new();
    for (device, rel_path, result) in join_all(fetches).await {
        summary.loads_issued += 1;
        let outcome = match result {
            Ok(body) => {
                let parsed = parse_rows(&body, cfg.base_year);
                let mut rows = parsed.rows;
                rows.sort_by_key(|r| r.ts);
                let outcome = LoadOutcome::Loaded {
                    rows: rows.len() as u64,
                    bad_rows: parsed.bad_rows,
                    body_sha256: hex::encode(Sha256::digest(body.as_bytes())),
                };
                log_load_outcome(
                    &device,
                    &rel_path,
                    "loaded",
                    rows.len() as u64,
                    parsed.bad_rows,
                    None,
                );
                summary.rows_total += rows.len() as u64;
                loaded.push((device.clone(), rows));
                outcome
            }
            Err(err) => {
                summary.loads_failed += 1;
                let reason = err.to_string();
                log_load_outcome(&device, &rel_path, "failed", 0, 0, Some(&reason));
                LoadOutcome::Failed { reason }
            }
        };
        summary.loads.push(LoadRecord {
            person: person.to_string(),
            wrist: wrist.to_string(),
            device,
            path: rel_path,
            outcome,
        });
    }
    loaded
}

fn axis_series(loaded: &[(String, Vec<SampleRow>)], axis: &str) -> Vec<DeviceSeries> {
    loaded
        .iter()
        .map(|(device, rows)| DeviceSeries {
            device: device.clone(),
            points: rows
                .iter()
                .filter_map(|r| r.axis_value(axis).map(|v| (r.ts, v)))
                .collect(),
        })
        .filter(|s| !s.points.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::parse_timestamp;

    fn row(raw_ts: &str, x: f64) -> SampleRow {
        SampleRow {
            ts: parse_timestamp(raw_ts, 2017).unwrap(),
            x,
            y: x * 2.0,
            z: x * 3.0,
        }
    }

    #[test]
    fn axis_series_projects_named_axis() {
        let loaded = vec![
            ("E4".to_string(), vec![row("04-05 20:24:19", 0.5)]),
            ("Wavelet".to_string(), vec![row("04-05 20:24:20", 0.7)]),
        ];
        let series = axis_series(&loaded, "y");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].points[0].1, 1.0);
        assert_eq!(series[1].points[0].1, 1.4);
    }

    #[test]
    fn axis_series_drops_unknown_axis() {
        let loaded = vec![("E4".to_string(), vec![row("04-05 20:24:19", 0.5)])];
        assert!(axis_series(&loaded, "w").is_empty());
    }

    #[test]
    fn axis_series_skips_empty_devices() {
        let loaded = vec![("E4".to_string(), Vec::new())];
        assert!(axis_series(&loaded, "x").is_empty());
    }
}
