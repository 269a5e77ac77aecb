use anyhow::Result;
use serde_json::json;

use sensorcharts::config::{Config, Dimensions};
use sensorcharts::logging::{json_log, obj, v_str};
use sensorcharts::{pipeline, source};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let dims = Dimensions::from_env();
    let source = source::from_config(&cfg);

    json_log(
        "startup",
        obj(&[
            ("source", v_str(&source.describe())),
            ("out_dir", v_str(&cfg.out_dir)),
            ("people", json!(dims.people.len())),
            ("wrists", json!(dims.wrists.len())),
            ("axes", json!(dims.axes.len())),
            ("devices", json!(dims.devices.len())),
            ("planned_surfaces", json!(dims.surface_count())),
            ("planned_loads", json!(dims.load_count())),
        ]),
    );

    let summary = pipeline::render_all(&cfg, &dims, source.as_ref()).await?;

    json_log(
        "run_summary",
        obj(&[
            ("surfaces", json!(summary.surfaces)),
            ("rendered", json!(summary.rendered)),
            ("render_failures", json!(summary.render_failures)),
            ("loads_issued", json!(summary.loads_issued)),
            ("loads_failed", json!(summary.loads_failed)),
            ("rows_total", json!(summary.rows_total)),
        ]),
    );

    if summary.surfaces > 0 && summary.rendered == 0 {
        std::process::exit(1);
    }
    Ok(())
}
