//! Prints the planned chart set and CSV load paths as JSON without
//! fetching anything. Useful for checking the cross-product before a run.

use sensorcharts::charts::{build_surfaces, load_plan};
use sensorcharts::config::{Config, Dimensions};
use serde_json::json;
use std::env;
use std::fs;

fn main() {
    let cfg = Config::from_env();
    let dims = Dimensions::from_env();

    let surfaces = build_surfaces(&dims);
    let loads = load_plan(&dims);

    let payload = json!({
        "data_base": cfg.data_base,
        "out_dir": cfg.out_dir,
        "dimensions": dims,
        "surface_count": surfaces.len(),
        "load_count": loads.len(),
        "surfaces": surfaces,
        "loads": loads,
    });
    let rendered = match serde_json::to_string_pretty(&payload) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("failed to serialize manifest: {}", err);
            std::process::exit(1);
        }
    };

    match env::args().nth(1) {
        Some(out_path) => {
            if let Err(err) = fs::write(&out_path, rendered) {
                eprintln!("failed to write {}: {}", out_path, err);
                std::process::exit(2);
            }
            println!("wrote manifest {}", out_path);
        }
        None => println!("{}", rendered),
    }
}
