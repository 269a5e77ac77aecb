//! Runtime configuration, resolved once from the environment at startup.

use serde::Serialize;

/// The fixed enumerations whose cross-product defines the chart set.
#[derive(Debug, Clone, Serialize)]
pub struct Dimensions {
    pub people: Vec<String>,
    pub wrists: Vec<String>,
    pub axes: Vec<String>,
    pub devices: Vec<String>,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            people: strings(&["Arno", "Curt", "Jon"]),
            wrists: strings(&["left", "right"]),
            axes: strings(&["x", "y", "z"]),
            devices: strings(&[
                "Actigraph",
                "E4",
                "Embrace",
                "GENEActiv_black",
                "GENEActiv_pink",
                "Wavelet",
            ]),
        }
    }
}

impl Dimensions {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            people: list_var("CHART_PEOPLE", defaults.people),
            wrists: list_var("CHART_WRISTS", defaults.wrists),
            axes: list_var("CHART_AXES", defaults.axes),
            devices: list_var("CHART_DEVICES", defaults.devices),
        }
    }

    pub fn surface_count(&self) -> usize {
        self.people.len() * self.wrists.len() * self.axes.len()
    }

    pub fn load_count(&self) -> usize {
        self.people.len() * self.wrists.len() * self.devices.len()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory or URL the per-device CSVs live under.
    pub data_base: String,
    /// Directory the rendered SVGs and run summary are written to.
    pub out_dir: String,
    /// Year assumed for the study's year-less timestamp format.
    pub base_year: i32,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_base: std::env::var("CHART_DATA_BASE")
                .unwrap_or_else(|_| "./data/accelerometer".to_string()),
            out_dir: std::env::var("CHART_OUT_DIR").unwrap_or_else(|_| "./out/charts".to_string()),
            base_year: std::env::var("CHART_BASE_YEAR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2017),
            max_retries: std::env::var("FETCH_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_base_delay_ms: std::env::var("FETCH_RETRY_BASE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            retry_max_delay_ms: std::env::var("FETCH_RETRY_MAX_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
        }
    }
}

fn list_var(name: &str, default: Vec<String>) -> Vec<String> {
    match std::env::var(name) {
        Ok(raw) => {
            let items: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if items.is_empty() {
                default
            } else {
                items
            }
        }
        Err(_) => default,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
