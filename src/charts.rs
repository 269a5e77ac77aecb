//! Chart surface construction: the cross-product of the dimension
//! enumerations, tagged with identifying attributes and fixed geometry.

use crate::config::Dimensions;
use serde::Serialize;

pub const SURFACE_WIDTH: u32 = 960;
pub const SURFACE_HEIGHT: u32 = 500;

/// Pixel inset reserved around the plot area. The left inset holds the
/// value axis and the right inset the device legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 5,
            right: 80,
            bottom: 5,
            left: 50,
        }
    }
}

/// One drawing surface, identified by its (person, wrist, axis) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSurface {
    pub person: String,
    pub wrist: String,
    pub axis: String,
    pub width: u32,
    pub height: u32,
    pub margin: Margin,
}

impl ChartSurface {
    pub fn new(person: &str, wrist: &str, axis: &str) -> Self {
        Self {
            person: person.to_string(),
            wrist: wrist.to_string(),
            axis: axis.to_string(),
            width: SURFACE_WIDTH,
            height: SURFACE_HEIGHT,
            margin: Margin::default(),
        }
    }

    pub fn title(&self) -> String {
        format!("{}, {} wrist, {} axis", self.person, self.wrist, self.axis)
    }

    pub fn svg_filename(&self) -> String {
        format!("{}_{}_{}.svg", self.person, self.wrist, self.axis)
    }

    pub fn inner_width(&self) -> u32 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> u32 {
        self.height - self.margin.top - self.margin.bottom
    }
}

/// One planned CSV load, identified by its (person, wrist, device) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadRequest {
    pub person: String,
    pub wrist: String,
    pub device: String,
    pub rel_path: String,
}

pub fn csv_filename(person: &str, wrist: &str, device: &str) -> String {
    format!("{}_{}_{}.csv", person, wrist, device)
}

/// Build every chart surface in the {people} x {wrists} x {axes} product,
/// in enumeration order.
pub fn build_surfaces(dims: &Dimensions) -> Vec<ChartSurface> {
    let mut surfaces = Vec::with_capacity(dims.surface_count());
    for person in &dims.people {
        for wrist in &dims.wrists {
            for axis in &dims.axes {
                surfaces.push(ChartSurface::new(person, wrist, axis));
            }
        }
    }
    surfaces
}

/// Plan every CSV load in the {people} x {wrists} x {devices} product.
pub fn load_plan(dims: &Dimensions) -> Vec<LoadRequest> {
    let mut plan = Vec::with_capacity(dims.load_count());
    for person in &dims.people {
        for wrist in &dims.wrists {
            for device in &dims.devices {
                plan.push(LoadRequest {
                    person: person.clone(),
                    wrist: wrist.clone(),
                    device: device.clone(),
                    rel_path: csv_filename(person, wrist, device),
                });
            }
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn cross_product_builds_one_surface_per_triple() {
        let dims = Dimensions::default();
        let surfaces = build_surfaces(&dims);
        assert_eq!(surfaces.len(), 18);

        let tags: HashSet<(String, String, String)> = surfaces
            .iter()
            .map(|s| (s.person.clone(), s.wrist.clone(), s.axis.clone()))
            .collect();
        assert_eq!(tags.len(), 18, "surface tags must be unique");

        for s in &surfaces {
            assert_eq!(s.width, 960);
            assert_eq!(s.height, 500);
        }
    }

    #[test]
    fn surface_geometry_accounts_for_margins() {
        let s = ChartSurface::new("Arno", "left", "x");
        assert_eq!(s.inner_width(), 960 - 50 - 80);
        assert_eq!(s.inner_height(), 500 - 5 - 5);
    }

    #[test]
    fn title_matches_study_caption() {
        let s = ChartSurface::new("Curt", "right", "z");
        assert_eq!(s.title(), "Curt, right wrist, z axis");
        assert_eq!(s.svg_filename(), "Curt_right_z.svg");
    }

    #[test]
    fn load_plan_covers_every_device_csv() {
        let dims = Dimensions::default();
        let plan = load_plan(&dims);
        assert_eq!(plan.len(), 36);

        let paths: HashSet<&str> = plan.iter().map(|r| r.rel_path.as_str()).collect();
        assert_eq!(paths.len(), 36);
        assert!(paths.contains("Arno_left_Actigraph.csv"));
        assert!(paths.contains("Jon_right_Wavelet.csv"));
        for r in &plan {
            assert_eq!(
                r.rel_path,
                format!("{}_{}_{}.csv", r.person, r.wrist, r.device)
            );
        }
    }
}
