//! Static line-chart renderer for the wearable-device comparison study:
//! one SVG per (person, wrist, axis), one colored series per device.

pub mod charts;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod retry;
pub mod series;
pub mod source;
