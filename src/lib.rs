//! Wind farm report service.
//!
//! Fetches each wind farm's sheet, aligns it to a target time, estimates a
//! short forecast, and renders one static HTML report.

pub mod analysis;
pub mod config;
pub mod dev_mode;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod stations;
pub mod verify;
