/// Time alignment and forecast estimation for the wind farm report service.
///
/// This is the only part of the pipeline with decision logic. Everything
/// here is pure: inputs are parsed series and an explicit "now", outputs
/// are model values. No I/O, no wall clock, no global RNG.
///
/// Submodules:
/// - `normalize`: cell coercion and the single timezone conversion step.
/// - `alignment`: exact-hour and nearest-match reference selection.
/// - `staleness`: flags nearest matches far from their target.
/// - `forecast`: trailing average, hourly pattern and pass-through forecasts.

pub mod alignment;
pub mod forecast;
pub mod normalize;
pub mod staleness;
