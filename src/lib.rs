//! padstream - multi-port controller sample normalization.
//!
//! Polls up to four independently addressable controller ports, maps the
//! raw 8-bit analog samples through a Bezier-defined response curve, and
//! emits only the deltas (changed axes, changed buttons) with monotonic
//! timestamps.

pub mod config;
pub mod curve;
pub mod driver;
