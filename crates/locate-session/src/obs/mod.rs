//! In-process counters for the locate session.
//!
//! Values are atomics keyed by label sets and rendered in the Prometheus text
//! format, so a host process can expose them however it likes.

pub mod metrics;

pub use metrics::{CounterVec, GaugeVec, LocateMetrics};
