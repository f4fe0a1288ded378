//! Data models and processing for dryer telemetry.
//!
//! This module turns raw dashboard snapshots into classified, display-ready
//! data and hosts the two pure pieces of logic the views depend on.
//!
//! ## Submodules
//!
//! - [`metric`]: The closed set of dryer metrics with labels, units and colors
//! - [`thresholds`]: Per-dryer alert bounds ([`ThresholdConfig`])
//! - [`severity`]: Threshold classification of readings ([`classify`])
//! - [`telemetry`]: History records and live dryer readings
//! - [`series`]: Day filtering and chart reshaping ([`build_series`])
//! - [`export`]: CSV report export
//! - [`dashboard`]: Snapshot conversion ([`DashboardData`])
//!
//! ## Data Flow
//!
//! ```text
//! DashboardSnapshot (raw JSON)
//!        │
//!        ▼
//! DashboardData::from_snapshot()
//!        │
//!        ├──▶ DryerReading (each metric classified against its ThresholdConfig)
//!        │
//!        └──▶ TelemetryRecord history ──▶ build_series() ──▶ chart / CSV
//! ```

pub mod dashboard;
pub mod export;
pub mod metric;
pub mod series;
pub mod severity;
pub mod telemetry;
pub mod thresholds;

pub use dashboard::DashboardData;
pub use metric::{Metric, MetricDefinition, UnknownMetric};
pub use series::{build_series, filter_records, DateRange, MetricSelection, SeriesPoint};
pub use severity::{classify, classify_id, Severity};
pub use telemetry::{DryerReading, DryerStatus, MetricReading, TelemetryRecord};
pub use thresholds::{Bound, MaxBound, ThresholdConfig};
