// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # secador-monitor
//!
//! A terminal dashboard and library for monitoring grain dryers (secadores).
//!
//! Live readings of every dryer are classified against per-dryer alert
//! limits, and the recorded history can be charted per metric and exported
//! as CSV reports. Data comes from the telemetry API or from a JSON snapshot
//! file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(processing)   │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── FileSource | ApiSource | ChannelSource     │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with implementations
//!   for file polling, the telemetry API, and channel-based input
//! - **[`data`]**: Threshold classification ([`classify`]), history filtering and
//!   reshaping ([`build_series`]), snapshot conversion and CSV export
//! - **[`ui`]**: Terminal rendering using ratatui - dryer table, schematic, history chart
//! - **[`config`]**: File and environment configuration
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a snapshot file
//! secador-monitor --file dashboard.json
//!
//! # Poll the telemetry API (credentials from secador-monitor.toml or SECADOR_*)
//! secador-monitor --api
//!
//! # Export a CSV report without starting the UI
//! secador-monitor --export report.csv --dryer "Secador 1" --from 2024-01-01
//! ```
//!
//! ### Classifying a reading
//!
//! ```
//! use secador_monitor::{classify, Metric, Severity};
//!
//! assert_eq!(classify(Metric::PressaoQueimador, -2.5, None), Severity::Critical);
//! assert_eq!(classify(Metric::TemperaturaQueimador, 680.0, None), Severity::Warning);
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use secador_monitor::{App, ChannelSource};
//!
//! // Create a channel for pushing snapshots
//! let (tx, source) = ChannelSource::create("embedded");
//!
//! // Create the app
//! let app = App::new(Box::new(source));
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::DashboardConfig;
pub use data::{
    build_series, classify, classify_id, DashboardData, DateRange, DryerReading, DryerStatus,
    Metric, MetricSelection, SeriesPoint, Severity, TelemetryRecord, ThresholdConfig,
};
pub use error::ApiError;
pub use source::{
    ApiClient, ApiSource, ChannelSource, DashboardSnapshot, DataSource, FileSource, HistoryQuery,
};
