//! Data source abstraction for receiving dashboard snapshots.
//!
//! This module provides a trait-based abstraction for receiving dryer data
//! from various sources (snapshot files, the telemetry API, in-memory
//! channels).

mod api;
mod channel;
mod file;
mod snapshot;

pub use api::{ApiClient, ApiClientBuilder, ApiSource};
pub use channel::ChannelSource;
pub use file::FileSource;
pub use snapshot::{
    parse_rows, DashboardSnapshot, RawValue, SerializedBound, SerializedDryerCard, SerializedDryerConfig,
    SerializedHistoryRow, SerializedMaxBound,
};

use std::fmt::Debug;

use crate::data::DateRange;

/// Which history window the caller wants to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Dryer name; `None` asks for every dryer.
    pub dryer: Option<String>,
    pub range: DateRange,
}

/// Trait for receiving dashboard data from various sources.
///
/// # Example
///
/// ```
/// use secador_monitor::{FileSource, DataSource};
///
/// let mut source = FileSource::new("dashboard.json");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} dryers", snapshot.dryers.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<DashboardSnapshot>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// Returns the error of the last poll, if any.
    fn error(&self) -> Option<&str>;

    /// Ask the source to fetch a different history window.
    ///
    /// Sources that always hold the full history ignore this.
    fn request_history(&mut self, _query: HistoryQuery) {}
}
