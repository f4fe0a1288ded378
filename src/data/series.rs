//! Date filtering and chart reshaping of telemetry history.
//!
//! [`build_series`] turns history records into flat points, one per record,
//! holding a time label plus the value of every selected metric. Filtering
//! works on calendar days: the time of day never excludes a record.

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::metric::Metric;
use super::telemetry::TelemetryRecord;

/// Format of the time label on chart points.
const TIME_LABEL_FORMAT: &str = "%H:%M:%S";

/// Optional calendar-day window.
///
/// Both ends are independent: with only one end set, the range is exactly
/// that day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// A range covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(Some(date), Some(date))
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether records from `date` pass the filter.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            (Some(start), None) => date == start,
            (None, Some(end)) => date == end,
            (None, None) => true,
        }
    }

    /// Short description for status lines, e.g. `2024-01-01 → 2024-01-03`.
    pub fn describe(&self) -> String {
        match (self.start, self.end) {
            (Some(start), Some(end)) => format!("{} → {}", start, end),
            (Some(day), None) | (None, Some(day)) => day.to_string(),
            (None, None) => "all dates".to_string(),
        }
    }
}

/// A chart point: time label plus one value per selected metric.
///
/// Serializes as a flat map, e.g. `{"time": "08:00:00", "umidade_entrada": 18.2}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub time: String,
    /// Values in selection order. `None` for metrics not kept in history.
    pub values: Vec<(Metric, Option<f64>)>,
}

impl SeriesPoint {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.values
            .iter()
            .find(|(m, _)| *m == metric)
            .and_then(|(_, v)| *v)
    }
}

impl Serialize for SeriesPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("time", &self.time)?;
        for (metric, value) in &self.values {
            map.serialize_entry(metric.id(), value)?;
        }
        map.end()
    }
}

/// Records whose calendar day passes `range`, in input order.
pub fn filter_records<'a>(
    records: &'a [TelemetryRecord],
    range: Option<&'a DateRange>,
) -> impl Iterator<Item = &'a TelemetryRecord> + 'a {
    records
        .iter()
        .filter(move |r| range.is_none_or(|range| range.contains(r.timestamp.date())))
}

/// Filter `records` to `range` and reshape them into chart points.
///
/// Output follows input order; nothing is sorted or deduplicated.
pub fn build_series(
    records: &[TelemetryRecord],
    selected: &[Metric],
    range: Option<&DateRange>,
) -> Vec<SeriesPoint> {
    filter_records(records, range)
        .map(|record| SeriesPoint {
            time: record.timestamp.format(TIME_LABEL_FORMAT).to_string(),
            values: selected
                .iter()
                .map(|&metric| (metric, record.reading(metric)))
                .collect(),
        })
        .collect()
}

/// The set of charted metrics.
///
/// Never empty: removing the last selected metric is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSelection {
    metrics: Vec<Metric>,
}

impl Default for MetricSelection {
    fn default() -> Self {
        Self::new(Metric::UmidadeEntrada)
    }
}

impl MetricSelection {
    pub fn new(initial: Metric) -> Self {
        Self {
            metrics: vec![initial],
        }
    }

    /// Selected metrics in the order they were added.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Add `metric` if absent, otherwise remove it unless it is the last one.
    ///
    /// Returns whether the selection changed.
    pub fn toggle(&mut self, metric: Metric) -> bool {
        if let Some(pos) = self.metrics.iter().position(|m| *m == metric) {
            if self.metrics.len() > 1 {
                self.metrics.remove(pos);
                return true;
            }
            false
        } else {
            self.metrics.push(metric);
            true
        }
    }
}
