//! Dryer telemetry: historical records and live readings.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;

use super::metric::Metric;
use super::severity::{classify, Severity};
use super::thresholds::ThresholdConfig;

/// Timestamp layouts accepted besides RFC 3339.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// One timestamped history sample of a dryer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub id: u64,
    pub dryer_id: u64,
    /// Local wall-clock time of the sample.
    pub timestamp: NaiveDateTime,
    pub umidade_entrada: f64,
    pub umidade_saida: f64,
    pub temperatura_queimador: f64,
    pub pressao_queimador: f64,
    pub temperatura_entrada: f64,
    pub temperatura_saida: f64,
    pub tc_entrada: f64,
    pub tc_saida: f64,
}

impl TelemetryRecord {
    /// Create a record with every reading at zero.
    pub fn new(id: u64, dryer_id: u64, timestamp: NaiveDateTime) -> Self {
        Self {
            id,
            dryer_id,
            timestamp,
            umidade_entrada: 0.0,
            umidade_saida: 0.0,
            temperatura_queimador: 0.0,
            pressao_queimador: 0.0,
            temperatura_entrada: 0.0,
            temperatura_saida: 0.0,
            tc_entrada: 0.0,
            tc_saida: 0.0,
        }
    }

    /// The reading for `metric`, or `None` for metrics not kept in history.
    pub fn reading(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::UmidadeEntrada => Some(self.umidade_entrada),
            Metric::UmidadeSaida => Some(self.umidade_saida),
            Metric::TemperaturaQueimador => Some(self.temperatura_queimador),
            Metric::PressaoQueimador => Some(self.pressao_queimador),
            Metric::TemperaturaEntrada => Some(self.temperatura_entrada),
            Metric::TemperaturaSaida => Some(self.temperatura_saida),
            Metric::TcEntrada => Some(self.tc_entrada),
            Metric::TcSaida => Some(self.tc_saida),
            Metric::ToneladaEntrada | Metric::ToneladaSaida => None,
        }
    }

    /// Builder-style setter used when converting API rows and in tests.
    pub fn with_reading(mut self, metric: Metric, value: f64) -> Self {
        let slot = match metric {
            Metric::UmidadeEntrada => &mut self.umidade_entrada,
            Metric::UmidadeSaida => &mut self.umidade_saida,
            Metric::TemperaturaQueimador => &mut self.temperatura_queimador,
            Metric::PressaoQueimador => &mut self.pressao_queimador,
            Metric::TemperaturaEntrada => &mut self.temperatura_entrada,
            Metric::TemperaturaSaida => &mut self.temperatura_saida,
            Metric::TcEntrada => &mut self.tc_entrada,
            Metric::TcSaida => &mut self.tc_saida,
            Metric::ToneladaEntrada | Metric::ToneladaSaida => return self,
        };
        *slot = value;
        self
    }
}

/// Operating status reported for a dryer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DryerStatus {
    Active,
    #[default]
    Inactive,
    Maintenance,
}

impl DryerStatus {
    /// Map the API status code: `"1"` is running, `"3"` is under maintenance,
    /// anything else (including no code) is inactive.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("1") => DryerStatus::Active,
            Some("3") => DryerStatus::Maintenance,
            _ => DryerStatus::Inactive,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DryerStatus::Active => "Ativo",
            DryerStatus::Inactive => "Inativo",
            DryerStatus::Maintenance => "Manutenção",
        }
    }
}

/// A single live reading with its computed severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricReading {
    pub metric: Metric,
    pub value: f64,
    pub severity: Severity,
}

/// Live panel values of one dryer.
#[derive(Debug, Clone, PartialEq)]
pub struct DryerReading {
    pub dryer_id: u64,
    pub name: String,
    pub unit: String,
    pub status: DryerStatus,
    /// Readings in [`Metric::PANEL`] order.
    pub metrics: Vec<MetricReading>,
    /// Worst severity across all readings.
    pub health: Severity,
    pub updated_at: Option<String>,
}

impl DryerReading {
    /// Build a reading from raw values, classifying each metric.
    ///
    /// `value` is queried for every metric in [`Metric::PANEL`]; missing
    /// values read as zero.
    pub fn new(
        dryer_id: u64,
        name: &str,
        unit: &str,
        status: DryerStatus,
        value: impl Fn(Metric) -> Option<f64>,
        config: Option<&ThresholdConfig>,
    ) -> Self {
        let metrics: Vec<MetricReading> = Metric::PANEL
            .iter()
            .map(|&metric| {
                let value = value(metric).unwrap_or(0.0);
                MetricReading {
                    metric,
                    value,
                    severity: classify(metric, value, config),
                }
            })
            .collect();

        let health = metrics.iter().map(|m| m.severity).max().unwrap_or_default();

        Self {
            dryer_id,
            name: name.to_string(),
            unit: unit.to_string(),
            status,
            metrics,
            health,
            updated_at: None,
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricReading> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    pub fn value(&self, metric: Metric) -> f64 {
        self.metric(metric).map_or(0.0, |m| m.value)
    }
}

/// Parse a numeric reading as sent by the API.
///
/// Empty, `"null"` and unparseable values read as zero.
pub fn parse_reading(raw: Option<&str>) -> f64 {
    let Some(raw) = raw.map(str::trim) else {
        return 0.0;
    };
    if raw.is_empty() || raw == "null" {
        return 0.0;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parse a timestamp into local wall-clock time.
///
/// RFC 3339 values are converted to the local timezone; offset-less values
/// are taken as already local.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
