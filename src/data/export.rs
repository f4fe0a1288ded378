//! CSV report export of dryer history.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Result};
use serde::Serialize;

use super::series::{filter_records, DateRange};
use super::telemetry::TelemetryRecord;

const REPORT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One report line. Field names become the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Data/Hora")]
    pub timestamp: String,
    #[serde(rename = "Umidade Entrada (%)")]
    pub umidade_entrada: f64,
    #[serde(rename = "Umidade Saída (%)")]
    pub umidade_saida: f64,
    #[serde(rename = "Temperatura Queimador (°C)")]
    pub temperatura_queimador: f64,
    #[serde(rename = "Pressão Queimador (bar)")]
    pub pressao_queimador: f64,
    #[serde(rename = "Temperatura Entrada (°C)")]
    pub temperatura_entrada: f64,
    #[serde(rename = "Temperatura Saída (°C)")]
    pub temperatura_saida: f64,
    #[serde(rename = "TC Entrada (°C)")]
    pub tc_entrada: f64,
    #[serde(rename = "TC Saída (°C)")]
    pub tc_saida: f64,
}

impl From<&TelemetryRecord> for ReportRow {
    fn from(record: &TelemetryRecord) -> Self {
        Self {
            timestamp: record.timestamp.format(REPORT_TIMESTAMP_FORMAT).to_string(),
            umidade_entrada: record.umidade_entrada,
            umidade_saida: record.umidade_saida,
            temperatura_queimador: record.temperatura_queimador,
            pressao_queimador: record.pressao_queimador,
            temperatura_entrada: record.temperatura_entrada,
            temperatura_saida: record.temperatura_saida,
            tc_entrada: record.tc_entrada,
            tc_saida: record.tc_saida,
        }
    }
}

/// Report rows for the records inside `range`, in input order.
pub fn report_rows(records: &[TelemetryRecord], range: Option<&DateRange>) -> Vec<ReportRow> {
    filter_records(records, range).map(ReportRow::from).collect()
}

/// Report file name, e.g. `Relatorio_Secador_1_2024-01-01_todos.csv`.
pub fn report_filename(dryer_name: &str, range: &DateRange) -> String {
    let name = dryer_name.split_whitespace().collect::<Vec<_>>().join("_");
    let bound = |date: Option<chrono::NaiveDate>| {
        date.map_or_else(|| "todos".to_string(), |d| d.format(DATE_FORMAT).to_string())
    };
    format!("Relatorio_{}_{}_{}.csv", name, bound(range.start), bound(range.end))
}

/// Write the report for `records` to `writer`.
///
/// Returns the number of data rows written. Fails when nothing falls inside
/// the range.
pub fn write_report<W: Write>(
    writer: W,
    records: &[TelemetryRecord],
    range: Option<&DateRange>,
) -> Result<usize> {
    let rows = report_rows(records, range);
    if rows.is_empty() {
        bail!("No data to export");
    }

    let mut csv = csv::Writer::from_writer(writer);
    for row in &rows {
        csv.serialize(row)?;
    }
    csv.flush()?;

    Ok(rows.len())
}

/// Write the report to a file at `path`.
pub fn export_report(
    path: &Path,
    records: &[TelemetryRecord],
    range: Option<&DateRange>,
) -> Result<usize> {
    // Check first so an empty export does not leave an empty file behind.
    if filter_records(records, range).next().is_none() {
        bail!("No data to export");
    }
    let file = File::create(path)?;
    write_report(file, records, range)
}
