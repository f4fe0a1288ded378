//! Wire types for dashboard snapshots.
//!
//! These mirror the JSON returned by the telemetry API: field names are the
//! API's camelCase names and numeric values may arrive as strings, numbers
//! or null. A [`DashboardSnapshot`] bundles the responses of one refresh and
//! is also the format of snapshot files.
//!
//! Rows are decoded one at a time: a row that does not fit its type is
//! logged and skipped, and the rest of the section is kept.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A scalar that the API may send either as a string or as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl RawValue {
    /// Text form, as the API's string-typed fields would carry it.
    pub fn as_text(&self) -> String {
        match self {
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s.clone(),
            RawValue::Flag(b) => b.to_string(),
        }
    }

    /// Integer id, if the value holds one.
    pub fn as_id(&self) -> Option<u64> {
        match self {
            RawValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as u64),
            RawValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Everything fetched in one refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Live dryer cards (`/secador/online`).
    #[serde(default, deserialize_with = "dryer_rows")]
    pub dryers: Vec<SerializedDryerCard>,
    /// Alert configuration rows (`/secador/config`).
    #[serde(default, deserialize_with = "config_rows")]
    pub configs: Vec<SerializedDryerConfig>,
    /// History rows (`/secador/dados`).
    #[serde(default, deserialize_with = "history_rows")]
    pub history: Vec<SerializedHistoryRow>,
    /// PLC connectivity (`/status-clp`), `None` when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clp_online: Option<bool>,
}

/// Live values of one dryer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDryerCard {
    pub id_secador: Option<RawValue>,
    pub status: Option<RawValue>,
    pub unidade: Option<String>,
    pub secador: Option<String>,
    pub temp_entrada: Option<RawValue>,
    pub temp_meio: Option<RawValue>,
    pub temp_saida: Option<RawValue>,
    pub pressao_queimador: Option<RawValue>,
    pub temp_queimador: Option<RawValue>,
    pub umidade_entrada: Option<RawValue>,
    pub umidade_saida: Option<RawValue>,
    pub ton_entrada: Option<RawValue>,
    pub ton_saida: Option<RawValue>,
    pub time_update: Option<String>,
}

/// A historical sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedHistoryRow {
    pub id_secador: Option<RawValue>,
    pub time_update: Option<String>,
    pub umidade_entrada: Option<RawValue>,
    pub umidade_saida: Option<RawValue>,
    pub temp_queimador: Option<RawValue>,
    pub pressao_queimador: Option<RawValue>,
    pub temp_entrada: Option<RawValue>,
    pub temp_saida: Option<RawValue>,
    pub temp_meio: Option<RawValue>,
}

/// Alert bounds of a metric with both limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedBound {
    pub ativo: bool,
    #[serde(default)]
    pub min: Option<RawValue>,
    #[serde(default)]
    pub max: Option<RawValue>,
}

/// Alert bound of a metric with only an upper limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedMaxBound {
    pub ativo: bool,
    #[serde(default)]
    pub max: Option<RawValue>,
}

/// Alert configuration of one dryer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDryerConfig {
    pub empresa: Option<String>,
    pub unidade: Option<String>,
    pub secador: Option<String>,
    #[serde(rename = "capacidadeNominalTPH")]
    pub capacidade_nominal_tph: Option<RawValue>,
    pub temp_entrada: Option<SerializedBound>,
    pub temp_meio: Option<SerializedBound>,
    pub temp_saida: Option<SerializedBound>,
    pub temp_queimador: Option<SerializedBound>,
    pub pressao_queimador: Option<SerializedBound>,
    pub umidade_entrada: Option<SerializedBound>,
    pub umidade_saida: Option<SerializedBound>,
    pub ton_entrada: Option<SerializedMaxBound>,
    pub ton_saida: Option<SerializedMaxBound>,
}

/// Decode each row on its own, dropping the ones that do not fit `T`.
pub fn parse_rows<T: DeserializeOwned>(kind: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(kind, index, error = %e, "skipping malformed row");
                None
            }
        })
        .collect()
}

fn lenient_rows<'de, D, T>(deserializer: D, kind: &str) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(parse_rows(kind, rows))
}

fn dryer_rows<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<SerializedDryerCard>, D::Error> {
    lenient_rows(d, "dryer card")
}

fn config_rows<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<SerializedDryerConfig>, D::Error> {
    lenient_rows(d, "dryer config")
}

fn history_rows<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<SerializedHistoryRow>, D::Error> {
    lenient_rows(d, "history row")
}
