//! Conversion of raw snapshots into display-ready dashboard data.
//!
//! Invalid rows are dropped with a warning instead of failing the whole
//! refresh: rows that do not decode are skipped while reading the snapshot,
//! and rows missing required values are skipped during conversion.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, warn};

use super::metric::Metric;
use super::series::{build_series, DateRange, SeriesPoint};
use super::telemetry::{parse_reading, parse_timestamp, DryerReading, DryerStatus, TelemetryRecord};
use super::thresholds::{parse_bound, Bound, MaxBound, ThresholdConfig};
use crate::source::{
    DashboardSnapshot, RawValue, SerializedBound, SerializedDryerCard, SerializedDryerConfig,
    SerializedHistoryRow, SerializedMaxBound,
};

/// Complete parsed dashboard data ready for display.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Dryers sorted critical-first, then by name.
    pub dryers: Vec<DryerReading>,
    pub configs: Vec<ThresholdConfig>,
    pub history: Vec<TelemetryRecord>,
    pub clp_online: Option<bool>,
    pub last_updated: Instant,
}

impl DashboardData {
    /// Load and parse dashboard data from a JSON snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse dashboard data from a JSON string.
    pub fn parse(content: &str) -> Result<Self> {
        let snapshot: DashboardSnapshot = serde_json::from_str(content)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Convert a snapshot into dashboard data, classifying every live reading
    /// against its dryer's configuration.
    pub fn from_snapshot(snapshot: DashboardSnapshot) -> Self {
        let configs: Vec<ThresholdConfig> =
            snapshot.configs.iter().filter_map(convert_config).collect();

        let mut dryers: Vec<DryerReading> = snapshot
            .dryers
            .iter()
            .filter_map(|card| {
                let config = card
                    .secador
                    .as_deref()
                    .and_then(|name| configs.iter().find(|c| c.secador == name));
                convert_card(card, config)
            })
            .collect();

        dryers.sort_by(|a, b| b.health.cmp(&a.health).then_with(|| a.name.cmp(&b.name)));

        let history: Vec<TelemetryRecord> =
            snapshot.history.iter().filter_map(convert_history_row).collect();

        debug!(
            dryers = dryers.len(),
            configs = configs.len(),
            history = history.len(),
            "converted dashboard snapshot"
        );

        Self {
            dryers,
            configs,
            history,
            clp_online: snapshot.clp_online,
            last_updated: Instant::now(),
        }
    }

    /// Alert configuration of the dryer named `name`.
    pub fn config_for(&self, name: &str) -> Option<&ThresholdConfig> {
        self.configs.iter().find(|c| c.secador == name)
    }

    pub fn dryer(&self, name: &str) -> Option<&DryerReading> {
        self.dryers.iter().find(|d| d.name == name)
    }

    /// History records of one dryer, in the order received.
    pub fn history_for(&self, dryer_id: u64) -> Vec<TelemetryRecord> {
        self.history
            .iter()
            .filter(|r| r.dryer_id == dryer_id)
            .cloned()
            .collect()
    }

    /// Chart points for one dryer.
    pub fn series_for(
        &self,
        dryer_id: u64,
        selected: &[Metric],
        range: Option<&DateRange>,
    ) -> Vec<SeriesPoint> {
        build_series(&self.history_for(dryer_id), selected, range)
    }
}

fn raw_text(value: &Option<RawValue>) -> Option<String> {
    value.as_ref().map(RawValue::as_text)
}

fn reading(value: &Option<RawValue>) -> f64 {
    parse_reading(raw_text(value).as_deref())
}

fn bound(value: &Option<RawValue>) -> Option<f64> {
    parse_bound(raw_text(value).as_deref())
}

fn convert_card(
    card: &SerializedDryerCard,
    config: Option<&ThresholdConfig>,
) -> Option<DryerReading> {
    let (Some(id), Some(unit), Some(name)) = (&card.id_secador, &card.unidade, &card.secador)
    else {
        warn!(?card.secador, "skipping dryer card without id, unit or name");
        return None;
    };

    let status = DryerStatus::from_code(raw_text(&card.status).as_deref());
    let mut dryer = DryerReading::new(
        id.as_id().unwrap_or(0),
        name,
        unit,
        status,
        |metric| {
            let raw = match metric {
                Metric::UmidadeEntrada => &card.umidade_entrada,
                Metric::UmidadeSaida => &card.umidade_saida,
                Metric::TemperaturaQueimador => &card.temp_queimador,
                Metric::PressaoQueimador => &card.pressao_queimador,
                Metric::TemperaturaEntrada => &card.temp_entrada,
                Metric::TemperaturaSaida => &card.temp_saida,
                Metric::TcEntrada => &card.temp_meio,
                Metric::ToneladaEntrada => &card.ton_entrada,
                Metric::ToneladaSaida => &card.ton_saida,
                Metric::TcSaida => return None,
            };
            Some(reading(raw))
        },
        config,
    );
    dryer.updated_at = card.time_update.clone().filter(|s| !s.is_empty());
    Some(dryer)
}

fn convert_history_row(row: &SerializedHistoryRow) -> Option<TelemetryRecord> {
    let (Some(id), Some(time)) = (&row.id_secador, &row.time_update) else {
        warn!("skipping history row without id or timestamp");
        return None;
    };
    let Some(timestamp) = parse_timestamp(time) else {
        warn!(timestamp = %time, "skipping history row with unparseable timestamp");
        return None;
    };

    let dryer_id = id.as_id().unwrap_or(0);
    let mut record = TelemetryRecord::new(dryer_id, dryer_id, timestamp);
    record.umidade_entrada = reading(&row.umidade_entrada);
    record.umidade_saida = reading(&row.umidade_saida);
    record.temperatura_queimador = reading(&row.temp_queimador);
    record.pressao_queimador = reading(&row.pressao_queimador);
    record.temperatura_entrada = reading(&row.temp_entrada);
    record.temperatura_saida = reading(&row.temp_saida);
    // The API has no dedicated thermocouple fields; the mid-column sensor
    // stands in for the entry one and the exit one stays at zero.
    record.tc_entrada = reading(&row.temp_meio);
    record.tc_saida = 0.0;
    Some(record)
}

fn convert_bound(raw: &SerializedBound) -> Bound {
    Bound::new(raw.ativo, bound(&raw.min), bound(&raw.max))
}

fn convert_max_bound(raw: &SerializedMaxBound) -> MaxBound {
    MaxBound {
        enabled: raw.ativo,
        max: bound(&raw.max),
    }
}

fn convert_config(raw: &SerializedDryerConfig) -> Option<ThresholdConfig> {
    let config = (|| {
        Some(ThresholdConfig {
            empresa: raw.empresa.clone()?,
            unidade: raw.unidade.clone()?,
            secador: raw.secador.clone()?,
            nominal_capacity_tph: bound(&raw.capacidade_nominal_tph),
            temp_entrada: convert_bound(raw.temp_entrada.as_ref()?),
            temp_meio: convert_bound(raw.temp_meio.as_ref()?),
            temp_saida: convert_bound(raw.temp_saida.as_ref()?),
            temp_queimador: convert_bound(raw.temp_queimador.as_ref()?),
            pressao_queimador: convert_bound(raw.pressao_queimador.as_ref()?),
            umidade_entrada: convert_bound(raw.umidade_entrada.as_ref()?),
            umidade_saida: convert_bound(raw.umidade_saida.as_ref()?),
            ton_entrada: convert_max_bound(raw.ton_entrada.as_ref()?),
            ton_saida: convert_max_bound(raw.ton_saida.as_ref()?),
        })
    })();

    if config.is_none() {
        warn!(secador = ?raw.secador, "skipping incomplete dryer configuration");
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Severity;
    use chrono::NaiveDate;

    fn full_config_json(secador: &str) -> String {
        format!(
            r#"{{
                "empresa": "Agro", "unidade": "Penha", "secador": "{secador}",
                "capacidadeNominalTPH": "60",
                "tempEntrada": {{ "ativo": false, "min": null, "max": null }},
                "tempMeio": {{ "ativo": false, "min": null, "max": null }},
                "tempSaida": {{ "ativo": false, "min": null, "max": null }},
                "tempQueimador": {{ "ativo": true, "min": "500", "max": "700" }},
                "pressaoQueimador": {{ "ativo": true, "min": "-2", "max": "" }},
                "umidadeEntrada": {{ "ativo": false, "min": "10", "max": "25" }},
                "umidadeSaida": {{ "ativo": true, "min": null, "max": "abc" }},
                "tonEntrada": {{ "ativo": true, "max": "60" }},
                "tonSaida": {{ "ativo": false, "max": null }}
            }}"#
        )
    }

    fn sample_json() -> String {
        format!(
            r#"{{
                "dryers": [
                    {{ "idSecador": 1, "status": "1", "unidade": "Penha", "secador": "Secador A",
                       "tempQueimador": "690", "pressaoQueimador": "-1.0", "umidadeEntrada": "35",
                       "tonEntrada": "45", "timeUpdate": "2024-01-02 10:00:00" }},
                    {{ "idSecador": 2, "status": "3", "unidade": "Penha", "secador": "Secador B",
                       "tempQueimador": "690", "umidadeEntrada": "" }},
                    {{ "status": "1", "unidade": "Penha" }}
                ],
                "configs": [
                    {full},
                    {{ "empresa": "Agro", "unidade": "Penha", "secador": "Broken" }}
                ],
                "history": [
                    {{ "idSecador": 1, "timeUpdate": "2024-01-02 08:00:00",
                       "umidadeEntrada": "19.5", "tempMeio": "58", "tempQueimador": null }},
                    {{ "idSecador": 2, "timeUpdate": "2024-01-02 08:00:00", "umidadeEntrada": "17" }},
                    {{ "idSecador": 1, "timeUpdate": "not a date" }},
                    {{ "timeUpdate": "2024-01-02 09:00:00" }},
                    {{ "idSecador": "1", "timeUpdate": "2024-01-03 08:00:00", "umidadeEntrada": "18" }}
                ],
                "clp_online": false
            }}"#,
            full = full_config_json("Secador A")
        )
    }

    #[test]
    fn test_demo_snapshot() {
        let data = DashboardData::parse(include_str!("../../demos/dashboard.json")).unwrap();
        let order: Vec<(&str, Severity)> =
            data.dryers.iter().map(|d| (d.name.as_str(), d.health)).collect();
        assert_eq!(
            order,
            vec![
                ("Secador 3", Severity::Critical),
                ("Secador 2", Severity::Warning),
                ("Secador 1", Severity::Normal),
            ]
        );
        assert_eq!(data.history.len(), 20);
        assert_eq!(data.clp_online, Some(true));
    }

    #[test]
    fn test_parse_skips_invalid_rows() {
        let data = DashboardData::parse(&sample_json()).unwrap();
        assert_eq!(data.dryers.len(), 2);
        assert_eq!(data.configs.len(), 1);
        assert_eq!(data.history.len(), 3);
        assert_eq!(data.clp_online, Some(false));
    }

    #[test]
    fn test_parse_skips_wrong_typed_rows() {
        let json = format!(
            r#"{{
                "dryers": [
                    {{ "idSecador": 1, "unidade": "Penha", "secador": "Secador A" }},
                    {{ "idSecador": 2, "unidade": 7, "secador": "Secador B" }}
                ],
                "configs": [
                    {full},
                    {{ "empresa": "Agro", "unidade": "Penha", "secador": "Secador B",
                       "tempEntrada": {{ "min": "10", "max": "90" }} }}
                ],
                "history": [
                    {{ "idSecador": 1, "timeUpdate": "2024-01-02 08:00:00" }},
                    {{ "idSecador": 1, "timeUpdate": 20240102 }}
                ]
            }}"#,
            full = full_config_json("Secador A")
        );

        let data = DashboardData::parse(&json).unwrap();
        assert_eq!(data.dryers.len(), 1);
        assert_eq!(data.dryers[0].name, "Secador A");
        assert_eq!(data.configs.len(), 1);
        assert!(data.config_for("Secador A").is_some());
        assert_eq!(data.history.len(), 1);
    }

    #[test]
    fn test_config_bounds_are_parsed() {
        let data = DashboardData::parse(&sample_json()).unwrap();
        let config = data.config_for("Secador A").unwrap();

        assert_eq!(config.nominal_capacity_tph, Some(60.0));
        assert_eq!(config.temp_queimador, Bound::new(true, Some(500.0), Some(700.0)));
        assert_eq!(config.pressao_queimador, Bound::new(true, Some(-2.0), None));
        assert_eq!(config.umidade_saida, Bound::new(true, None, None));
        assert_eq!(config.ton_entrada, MaxBound { enabled: true, max: Some(60.0) });
    }

    #[test]
    fn test_configured_dryer_uses_its_bounds() {
        let data = DashboardData::parse(&sample_json()).unwrap();

        // Secador A has a config: 690 is inside 10% of max 700 -> warning,
        // humidity alerting is disabled so 35% stays normal.
        let a = data.dryer("Secador A").unwrap();
        assert_eq!(a.metric(Metric::TemperaturaQueimador).unwrap().severity, Severity::Warning);
        assert_eq!(a.metric(Metric::UmidadeEntrada).unwrap().severity, Severity::Normal);
        assert_eq!(a.status, DryerStatus::Active);
        assert_eq!(a.updated_at.as_deref(), Some("2024-01-02 10:00:00"));
        assert_eq!(a.value(Metric::ToneladaEntrada), 45.0);

        // Secador B has none: defaults flag 690 as warning, empty humidity is 0.
        let b = data.dryer("Secador B").unwrap();
        assert_eq!(b.status, DryerStatus::Maintenance);
        assert_eq!(b.health, Severity::Warning);
        assert_eq!(b.value(Metric::UmidadeEntrada), 0.0);
    }

    #[test]
    fn test_dryers_sorted_by_health_then_name() {
        let json = r#"{ "dryers": [
            { "idSecador": 1, "unidade": "U", "secador": "Zeta" },
            { "idSecador": 2, "unidade": "U", "secador": "Alpha" },
            { "idSecador": 3, "unidade": "U", "secador": "Mid", "pressaoQueimador": "-3" }
        ] }"#;
        let data = DashboardData::parse(json).unwrap();
        let names: Vec<&str> = data.dryers.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn test_history_conversion() {
        let data = DashboardData::parse(&sample_json()).unwrap();
        let history = data.history_for(1);
        assert_eq!(history.len(), 2);

        let first = &history[0];
        assert_eq!(
            first.timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(8, 0, 0).unwrap()
        );
        assert_eq!(first.umidade_entrada, 19.5);
        assert_eq!(first.tc_entrada, 58.0);
        assert_eq!(first.tc_saida, 0.0);
        assert_eq!(first.temperatura_queimador, 0.0);
    }

    #[test]
    fn test_series_for_dryer() {
        let data = DashboardData::parse(&sample_json()).unwrap();
        let range = DateRange::day(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());

        let points = data.series_for(1, &[Metric::UmidadeEntrada], Some(&range));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value(Metric::UmidadeEntrada), Some(18.0));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", sample_json()).unwrap();

        let data = DashboardData::load(file.path()).unwrap();
        assert_eq!(data.dryers.len(), 2);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(DashboardData::parse("not json").is_err());
    }
}
