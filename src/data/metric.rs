//! The fixed set of dryer metrics and their display definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A metric reported by a grain dryer.
///
/// The first eight variants are recorded in the telemetry history and can be
/// charted; the two tonnage metrics only exist on the live panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    UmidadeEntrada,
    UmidadeSaida,
    TemperaturaQueimador,
    PressaoQueimador,
    TemperaturaEntrada,
    TemperaturaSaida,
    TcEntrada,
    TcSaida,
    ToneladaEntrada,
    ToneladaSaida,
}

/// Display information for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDefinition {
    /// Full label used in the chart legend and tables.
    pub label: &'static str,
    /// Compact label used on the schematic badges.
    pub short_label: &'static str,
    /// Unit suffix, e.g. `"°C"`.
    pub unit: &'static str,
    /// Series color as RGB.
    pub color: (u8, u8, u8),
}

impl MetricDefinition {
    /// Color as a `#RRGGBB` string.
    pub fn hex(&self) -> String {
        let (r, g, b) = self.color;
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

/// Error returned when parsing an unknown metric identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

impl Metric {
    /// Every known metric.
    pub const ALL: [Metric; 10] = [
        Metric::UmidadeEntrada,
        Metric::UmidadeSaida,
        Metric::TemperaturaQueimador,
        Metric::PressaoQueimador,
        Metric::TemperaturaEntrada,
        Metric::TemperaturaSaida,
        Metric::TcEntrada,
        Metric::TcSaida,
        Metric::ToneladaEntrada,
        Metric::ToneladaSaida,
    ];

    /// Metrics stored on every history record, in chart legend order.
    pub const SERIES: [Metric; 8] = [
        Metric::UmidadeEntrada,
        Metric::UmidadeSaida,
        Metric::TemperaturaQueimador,
        Metric::PressaoQueimador,
        Metric::TemperaturaEntrada,
        Metric::TemperaturaSaida,
        Metric::TcEntrada,
        Metric::TcSaida,
    ];

    /// Metrics shown on the live panel and schematic.
    pub const PANEL: [Metric; 8] = [
        Metric::UmidadeEntrada,
        Metric::UmidadeSaida,
        Metric::TemperaturaEntrada,
        Metric::TemperaturaSaida,
        Metric::TemperaturaQueimador,
        Metric::PressaoQueimador,
        Metric::ToneladaEntrada,
        Metric::ToneladaSaida,
    ];

    /// The wire identifier (snake case).
    pub fn id(&self) -> &'static str {
        match self {
            Metric::UmidadeEntrada => "umidade_entrada",
            Metric::UmidadeSaida => "umidade_saida",
            Metric::TemperaturaQueimador => "temperatura_queimador",
            Metric::PressaoQueimador => "pressao_queimador",
            Metric::TemperaturaEntrada => "temperatura_entrada",
            Metric::TemperaturaSaida => "temperatura_saida",
            Metric::TcEntrada => "tc_entrada",
            Metric::TcSaida => "tc_saida",
            Metric::ToneladaEntrada => "tonelada_entrada",
            Metric::ToneladaSaida => "tonelada_saida",
        }
    }

    pub fn definition(&self) -> MetricDefinition {
        let (label, short_label, unit, color) = match self {
            Metric::UmidadeEntrada => {
                ("Umidade de Entrada", "Umid. Entrada", "%", (0x1F, 0x77, 0xB4))
            }
            Metric::UmidadeSaida => ("Umidade de Saída", "Umid. Saída", "%", (0x17, 0xBE, 0xCF)),
            Metric::TemperaturaQueimador => (
                "Temperatura do Queimador",
                "Temp. Queimador",
                "°C",
                (0xFF, 0x7F, 0x0E),
            ),
            Metric::PressaoQueimador => (
                "Pressão do Queimador",
                "Press. Queimador",
                "bar",
                (0xD6, 0x27, 0x28),
            ),
            Metric::TemperaturaEntrada => {
                ("Temperatura de Entrada", "Temp. Entrada", "°C", (0x2C, 0xA0, 0x2C))
            }
            Metric::TemperaturaSaida => {
                ("Temperatura de Saída", "Temp. Saída", "°C", (0x98, 0xDF, 0x8A))
            }
            Metric::TcEntrada => ("TC - Entrada", "TC Entrada", "°C", (0x94, 0x67, 0xBD)),
            Metric::TcSaida => ("TC - Saída", "TC Saída", "°C", (0xBC, 0xBD, 0x22)),
            Metric::ToneladaEntrada => {
                ("Tonelada Entrada", "Ton. Entrada", "ton/h", (0x8C, 0x56, 0x4B))
            }
            Metric::ToneladaSaida => ("Tonelada Saída", "Ton. Saída", "ton/h", (0xE3, 0x77, 0xC2)),
        };
        MetricDefinition {
            label,
            short_label,
            unit,
            color,
        }
    }

    pub fn label(&self) -> &'static str {
        self.definition().label
    }

    pub fn unit(&self) -> &'static str {
        self.definition().unit
    }

    /// Whether history records carry a reading for this metric.
    pub fn is_recorded(&self) -> bool {
        Self::SERIES.contains(self)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.id() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_round_trip_through_from_str() {
        for metric in Metric::ALL {
            assert_eq!(metric.id().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let err = "umidade".parse::<Metric>().unwrap_err();
        assert_eq!(err, UnknownMetric("umidade".to_string()));
    }

    #[test]
    fn test_series_metrics_are_unique_and_recorded() {
        let unique: HashSet<_> = Metric::SERIES.iter().collect();
        assert_eq!(unique.len(), 8);
        assert!(Metric::SERIES.iter().all(|m| m.is_recorded()));
        assert!(!Metric::ToneladaEntrada.is_recorded());
    }

    #[test]
    fn test_definition_units() {
        assert_eq!(Metric::PressaoQueimador.unit(), "bar");
        assert_eq!(Metric::ToneladaSaida.unit(), "ton/h");
        assert_eq!(Metric::UmidadeEntrada.definition().hex(), "#1F77B4");
    }

    #[test]
    fn test_serde_uses_wire_ids() {
        let json = serde_json::to_string(&Metric::TemperaturaQueimador).unwrap();
        assert_eq!(json, "\"temperatura_queimador\"");
    }
}
