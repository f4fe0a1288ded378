//! Per-dryer alert bounds.
//!
//! A [`ThresholdConfig`] is fetched once per company and matched to a dryer
//! by name. Metrics without a config fall back to the built-in defaults in
//! [`super::severity`].

use super::metric::Metric;

/// Alert bounds for one metric.
///
/// Either bound may be absent. A disabled bound never raises an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bound {
    pub enabled: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bound {
    pub fn new(enabled: bool, min: Option<f64>, max: Option<f64>) -> Self {
        Self { enabled, min, max }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Upper-only bound, used for throughput.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MaxBound {
    pub enabled: bool,
    pub max: Option<f64>,
}

/// Alert configuration for a single dryer.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    pub empresa: String,
    pub unidade: String,
    pub secador: String,
    pub nominal_capacity_tph: Option<f64>,
    pub temp_entrada: Bound,
    pub temp_meio: Bound,
    pub temp_saida: Bound,
    pub temp_queimador: Bound,
    pub pressao_queimador: Bound,
    pub umidade_entrada: Bound,
    pub umidade_saida: Bound,
    pub ton_entrada: MaxBound,
    pub ton_saida: MaxBound,
}

impl ThresholdConfig {
    /// Create a config with every bound disabled.
    pub fn new(empresa: &str, unidade: &str, secador: &str) -> Self {
        Self {
            empresa: empresa.to_string(),
            unidade: unidade.to_string(),
            secador: secador.to_string(),
            nominal_capacity_tph: None,
            temp_entrada: Bound::disabled(),
            temp_meio: Bound::disabled(),
            temp_saida: Bound::disabled(),
            temp_queimador: Bound::disabled(),
            pressao_queimador: Bound::disabled(),
            umidade_entrada: Bound::disabled(),
            umidade_saida: Bound::disabled(),
            ton_entrada: MaxBound::default(),
            ton_saida: MaxBound::default(),
        }
    }

    /// The bound that drives alerts for `metric`.
    ///
    /// Returns `None` for metrics that cannot be configured (tonnage and the
    /// auxiliary thermocouples).
    pub fn bound(&self, metric: Metric) -> Option<&Bound> {
        match metric {
            Metric::UmidadeEntrada => Some(&self.umidade_entrada),
            Metric::UmidadeSaida => Some(&self.umidade_saida),
            Metric::TemperaturaQueimador => Some(&self.temp_queimador),
            Metric::PressaoQueimador => Some(&self.pressao_queimador),
            Metric::TemperaturaEntrada => Some(&self.temp_entrada),
            Metric::TemperaturaSaida => Some(&self.temp_saida),
            Metric::TcEntrada
            | Metric::TcSaida
            | Metric::ToneladaEntrada
            | Metric::ToneladaSaida => None,
        }
    }

    pub fn bound_mut(&mut self, metric: Metric) -> Option<&mut Bound> {
        match metric {
            Metric::UmidadeEntrada => Some(&mut self.umidade_entrada),
            Metric::UmidadeSaida => Some(&mut self.umidade_saida),
            Metric::TemperaturaQueimador => Some(&mut self.temp_queimador),
            Metric::PressaoQueimador => Some(&mut self.pressao_queimador),
            Metric::TemperaturaEntrada => Some(&mut self.temp_entrada),
            Metric::TemperaturaSaida => Some(&mut self.temp_saida),
            Metric::TcEntrada
            | Metric::TcSaida
            | Metric::ToneladaEntrada
            | Metric::ToneladaSaida => None,
        }
    }
}

/// Parse a bound value as sent by the API.
///
/// Empty or unparseable strings are treated as an absent bound.
pub fn parse_bound(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
