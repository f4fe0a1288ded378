//! Threshold classification of metric readings.
//!
//! Readings are classified against the dryer's [`ThresholdConfig`] when one
//! exists, and against fixed two-tier defaults otherwise.

use serde::Serialize;

use super::metric::Metric;
use super::thresholds::{Bound, ThresholdConfig};

/// Fraction of the configured range (or of a lone bound) that counts as
/// "close to the limit".
const WARNING_MARGIN: f64 = 0.1;

/// Alert level of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Severity {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Normal => "OK",
            Severity::Warning => "WARN",
            Severity::Critical => "CRIT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Normal => "Normal",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Higher readings are worse.
    Above,
    /// Lower readings are worse.
    Below,
}

/// Built-in cutoffs used when a dryer has no configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DefaultThreshold {
    warning: f64,
    critical: f64,
    direction: Direction,
}

impl DefaultThreshold {
    const fn above(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            direction: Direction::Above,
        }
    }

    const fn below(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            direction: Direction::Below,
        }
    }

    fn classify(&self, value: f64) -> Severity {
        let exceeds = |limit: f64| match self.direction {
            Direction::Above => value > limit,
            Direction::Below => value < limit,
        };
        if exceeds(self.critical) {
            Severity::Critical
        } else if exceeds(self.warning) {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

fn default_threshold(metric: Metric) -> Option<DefaultThreshold> {
    match metric {
        Metric::UmidadeEntrada => Some(DefaultThreshold::above(20.0, 30.0)),
        Metric::UmidadeSaida => Some(DefaultThreshold::above(15.0, 20.0)),
        Metric::TemperaturaQueimador => Some(DefaultThreshold::above(650.0, 700.0)),
        // Burner pressure is negative; more negative is worse.
        Metric::PressaoQueimador => Some(DefaultThreshold::below(-1.5, -2.0)),
        Metric::TemperaturaEntrada => Some(DefaultThreshold::above(100.0, 110.0)),
        Metric::TemperaturaSaida => Some(DefaultThreshold::above(70.0, 80.0)),
        Metric::TcEntrada
        | Metric::TcSaida
        | Metric::ToneladaEntrada
        | Metric::ToneladaSaida => None,
    }
}

/// Classify a reading.
///
/// Without a config the built-in defaults apply. With a config, only the
/// metric's own bound is consulted: a missing or disabled bound is always
/// [`Severity::Normal`].
pub fn classify(metric: Metric, value: f64, config: Option<&ThresholdConfig>) -> Severity {
    let Some(config) = config else {
        return default_threshold(metric).map_or(Severity::Normal, |t| t.classify(value));
    };

    match config.bound(metric) {
        Some(bound) if bound.enabled => classify_bound(value, bound),
        _ => Severity::Normal,
    }
}

/// Classify a reading identified by its wire id.
///
/// Unknown ids are not an error; they classify as [`Severity::Normal`].
pub fn classify_id(id: &str, value: f64, config: Option<&ThresholdConfig>) -> Severity {
    id.parse::<Metric>()
        .map_or(Severity::Normal, |metric| classify(metric, value, config))
}

fn classify_bound(value: f64, bound: &Bound) -> Severity {
    if bound.min.is_some_and(|min| value < min) || bound.max.is_some_and(|max| value > max) {
        return Severity::Critical;
    }

    let near_limit = match (bound.min, bound.max) {
        (Some(min), Some(max)) => {
            let margin = (max - min) * WARNING_MARGIN;
            value < min + margin || value > max - margin
        }
        (Some(min), None) => value < min + min.abs() * WARNING_MARGIN,
        (None, Some(max)) => value > max - max.abs() * WARNING_MARGIN,
        (None, None) => false,
    };

    if near_limit {
        Severity::Warning
    } else {
        Severity::Normal
    }
}
