//! Project → Conjunto → Structure → Activity drill-down and progress rollup.

pub mod aggregator;
pub mod focus;
pub mod rules;

use serde_json::Value;

pub use self::aggregator::{Aggregator, ReportOutcome, activity_result};
pub use self::focus::DrillFocus;
pub use self::rules::{ActivityStatus, CompletionRule};

/// A level of the hierarchy, named by the children it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Conjuntos of a project.
    Conjuntos,
    /// Structures of a conjunto.
    Structures,
    /// Activities of a structure.
    Activities,
}

impl Level {
    /// Field on a child that points at its parent.
    pub fn parent_field(self) -> &'static str {
        match self {
            Level::Conjuntos => "id_proyecto",
            Level::Structures => "id_conjunto",
            Level::Activities => "id_estructura",
        }
    }

    pub fn children_endpoint(self) -> &'static str {
        match self {
            Level::Conjuntos => "conjunto",
            Level::Structures => "estructura",
            Level::Activities => "actividades-estructura",
        }
    }
}

/// Which backend percentage flavour to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentageVariant {
    Activities,
    Project,
    Conjunto,
}

impl PercentageVariant {
    pub fn path_segment(self) -> &'static str {
        match self {
            PercentageVariant::Activities => "porcentaje",
            PercentageVariant::Project => "porcentajeP",
            PercentageVariant::Conjunto => "porcentajeC",
        }
    }
}

/// Completion percentage, always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percentage(f64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.0);
    pub const FULL: Percentage = Percentage(100.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Percentage(value.clamp(0.0, 100.0))
    }

    /// Read a number or numeric string; anything else counts as 0.
    pub fn from_json(v: Option<&Value>) -> Self {
        let raw = match v {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        };
        Self::new(raw.unwrap_or(0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_full(self) -> bool {
        self.0 >= 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(Percentage::new(140.0).value(), 100.0);
        assert_eq!(Percentage::new(-3.0).value(), 0.0);
        assert_eq!(Percentage::new(f64::NAN).value(), 0.0);
        assert!(Percentage::new(100.0).is_full());
        assert!(!Percentage::new(99.9).is_full());
    }

    #[test]
    fn percentage_from_backend_values() {
        assert_eq!(Percentage::from_json(Some(&json!(50))).value(), 50.0);
        assert_eq!(Percentage::from_json(Some(&json!("33.5"))).value(), 33.5);
        assert_eq!(Percentage::from_json(Some(&json!("80%"))).value(), 80.0);
        assert_eq!(Percentage::from_json(Some(&json!(null))).value(), 0.0);
        assert_eq!(Percentage::from_json(None).value(), 0.0);
    }

    #[test]
    fn level_wiring() {
        assert_eq!(Level::Conjuntos.parent_field(), "id_proyecto");
        assert_eq!(Level::Activities.children_endpoint(), "actividades-estructura");
        assert_eq!(PercentageVariant::Conjunto.path_segment(), "porcentajeC");
    }
}
