use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{CashKickError, Result};

/// engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub reconciliation: ReconciliationPolicy,
    #[serde(default)]
    pub schedule_anchor: ScheduleAnchor,
}

/// how a supplied total payment amount is reconciled with the computed one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPolicy {
    /// largest absolute difference still treated as agreement
    pub tolerance: Money,
    /// which total wins when the difference exceeds the tolerance
    pub precedence: TotalPrecedence,
}

/// winner of a supplied vs computed total disagreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TotalPrecedence {
    Supplied,
    Computed,
}

/// start date used when the engine builds schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScheduleAnchor {
    /// today according to the time provider
    #[default]
    AsOfDate,
    Fixed(NaiveDate),
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self {
            tolerance: Money::CENT,
            precedence: TotalPrecedence::Supplied,
        }
    }
}

impl ReconciliationPolicy {
    /// computed total always wins a disagreement
    pub fn trust_computed(tolerance: Money) -> Self {
        Self {
            tolerance,
            precedence: TotalPrecedence::Computed,
        }
    }

    /// true when the two totals agree within tolerance
    pub fn agrees(&self, supplied: Money, computed: Money) -> bool {
        (supplied - computed).abs() <= self.tolerance
    }
}

impl EngineConfig {
    /// parse and validate a json document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_reconciliation(mut self, reconciliation: ReconciliationPolicy) -> Self {
        self.reconciliation = reconciliation;
        self
    }

    pub fn with_schedule_anchor(mut self, anchor: ScheduleAnchor) -> Self {
        self.schedule_anchor = anchor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.reconciliation.tolerance.is_negative() {
            return Err(CashKickError::InvalidConfiguration {
                message: format!(
                    "reconciliation tolerance must not be negative, got {}",
                    self.reconciliation.tolerance
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.reconciliation.tolerance, Money::CENT);
        assert_eq!(config.reconciliation.precedence, TotalPrecedence::Supplied);
        assert_eq!(config.schedule_anchor, ScheduleAnchor::AsOfDate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = EngineConfig::from_json(
            r#"{
                "reconciliation": { "tolerance": "5", "precedence": "Computed" },
                "schedule_anchor": { "Fixed": "2024-01-31" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.reconciliation, ReconciliationPolicy::trust_computed(Money::from_major(5)));
        assert_eq!(
            config.schedule_anchor,
            ScheduleAnchor::Fixed(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
        );

        let empty = EngineConfig::from_json("{}").unwrap();
        assert_eq!(empty, EngineConfig::default());
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let result = EngineConfig::from_json(
            r#"{ "reconciliation": { "tolerance": "-1", "precedence": "Supplied" } }"#,
        );
        assert!(matches!(result, Err(CashKickError::InvalidConfiguration { .. })));

        let result = EngineConfig::from_json("not json");
        assert!(matches!(result, Err(CashKickError::InvalidData { .. })));
    }

    #[test]
    fn test_agrees_within_tolerance() {
        let policy = ReconciliationPolicy::default();
        let computed = Money::from_major(12_000);
        assert!(policy.agrees(Money::from_decimal(dec!(12000.01)), computed));
        assert!(!policy.agrees(Money::from_decimal(dec!(12000.02)), computed));
        assert!(!policy.agrees(Money::from_major(15_000), computed));
    }
}
