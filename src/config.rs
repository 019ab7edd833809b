use crate::domain::amount::{Amount, parse_decimal};
use crate::error::{PaymentError, Result};
use bigdecimal::Zero;

/// Environment variable holding the pre-settlement review threshold.
pub const THRESHOLD_ENV: &str = "PRE_SETTLEMENT_THRESHOLD";

/// Engine settings resolved at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub pre_settlement_threshold: Option<Amount>,
}

impl EngineConfig {
    /// Builds the config from the raw threshold setting.
    ///
    /// Absent, blank or zero disables the review gate. Anything that is not
    /// a non-negative decimal is rejected.
    pub fn from_threshold_setting(raw: Option<&str>) -> Result<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };

        let value = parse_decimal(raw)
            .map_err(|e| PaymentError::Config(format!("invalid {THRESHOLD_ENV}: {e}")))?;
        if value.is_zero() {
            return Ok(Self::default());
        }
        let threshold = Amount::new(value).map_err(|_| {
            PaymentError::Config(format!("invalid {THRESHOLD_ENV}: {raw} is negative"))
        })?;

        Ok(Self {
            pre_settlement_threshold: Some(threshold),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_settings() {
        for raw in [None, Some(""), Some("  "), Some("0"), Some("0.00")] {
            let config = EngineConfig::from_threshold_setting(raw).unwrap();
            assert_eq!(config.pre_settlement_threshold, None, "{raw:?}");
        }
    }

    #[test]
    fn test_positive_threshold() {
        let config = EngineConfig::from_threshold_setting(Some("1000.50")).unwrap();
        let threshold = config.pre_settlement_threshold.unwrap();
        assert_eq!(threshold, Amount::parse("1000.50").unwrap());
        assert_eq!(threshold.to_string(), "1000.5");
    }

    #[test]
    fn test_invalid_threshold() {
        for raw in ["abc", "-5", "1000USD"] {
            assert!(matches!(
                EngineConfig::from_threshold_setting(Some(raw)),
                Err(PaymentError::Config(_))
            ));
        }
    }
}
