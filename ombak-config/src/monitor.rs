//! Classification thresholds and escalation parameters.

use ombak_core::observation::ThresholdSet;
use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Severity boundaries in pixels from the top of the frame.
///
/// Smaller Y means a taller wave, so the values normally descend from `low`
/// to `extreme`. Ordering is not enforced: a misordered set classifies
/// deterministically (most severe satisfied boundary wins) and is reported
/// as a startup warning via [`ThresholdConfig::ordering_warning`].
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ThresholdConfig {
    #[serde(default = "default_low")]
    #[validate(range(min = 0, max = 10000))]
    pub low: i64,

    #[serde(default = "default_moderate")]
    #[validate(range(min = 0, max = 10000))]
    pub moderate: i64,

    #[serde(default = "default_high")]
    #[validate(range(min = 0, max = 10000))]
    pub high: i64,

    #[serde(default = "default_very_high")]
    #[validate(range(min = 0, max = 10000))]
    pub very_high: i64,

    #[serde(default = "default_extreme")]
    #[validate(range(min = 0, max = 10000))]
    pub extreme: i64,
}

fn default_low() -> i64 {
    280
}
fn default_moderate() -> i64 {
    250
}
fn default_high() -> i64 {
    230
}
fn default_very_high() -> i64 {
    210
}
fn default_extreme() -> i64 {
    180
}

impl ThresholdConfig {
    pub fn as_set(&self) -> ThresholdSet {
        ThresholdSet {
            low: self.low,
            moderate: self.moderate,
            high: self.high,
            very_high: self.very_high,
            extreme: self.extreme,
        }
    }

    /// A human-readable warning when the boundaries are not strictly
    /// descending. The caller decides where to report it.
    pub fn ordering_warning(&self) -> Option<String> {
        if self.as_set().is_strictly_descending() {
            None
        } else {
            Some(format!(
                "thresholds are not strictly descending (low={} moderate={} high={} \
                 very_high={} extreme={}); classification keeps the most severe match",
                self.low, self.moderate, self.high, self.very_high, self.extreme
            ))
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            low: default_low(),
            moderate: default_moderate(),
            high: default_high(),
            very_high: default_very_high(),
            extreme: default_extreme(),
        }
    }
}

/// Consecutive-extreme escalation parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct EscalationConfig {
    /// Consecutive extreme observations required before a tsunami warning.
    #[serde(default = "default_escalation_threshold")]
    #[validate(range(min = 1, max = 500))]
    pub threshold: u32,

    /// Minimum seconds between two escalation fires.
    #[serde(default = "default_escalation_cooldown")]
    #[validate(range(min = 60, max = 86400))]
    pub cooldown_secs: u64,
}

fn default_escalation_threshold() -> u32 {
    12
}

fn default_escalation_cooldown() -> u64 {
    1800
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            threshold: default_escalation_threshold(),
            cooldown_secs: default_escalation_cooldown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn default_monitor_configs_validate() {
        ThresholdConfig::default().validate().expect("thresholds");
        EscalationConfig::default().validate().expect("escalation");
    }

    #[test]
    fn misordered_thresholds_warn_instead_of_failing() {
        let mut config = ThresholdConfig::default();
        config.low = 100; // below every other boundary
        config.validate().expect("misordering is not a hard error");
        assert!(config.ordering_warning().is_some());
    }

    #[test]
    fn ordered_thresholds_produce_no_warning() {
        assert!(ThresholdConfig::default().ordering_warning().is_none());
    }
}
