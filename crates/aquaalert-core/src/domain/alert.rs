//! Alert types raised on the official dashboard.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Alert classes, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Case count crossed the outbreak threshold
    #[serde(rename = "critical")]
    Critical,
    /// Outbreak with contaminated water in the same village
    #[serde(rename = "critical-water")]
    CriticalWater,
    /// Contaminated water without an outbreak yet
    #[serde(rename = "predictive")]
    Predictive,
}

impl AlertKind {
    /// Whether this alert was triggered by the case count.
    pub fn is_outbreak(&self) -> bool {
        matches!(self, AlertKind::Critical | AlertKind::CriticalWater)
    }

    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Critical => "critical",
            AlertKind::CriticalWater => "critical-water",
            AlertKind::Predictive => "predictive",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dashboard alert for one village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert class
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Human-readable message
    pub message: String,
    /// Village identifier
    pub village_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_wire_shape() {
        let alert = Alert {
            kind: AlertKind::CriticalWater,
            message: "msg".to_string(),
            village_id: "ziro_arunachal".to_string(),
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "critical-water");
        assert_eq!(json["village_id"], "ziro_arunachal");
    }

    #[test]
    fn test_outbreak_classes() {
        assert!(AlertKind::Critical.is_outbreak());
        assert!(AlertKind::CriticalWater.is_outbreak());
        assert!(!AlertKind::Predictive.is_outbreak());
    }
}
