//! Health and water-quality reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Decimal2, UserId};
use crate::CoreError;

/// Longest age-group label accepted.
pub const MAX_AGE_GROUP_LEN: usize = 10;
/// Longest village identifier accepted.
pub const MAX_VILLAGE_LEN: usize = 100;

const MAX_PH_DIGITS: u32 = 4;
const MAX_TURBIDITY_DIGITS: u32 = 5;

/// A symptom report submitted by a health worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Unique identifier
    pub id: Uuid,
    /// Village identifier as submitted
    pub village: String,
    /// Age bucket label
    pub age_group: String,
    /// Reported symptoms, in submission order
    pub symptoms: Vec<String>,
    /// Submitting worker
    pub reported_by: UserId,
    /// Server-assigned creation time
    pub timestamp: DateTime<Utc>,
}

/// Unpersisted health report.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHealthReport {
    /// Village identifier
    pub village: String,
    /// Age bucket label
    pub age_group: String,
    /// Reported symptoms
    pub symptoms: Vec<String>,
    /// Submitting worker
    pub reported_by: UserId,
}

impl NewHealthReport {
    /// Check field shapes. Village membership in the registry is not checked.
    pub fn validate(&self) -> crate::Result<()> {
        validate_village(&self.village)?;
        if self.age_group.trim().is_empty() {
            return Err(CoreError::Validation("ageGroup is required".to_string()));
        }
        if self.age_group.chars().count() > MAX_AGE_GROUP_LEN {
            return Err(CoreError::Validation(format!(
                "ageGroup must be at most {MAX_AGE_GROUP_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Stamp with an id and creation time.
    pub fn into_report(self, timestamp: DateTime<Utc>) -> HealthReport {
        HealthReport {
            id: Uuid::new_v4(),
            village: self.village,
            age_group: self.age_group,
            symptoms: self.symptoms,
            reported_by: self.reported_by,
            timestamp,
        }
    }
}

/// A water-quality reading from the sensor feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterQualityReport {
    /// Unique identifier
    pub id: Uuid,
    /// Village identifier as submitted
    pub village: String,
    /// pH
    pub ph: Decimal2,
    /// Turbidity in NTU
    pub turbidity: Decimal2,
    /// Contaminant name to severity label
    pub contaminants: BTreeMap<String, String>,
    /// Server-assigned creation time
    pub timestamp: DateTime<Utc>,
}

/// Unpersisted water-quality reading.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWaterQualityReport {
    /// Village identifier
    pub village: String,
    /// pH
    pub ph: Decimal2,
    /// Turbidity in NTU
    pub turbidity: Decimal2,
    /// Contaminant name to severity label
    pub contaminants: BTreeMap<String, String>,
}

impl NewWaterQualityReport {
    /// Check field shapes.
    pub fn validate(&self) -> crate::Result<()> {
        validate_village(&self.village)?;
        self.ph.check_max_digits("ph", MAX_PH_DIGITS)?;
        self.turbidity
            .check_max_digits("turbidity", MAX_TURBIDITY_DIGITS)?;
        Ok(())
    }

    /// Stamp with an id and creation time.
    pub fn into_report(self, timestamp: DateTime<Utc>) -> WaterQualityReport {
        WaterQualityReport {
            id: Uuid::new_v4(),
            village: self.village,
            ph: self.ph,
            turbidity: self.turbidity,
            contaminants: self.contaminants,
            timestamp,
        }
    }
}

fn validate_village(village: &str) -> crate::Result<()> {
    if village.trim().is_empty() {
        return Err(CoreError::Validation("village is required".to_string()));
    }
    if village.chars().count() > MAX_VILLAGE_LEN {
        return Err(CoreError::Validation(format!(
            "village must be at most {MAX_VILLAGE_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water(village: &str, ph: f64, turbidity: f64) -> NewWaterQualityReport {
        NewWaterQualityReport {
            village: village.to_string(),
            ph: Decimal2::try_from_f64(ph).unwrap(),
            turbidity: Decimal2::try_from_f64(turbidity).unwrap(),
            contaminants: BTreeMap::new(),
        }
    }

    #[test]
    fn test_health_report_validation() {
        let mut report = NewHealthReport {
            village: "ziro_arunachal".to_string(),
            age_group: "18-45".to_string(),
            symptoms: vec!["fever".to_string()],
            reported_by: UserId::new(),
        };
        assert!(report.validate().is_ok());

        report.age_group = "eighteen-to-forty-five".to_string();
        assert!(report.validate().is_err());

        report.age_group = "18-45".to_string();
        report.village = "  ".to_string();
        assert!(report.validate().is_err());
    }

    #[test]
    fn test_unknown_village_passes_shape_validation() {
        assert!(water("atlantis", 7.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_water_digit_limits() {
        assert!(water("pelling_sikkim", 99.99, 999.99).validate().is_ok());
        assert!(water("pelling_sikkim", 100.0, 1.0).validate().is_err());
        assert!(water("pelling_sikkim", 7.0, 1000.0).validate().is_err());
    }

    #[test]
    fn test_into_report_stamps_timestamp() {
        let now = Utc::now();
        let report = water("pelling_sikkim", 7.0, 1.0).into_report(now);
        assert_eq!(report.timestamp, now);
        assert_eq!(report.turbidity.to_string(), "1.00");
    }
}
