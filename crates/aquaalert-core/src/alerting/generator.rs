//! Alert generation from per-village case counts and water readings.

use std::collections::{HashMap, HashSet};

use super::aggregator::VillageCount;
use crate::domain::{Alert, AlertKind, Decimal2, Village, WaterQualityReport};

/// Classifies villages into outbreak and predictive alerts.
#[derive(Debug, Clone)]
pub struct AlertGenerator {
    outbreak_threshold: usize,
    turbidity_threshold: Decimal2,
}

impl AlertGenerator {
    /// Create a generator. A village is in outbreak when its count is
    /// strictly greater than `outbreak_threshold`; water is contaminated when
    /// turbidity is strictly greater than `turbidity_threshold`.
    pub fn new(outbreak_threshold: usize, turbidity_threshold: Decimal2) -> Self {
        Self {
            outbreak_threshold,
            turbidity_threshold,
        }
    }

    /// Generate alerts for `counts` (registry order).
    ///
    /// Outbreak-class alerts come first in registry order, then predictive
    /// alerts for every village that did not get an outbreak alert.
    pub fn generate(
        &self,
        counts: &[VillageCount<'_>],
        latest_water: &HashMap<String, WaterQualityReport>,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let mut alerted: HashSet<&str> = HashSet::new();

        for entry in counts {
            if entry.count > self.outbreak_threshold {
                let reading = self.contaminated(latest_water.get(entry.village.id));
                alerts.push(self.outbreak_alert(entry.village, entry.count, reading));
                alerted.insert(entry.village.id);
            }
        }

        for entry in counts {
            if alerted.contains(entry.village.id) {
                continue;
            }
            if let Some(reading) = self.contaminated(latest_water.get(entry.village.id)) {
                alerts.push(Self::predictive_alert(entry.village, reading));
            }
        }

        tracing::debug!(alerts = alerts.len(), "generated dashboard alerts");
        alerts
    }

    fn contaminated<'a>(
        &self,
        reading: Option<&'a WaterQualityReport>,
    ) -> Option<&'a WaterQualityReport> {
        reading.filter(|r| r.turbidity > self.turbidity_threshold)
    }

    fn outbreak_alert(
        &self,
        village: &Village,
        count: usize,
        contaminated: Option<&WaterQualityReport>,
    ) -> Alert {
        match contaminated {
            Some(reading) => Alert {
                kind: AlertKind::CriticalWater,
                message: format!(
                    "CRITICAL: Outbreak in {} ({} cases) linked to contaminated water (Turbidity: {}).",
                    village.name, count, reading.turbidity
                ),
                village_id: village.id.to_string(),
            },
            None => Alert {
                kind: AlertKind::Critical,
                message: format!(
                    "OUTBREAK: {} cases reported in {}. Immediate action required.",
                    count, village.name
                ),
                village_id: village.id.to_string(),
            },
        }
    }

    fn predictive_alert(village: &Village, reading: &WaterQualityReport) -> Alert {
        Alert {
            kind: AlertKind::Predictive,
            message: format!(
                "PREDICTIVE: Water in {} is contaminated (Turbidity: {}). High risk of an outbreak.",
                village.name, reading.turbidity
            ),
            village_id: village.id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::VillageRegistry;

    fn reading(village: &str, turbidity: i64) -> WaterQualityReport {
        WaterQualityReport {
            id: Uuid::new_v4(),
            village: village.to_string(),
            ph: Decimal2::from_hundredths(700),
            turbidity: Decimal2::from_hundredths(turbidity),
            contaminants: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    fn generator() -> AlertGenerator {
        AlertGenerator::new(4, Decimal2::from_hundredths(500))
    }

    #[test]
    fn test_outbreak_without_water_is_critical() {
        let registry = VillageRegistry::northeast();
        let counts = vec![VillageCount {
            village: registry.get("khonoma_nagaland").unwrap(),
            count: 7,
        }];

        let alerts = generator().generate(&counts, &HashMap::new());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Critical);
        assert_eq!(
            alerts[0].message,
            "OUTBREAK: 7 cases reported in Khonoma. Immediate action required."
        );
    }

    #[test]
    fn test_turbidity_at_threshold_is_not_contaminated() {
        let registry = VillageRegistry::northeast();
        let counts = vec![VillageCount {
            village: registry.get("ziro_arunachal").unwrap(),
            count: 5,
        }];
        let mut water = HashMap::new();
        water.insert("ziro_arunachal".to_string(), reading("ziro_arunachal", 500));

        let alerts = generator().generate(&counts, &water);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Critical);
    }

    #[test]
    fn test_count_at_threshold_is_not_outbreak() {
        let registry = VillageRegistry::northeast();
        let counts = vec![VillageCount {
            village: registry.get("ziro_arunachal").unwrap(),
            count: 4,
        }];
        let mut water = HashMap::new();
        water.insert("ziro_arunachal".to_string(), reading("ziro_arunachal", 620));

        let alerts = generator().generate(&counts, &water);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Predictive);
        assert_eq!(
            alerts[0].message,
            "PREDICTIVE: Water in Ziro is contaminated (Turbidity: 6.20). High risk of an outbreak."
        );
    }

    #[test]
    fn test_outbreaks_precede_predictive() {
        let registry = VillageRegistry::northeast();
        let counts: Vec<_> = registry
            .iter()
            .map(|village| VillageCount {
                village,
                count: if village.id == "unakoti_tripura" { 6 } else { 0 },
            })
            .collect();
        let mut water = HashMap::new();
        water.insert(
            "mawlynnong_meghalaya".to_string(),
            reading("mawlynnong_meghalaya", 900),
        );

        let alerts = generator().generate(&counts, &water);
        let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Critical, AlertKind::Predictive]);
        assert_eq!(alerts[0].village_id, "unakoti_tripura");
        assert_eq!(alerts[1].village_id, "mawlynnong_meghalaya");
    }
}
