//! Chart and map payloads for the dashboard.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aggregator::VillageCount;
use crate::domain::{HealthReport, Village};

/// One report plotted on the dashboard map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    /// Jittered latitude
    pub lat: f64,
    /// Jittered longitude
    pub lng: f64,
    /// Village display name
    pub village: String,
    /// Symptoms joined with `", "`
    pub symptoms: String,
}

impl MapPoint {
    /// Place `report` at `village` offset by up to `jitter` degrees per axis.
    pub fn jittered<R: Rng + ?Sized>(
        village: &Village,
        report: &HealthReport,
        jitter: f64,
        rng: &mut R,
    ) -> Self {
        let (d_lat, d_lng) = if jitter > 0.0 {
            (rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter))
        } else {
            (0.0, 0.0)
        };
        Self {
            lat: village.lat() + d_lat,
            lng: village.lng() + d_lng,
            village: village.name.to_string(),
            symptoms: report.symptoms.join(", "),
        }
    }
}

/// A named series of chart values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDataset {
    /// Series name
    pub name: String,
    /// Values parallel to [`ChartData::labels`]
    pub values: Vec<usize>,
}

/// Bar-chart payload: village names and case counts, busiest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    /// Village display names
    pub labels: Vec<String>,
    /// Series; currently a single "Cases" series
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    /// Build from registry-ordered counts. The sort is stable so ties keep
    /// registry order.
    pub fn from_counts(counts: &[VillageCount<'_>]) -> Self {
        let mut sorted: Vec<&VillageCount<'_>> = counts.iter().collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));

        Self {
            labels: sorted.iter().map(|c| c.village.name.to_string()).collect(),
            datasets: vec![ChartDataset {
                name: "Cases".to_string(),
                values: sorted.iter().map(|c| c.count).collect(),
            }],
        }
    }

    /// The case-count series.
    pub fn cases(&self) -> &[usize] {
        self.datasets
            .first()
            .map(|d| d.values.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::{rngs::StdRng, SeedableRng};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{UserId, VillageRegistry};

    #[test]
    fn test_map_point_joins_symptoms() {
        let registry = VillageRegistry::northeast();
        let village = registry.get("pelling_sikkim").unwrap();
        let report = HealthReport {
            id: Uuid::new_v4(),
            village: village.id.to_string(),
            age_group: "0-5".to_string(),
            symptoms: vec!["fever".to_string(), "diarrhea".to_string()],
            reported_by: UserId::new(),
            timestamp: Utc::now(),
        };
        let mut rng = StdRng::seed_from_u64(3);

        let point = MapPoint::jittered(village, &report, 0.0, &mut rng);
        assert_eq!(point.symptoms, "fever, diarrhea");
        assert_eq!(point.village, "Pelling");
        assert_eq!(point.lat, village.lat());
        assert_eq!(point.lng, village.lng());
    }

    #[test]
    fn test_chart_sorted_descending() {
        let registry = VillageRegistry::northeast();
        let counts: Vec<_> = registry
            .iter()
            .enumerate()
            .map(|(i, village)| VillageCount { village, count: i % 3 })
            .collect();

        let chart = ChartData::from_counts(&counts);
        assert_eq!(chart.labels.len(), 8);
        assert!(chart.cases().windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(chart.datasets[0].name, "Cases");
    }
}
