//! Turns raw reports into the dashboard payload.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::generator::AlertGenerator;
use super::summary::{ChartData, MapPoint};
use crate::domain::{Alert, Decimal2, HealthReport, Village, VillageRegistry, WaterQualityReport};

/// Thresholds used by the aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Trailing window of reports that count toward an outbreak
    pub window: Duration,
    /// Counts strictly above this raise an outbreak alert
    pub outbreak_threshold: usize,
    /// Turbidity strictly above this is treated as contamination
    pub turbidity_threshold: Decimal2,
    /// Maximum map offset per axis, in degrees
    pub map_jitter_degrees: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            window: Duration::hours(48),
            outbreak_threshold: 4,
            turbidity_threshold: Decimal2::from_hundredths(500),
            map_jitter_degrees: 0.005,
        }
    }
}

/// In-window case count for one registry village.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VillageCount<'a> {
    /// Registry village
    pub village: &'a Village,
    /// Reports inside the window
    pub count: usize,
}

/// Everything the dashboard polls for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    /// Outbreak alerts, then predictive alerts
    pub alerts: Vec<Alert>,
    /// One point per in-window report from a known village
    pub map_report_data: Vec<MapPoint>,
    /// Case counts, busiest village first
    pub chart_data: ChartData,
}

/// Correlates recent health reports with the latest water readings.
#[derive(Debug, Clone)]
pub struct AlertAggregator {
    registry: VillageRegistry,
    config: AggregatorConfig,
    generator: AlertGenerator,
}

impl AlertAggregator {
    /// Create an aggregator over `registry`.
    pub fn new(registry: VillageRegistry, config: AggregatorConfig) -> Self {
        let generator = AlertGenerator::new(config.outbreak_threshold, config.turbidity_threshold);
        Self {
            registry,
            config,
            generator,
        }
    }

    /// The village registry
    pub fn registry(&self) -> &VillageRegistry {
        &self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Oldest timestamp still inside the window at `now` (inclusive).
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.config.window
    }

    fn in_window(&self, report: &HealthReport, now: DateTime<Utc>) -> bool {
        report.timestamp >= self.window_start(now)
    }

    /// Per-village counts in registry order. Reports outside the window or
    /// for unknown villages are ignored.
    pub fn case_counts(&self, now: DateTime<Utc>, reports: &[HealthReport]) -> Vec<VillageCount<'_>> {
        let mut counts: HashMap<&str, usize> =
            self.registry.iter().map(|v| (v.id, 0usize)).collect();

        for report in reports.iter().filter(|r| self.in_window(r, now)) {
            if let Some(count) = counts.get_mut(report.village.as_str()) {
                *count += 1;
            }
        }

        self.registry
            .iter()
            .map(|village| VillageCount {
                village,
                count: counts.get(village.id).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Build the dashboard payload.
    ///
    /// `latest_water` maps a village id to its most recent reading. `rng`
    /// drives map jitter only.
    pub fn aggregate<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        reports: &[HealthReport],
        latest_water: &HashMap<String, WaterQualityReport>,
        rng: &mut R,
    ) -> DashboardData {
        let counts = self.case_counts(now, reports);
        let alerts = self.generator.generate(&counts, latest_water);

        let map_report_data = reports
            .iter()
            .filter(|r| self.in_window(r, now))
            .filter_map(|report| {
                let village = self.registry.get(&report.village)?;
                Some(MapPoint::jittered(
                    village,
                    report,
                    self.config.map_jitter_degrees,
                    &mut *rng,
                ))
            })
            .collect::<Vec<_>>();

        let chart_data = ChartData::from_counts(&counts);

        tracing::debug!(
            alerts = alerts.len(),
            map_points = map_report_data.len(),
            "aggregated dashboard data"
        );

        DashboardData {
            alerts,
            map_report_data,
            chart_data,
        }
    }
}

impl Default for AlertAggregator {
    fn default() -> Self {
        Self::new(VillageRegistry::northeast(), AggregatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{AlertKind, UserId};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn report(village: &str, age: Duration) -> HealthReport {
        HealthReport {
            id: Uuid::new_v4(),
            village: village.to_string(),
            age_group: "18-45".to_string(),
            symptoms: vec!["fever".to_string(), "vomiting".to_string()],
            reported_by: UserId::new(),
            timestamp: now() - age,
        }
    }

    fn reports(village: &str, n: usize) -> Vec<HealthReport> {
        (0..n).map(|i| report(village, Duration::minutes(i as i64))).collect()
    }

    fn water(village: &str, turbidity: f64) -> (String, WaterQualityReport) {
        (
            village.to_string(),
            WaterQualityReport {
                id: Uuid::new_v4(),
                village: village.to_string(),
                ph: Decimal2::from_hundredths(550),
                turbidity: Decimal2::try_from_f64(turbidity).unwrap(),
                contaminants: BTreeMap::new(),
                timestamp: now(),
            },
        )
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_outbreak_with_contaminated_water() {
        let aggregator = AlertAggregator::default();
        let latest: HashMap<_, _> = [water("ziro_arunachal", 6.2)].into_iter().collect();

        let data = aggregator.aggregate(now(), &reports("ziro_arunachal", 5), &latest, &mut rng());

        assert_eq!(data.alerts.len(), 1);
        let alert = &data.alerts[0];
        assert_eq!(alert.kind, AlertKind::CriticalWater);
        assert_eq!(alert.village_id, "ziro_arunachal");
        assert!(alert.message.contains("5 cases"));
        assert!(alert.message.contains("6.2"));
    }

    #[test]
    fn test_predictive_only_for_contaminated_village() {
        let aggregator = AlertAggregator::default();
        let latest: HashMap<_, _> = [water("pelling_sikkim", 5.01)].into_iter().collect();

        let data = aggregator.aggregate(now(), &[], &latest, &mut rng());

        assert_eq!(data.alerts.len(), 1);
        assert_eq!(data.alerts[0].kind, AlertKind::Predictive);
        assert_eq!(data.alerts[0].village_id, "pelling_sikkim");
        assert!(data.map_report_data.is_empty());
        assert_eq!(data.chart_data.labels.len(), 8);
        assert!(data.chart_data.cases().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_window_boundary() {
        let aggregator = AlertAggregator::default();
        let reports = vec![
            report("majuli_assam", Duration::hours(48) + Duration::seconds(1)),
            report("majuli_assam", Duration::hours(47) + Duration::minutes(59)),
            report("majuli_assam", Duration::hours(48)),
        ];

        let counts = aggregator.case_counts(now(), &reports);
        let majuli = counts.iter().find(|c| c.village.id == "majuli_assam").unwrap();
        assert_eq!(majuli.count, 2);
    }

    #[test]
    fn test_quiet_village_produces_no_alert() {
        let aggregator = AlertAggregator::default();
        let data = aggregator.aggregate(
            now(),
            &reports("moirang_manipur", 4),
            &HashMap::new(),
            &mut rng(),
        );
        assert!(data.alerts.is_empty());
        assert_eq!(data.chart_data.labels[0], "Moirang");
        assert_eq!(data.chart_data.cases()[0], 4);
    }

    #[test]
    fn test_outbreak_is_never_also_predictive() {
        let aggregator = AlertAggregator::default();
        let latest: HashMap<_, _> = [water("khonoma_nagaland", 12.0)].into_iter().collect();

        let data = aggregator.aggregate(
            now(),
            &reports("khonoma_nagaland", 9),
            &latest,
            &mut rng(),
        );

        let for_village: Vec<_> = data
            .alerts
            .iter()
            .filter(|a| a.village_id == "khonoma_nagaland")
            .collect();
        assert_eq!(for_village.len(), 1);
        assert_eq!(for_village[0].kind, AlertKind::CriticalWater);
    }

    #[test]
    fn test_chart_sum_matches_known_in_window_reports() {
        let aggregator = AlertAggregator::default();
        let mut all = reports("ziro_arunachal", 3);
        all.extend(reports("unakoti_tripura", 6));
        all.extend(reports("atlantis", 2));
        all.push(report("ziro_arunachal", Duration::hours(72)));

        let data = aggregator.aggregate(now(), &all, &HashMap::new(), &mut rng());

        let total: usize = data.chart_data.cases().iter().sum();
        assert_eq!(total, 9);
        assert_eq!(data.map_report_data.len(), 9);
    }

    #[test]
    fn test_chart_ties_keep_registry_order() {
        let registry = VillageRegistry::new(vec![
            Village::new("c", "Charlie", 0.0, 0.0),
            Village::new("a", "Alpha", 0.0, 0.0),
            Village::new("b", "Bravo", 0.0, 0.0),
        ]);
        let aggregator = AlertAggregator::new(registry, AggregatorConfig::default());
        let mut all = reports("b", 2);
        all.extend(reports("c", 1));
        all.extend(reports("a", 1));

        let data = aggregator.aggregate(now(), &all, &HashMap::new(), &mut rng());

        assert_eq!(data.chart_data.labels, vec!["Bravo", "Charlie", "Alpha"]);
        assert_eq!(data.chart_data.cases(), &[2, 1, 1]);
    }

    #[test]
    fn test_map_jitter_is_bounded() {
        let aggregator = AlertAggregator::default();
        let all = reports("champhai_mizoram", 200);

        let data = aggregator.aggregate(now(), &all, &HashMap::new(), &mut rng());

        let village = aggregator.registry().get("champhai_mizoram").unwrap();
        assert_eq!(data.map_report_data.len(), 200);
        for point in &data.map_report_data {
            assert!((point.lat - village.lat()).abs() <= 0.005 + 1e-12);
            assert!((point.lng - village.lng()).abs() <= 0.005 + 1e-12);
            assert_eq!(point.village, "Champhai");
        }
    }

    #[test]
    fn test_alert_order_outbreaks_then_predictive() {
        let aggregator = AlertAggregator::default();
        let mut all = reports("unakoti_tripura", 5);
        all.extend(reports("mawlynnong_meghalaya", 6));
        let latest: HashMap<_, _> = [
            water("ziro_arunachal", 8.0),
            water("unakoti_tripura", 9.5),
            water("majuli_assam", 15.0),
        ]
        .into_iter()
        .collect();

        let data = aggregator.aggregate(now(), &all, &latest, &mut rng());

        let summary: Vec<_> = data
            .alerts
            .iter()
            .map(|a| (a.village_id.as_str(), a.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("mawlynnong_meghalaya", AlertKind::Critical),
                ("unakoti_tripura", AlertKind::CriticalWater),
                ("ziro_arunachal", AlertKind::Predictive),
                ("majuli_assam", AlertKind::Predictive),
            ]
        );
    }
}
