//! Synthetic reading generation.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::Decimal2;

/// Body posted to the water-quality ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Village identifier
    pub village: String,
    /// pH, two fractional digits
    pub ph: Decimal2,
    /// Turbidity in NTU, two fractional digits
    pub turbidity: Decimal2,
    /// Contaminant name to severity label
    pub contaminants: BTreeMap<String, String>,
}

/// Value ranges and contaminant labels for one water condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingProfile {
    /// pH range
    pub ph: RangeInclusive<f64>,
    /// Turbidity range (NTU)
    pub turbidity: RangeInclusive<f64>,
    /// E. coli severity label
    pub e_coli: &'static str,
    /// Arsenic severity label
    pub arsenic: &'static str,
}

impl ReadingProfile {
    /// Clean water.
    pub fn normal() -> Self {
        Self {
            ph: 6.8..=7.8,
            turbidity: 0.5..=4.5,
            e_coli: "low",
            arsenic: "safe",
        }
    }

    /// Water during a contamination event.
    pub fn contaminated() -> Self {
        Self {
            ph: 4.5..=6.0,
            turbidity: 8.0..=20.0,
            e_coli: "high",
            arsenic: "moderate",
        }
    }

    /// The always-contaminated demonstration village.
    pub fn demo() -> Self {
        Self {
            ph: 4.5..=6.0,
            turbidity: 10.0..=25.0,
            e_coli: "high",
            arsenic: "critical",
        }
    }

    /// Draw a reading for `village`.
    pub fn sample<R: Rng + ?Sized>(&self, village: &str, rng: &mut R) -> SensorReading {
        let mut contaminants = BTreeMap::new();
        contaminants.insert("e-coli".to_string(), self.e_coli.to_string());
        contaminants.insert("arsenic".to_string(), self.arsenic.to_string());

        SensorReading {
            village: village.to_string(),
            ph: round2(rng.gen_range(self.ph.clone())),
            turbidity: round2(rng.gen_range(self.turbidity.clone())),
            contaminants,
        }
    }
}

fn round2(value: f64) -> Decimal2 {
    // sampled ranges are finite and small
    Decimal2::from_hundredths((value * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn within(value: Decimal2, lo: i64, hi: i64) -> bool {
        (lo..=hi).contains(&value.hundredths())
    }

    #[test]
    fn test_profiles_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let normal = ReadingProfile::normal().sample("ziro_arunachal", &mut rng);
            assert!(within(normal.ph, 680, 780));
            assert!(within(normal.turbidity, 50, 450));

            let bad = ReadingProfile::contaminated().sample("ziro_arunachal", &mut rng);
            assert!(within(bad.ph, 450, 600));
            assert!(within(bad.turbidity, 800, 2000));

            let demo = ReadingProfile::demo().sample("majuli_assam", &mut rng);
            assert!(within(demo.turbidity, 1000, 2500));
        }
    }

    #[test]
    fn test_contaminant_labels() {
        let mut rng = StdRng::seed_from_u64(1);
        let demo = ReadingProfile::demo().sample("majuli_assam", &mut rng);
        assert_eq!(demo.contaminants["e-coli"], "high");
        assert_eq!(demo.contaminants["arsenic"], "critical");

        let normal = ReadingProfile::normal().sample("ziro_arunachal", &mut rng);
        assert_eq!(normal.contaminants["arsenic"], "safe");
    }
}
