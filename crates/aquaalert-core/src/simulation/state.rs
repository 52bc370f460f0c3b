//! Per-village contamination state machine.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use super::reading::{ReadingProfile, SensorReading};
use crate::domain::{VillageRegistry, DEMO_VILLAGE_ID};

/// Water condition of a single village.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VillageStatus {
    /// Clean water
    Normal,
    /// Contamination event in progress
    Contaminated {
        /// Instant after which the village returns to normal
        until: DateTime<Utc>,
    },
}

impl VillageStatus {
    /// Whether water is currently contaminated
    pub fn is_contaminated(&self) -> bool {
        matches!(self, VillageStatus::Contaminated { .. })
    }
}

/// Simulator tuning.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Chance per tick that a new contamination event starts
    pub contamination_probability: f64,
    /// Shortest contamination event
    pub min_event_duration: Duration,
    /// Longest contamination event
    pub max_event_duration: Duration,
    /// Village pinned to contaminated readings, if any
    pub demo_village: Option<String>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            contamination_probability: 0.05,
            min_event_duration: Duration::minutes(2),
            max_event_duration: Duration::minutes(5),
            demo_village: Some(DEMO_VILLAGE_ID.to_string()),
        }
    }
}

/// Status of every simulated village, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorState {
    villages: Vec<(String, VillageStatus)>,
}

impl SimulatorState {
    /// All villages of `registry`, starting normal.
    pub fn new(registry: &VillageRegistry) -> Self {
        Self {
            villages: registry
                .iter()
                .map(|v| (v.id.to_string(), VillageStatus::Normal))
                .collect(),
        }
    }

    /// Status of `village`, if simulated.
    pub fn status(&self, village: &str) -> Option<VillageStatus> {
        self.villages
            .iter()
            .find(|(id, _)| id == village)
            .map(|(_, status)| *status)
    }

    /// Overwrite the status of `village`. Unknown villages are ignored.
    pub fn set_status(&mut self, village: &str, status: VillageStatus) {
        if let Some(entry) = self.villages.iter_mut().find(|(id, _)| id == village) {
            entry.1 = status;
        }
    }

    /// Villages and statuses in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, VillageStatus)> {
        self.villages.iter().map(|(id, status)| (id.as_str(), *status))
    }
}

/// A state transition that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationEvent {
    /// Contamination ended
    Resolved {
        /// Village identifier
        village: String,
    },
    /// Contamination started
    Contaminated {
        /// Village identifier
        village: String,
        /// When it will end
        until: DateTime<Utc>,
    },
}

/// Result of one tick.
#[derive(Debug, Clone)]
pub struct Tick {
    /// State to feed into the next tick
    pub state: SimulatorState,
    /// Transitions applied this tick
    pub events: Vec<SimulationEvent>,
    /// One reading per village, registry order
    pub readings: Vec<SensorReading>,
}

/// Advances village states and generates readings.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Create a simulator
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Contamination chance clamped to `0..=1`; NaN counts as never.
    fn contamination_chance(&self) -> f64 {
        let p = self.config.contamination_probability;
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }

    fn is_demo(&self, village: &str) -> bool {
        self.config.demo_village.as_deref() == Some(village)
    }

    /// Run one tick at `now`.
    pub fn tick<R: Rng + ?Sized>(
        &self,
        mut state: SimulatorState,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Tick {
        let mut events = Vec::new();

        for (village, status) in state.villages.iter_mut() {
            if let VillageStatus::Contaminated { until } = *status {
                if now > until {
                    *status = VillageStatus::Normal;
                    tracing::info!(village = %village, "contamination event resolved");
                    events.push(SimulationEvent::Resolved {
                        village: village.clone(),
                    });
                }
            }
        }

        if rng.gen_bool(self.contamination_chance()) {
            let candidates: Vec<String> = state
                .iter()
                .filter(|(id, status)| !status.is_contaminated() && !self.is_demo(id))
                .map(|(id, _)| id.to_string())
                .collect();

            if let Some(village) = candidates.choose(rng) {
                let until = now + self.event_duration(rng);
                state.set_status(village, VillageStatus::Contaminated { until });
                tracing::warn!(village = %village, until = %until, "new contamination event");
                events.push(SimulationEvent::Contaminated {
                    village: village.clone(),
                    until,
                });
            }
        }

        let readings = state
            .iter()
            .map(|(village, status)| self.profile_for(village, status).sample(village, rng))
            .collect();

        Tick {
            state,
            events,
            readings,
        }
    }

    fn event_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let lo = self.config.min_event_duration.num_milliseconds();
        let hi = self.config.max_event_duration.num_milliseconds().max(lo);
        Duration::milliseconds(rng.gen_range(lo..=hi))
    }

    fn profile_for(&self, village: &str, status: VillageStatus) -> ReadingProfile {
        if self.is_demo(village) {
            ReadingProfile::demo()
        } else if status.is_contaminated() {
            ReadingProfile::contaminated()
        } else {
            ReadingProfile::normal()
        }
    }
}
