//! Simulated IoT water-quality sensors.
//!
//! Each village is either `Normal` or `Contaminated` until some instant. A
//! [`Simulator`] advances an explicit [`SimulatorState`] one tick at a time and
//! produces one [`SensorReading`] per village. Time and randomness are passed
//! in, so a tick is deterministic under a seeded RNG.

mod reading;
mod state;

pub use reading::{ReadingProfile, SensorReading};
pub use state::{SimulationEvent, Simulator, SimulatorConfig, SimulatorState, Tick, VillageStatus};
