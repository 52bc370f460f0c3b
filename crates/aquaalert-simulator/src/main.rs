use std::time::Duration;

use anyhow::Context;
use aquaalert_core::simulation::{
    SensorReading, SimulationEvent, Simulator, SimulatorConfig, SimulatorState,
};
use aquaalert_core::VillageRegistry;
use chrono::Utc;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "aquaalert-simulator", about = "Simulated water-quality sensor feed")]
struct Args {
    /// Ingestion endpoint readings are posted to; readings are only logged when unset
    #[arg(long, env = "WEB_SERVICE_URL")]
    api_url: Option<String>,

    /// Seconds between ticks
    #[arg(long, env = "SIMULATION_INTERVAL_SECONDS", default_value = "10")]
    interval_secs: u64,

    /// Chance per tick that a new contamination event starts, within 0..=1
    #[arg(long, default_value = "0.05", value_parser = parse_probability)]
    contamination_probability: f64,

    /// Village that always reports contaminated water
    #[arg(long, default_value = "majuli_assam")]
    demo_village: String,

    /// Disable the always-contaminated demo village
    #[arg(long)]
    no_demo_village: bool,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    // also rejects NaN
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("`{raw}` is not a probability between 0 and 1"));
    }
    Ok(value)
}

impl Args {
    fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            contamination_probability: self.contamination_probability,
            demo_village: (!self.no_demo_village).then(|| self.demo_village.clone()),
            ..SimulatorConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let registry = VillageRegistry::northeast();
    let simulator = Simulator::new(args.simulator_config());
    let mut state = SimulatorState::new(&registry);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("failed to build HTTP client")?;

    match &args.api_url {
        Some(url) => info!(url = %url, "posting readings to ingestion endpoint"),
        None => warn!("WEB_SERVICE_URL not set, readings will be logged but not sent"),
    }

    info!(
        villages = registry.len(),
        interval_secs = args.interval_secs,
        demo_village = ?simulator.config().demo_village,
        "aquaalert-simulator started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(args.interval_secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        }

        let tick = simulator.tick(state, Utc::now(), &mut rng);
        state = tick.state;

        for event in &tick.events {
            match event {
                SimulationEvent::Resolved { village } => info!(%village, "water back to normal"),
                SimulationEvent::Contaminated { village, until } => {
                    warn!(%village, %until, "simulating contamination")
                }
            }
        }

        match &args.api_url {
            Some(url) => {
                let sent = send_readings(&client, url, &tick.readings).await;
                info!(sent, total = tick.readings.len(), "tick complete");
            }
            None => {
                for reading in &tick.readings {
                    info!(
                        village = %reading.village,
                        ph = %reading.ph,
                        turbidity = %reading.turbidity,
                        "generated reading"
                    );
                }
            }
        }
    }
}

/// Post each reading in turn. A rejected or failed reading is logged and
/// skipped. Returns how many were accepted.
async fn send_readings(client: &reqwest::Client, url: &str, readings: &[SensorReading]) -> usize {
    let mut sent = 0usize;
    for reading in readings {
        match client.post(url).json(reading).send().await {
            Ok(response) if response.status().is_success() => sent += 1,
            Ok(response) => {
                warn!(
                    village = %reading.village,
                    status = %response.status(),
                    "ingestion rejected reading"
                );
            }
            Err(error) => {
                warn!(village = %reading.village, %error, "failed to send reading");
            }
        }
    }
    sent
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
