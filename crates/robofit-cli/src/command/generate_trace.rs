use std::path::PathBuf;

use log::info;
use rand::{Rng, SeedableRng as _};
use rand_distr::{Distribution as _, Normal};
use rand_pcg::Pcg32;
use robofit_evaluator::run_evaluator::{RobotTrace, RunTrace, TraceStep};
use robofit_sensor::{SensorKind, SensorReading};

use crate::util::Output;

/// Ground color of the track between lap markers.
const TRACK_COLOR: f64 = 1.0;
/// Ground colors of the two lap markers, in the order the robot crosses them.
const MARKER_COLORS: [f64; 2] = [0.0, 0.5];
/// Steps the robot spends on a marker.
const MARKER_WIDTH: usize = 3;

const BATTERY_DRAIN_PER_STEP: f64 = 0.002;
const COLLISION_PROBABILITY: f64 = 0.01;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateTraceArg {
    /// Number of simulated steps
    #[arg(long, default_value_t = 1000)]
    steps: usize,
    /// Steps needed to drive one lap
    #[arg(long, default_value_t = 200)]
    lap_length: usize,
    /// Maximum wheel speed of the robot
    #[arg(long, default_value_t = 1.0)]
    max_wheel_speed: f64,
    /// Standard deviation of the sensor noise
    #[arg(long, default_value_t = 0.05)]
    noise: f64,
    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Default for GenerateTraceArg {
    fn default() -> Self {
        Self {
            steps: 1000,
            lap_length: 200,
            max_wheel_speed: 1.0,
            noise: 0.05,
            seed: 0,
            output: None,
        }
    }
}

pub(crate) fn run(arg: &GenerateTraceArg) -> anyhow::Result<()> {
    anyhow::ensure!(
        arg.lap_length >= 2 * MARKER_WIDTH,
        "lap length must be at least {} steps",
        2 * MARKER_WIDTH
    );
    anyhow::ensure!(
        arg.max_wheel_speed.is_finite() && arg.max_wheel_speed > 0.0,
        "maximum wheel speed must be positive"
    );
    let trace = generate(arg)?;
    let collisions = trace.robots[0].steps.iter().filter(|s| s.collided).count();
    info!(
        "Generated {} steps ({collisions} collisions, seed {})",
        arg.steps, arg.seed
    );
    Output::save_json(&trace, arg.output.clone())
}

fn generate(arg: &GenerateTraceArg) -> anyhow::Result<RunTrace> {
    let mut rng = Pcg32::seed_from_u64(arg.seed);
    let noise = Normal::new(0.0, arg.noise)?;
    let sample = |value: f64, rng: &mut Pcg32| (value + noise.sample(rng)).clamp(0.0, 1.0);

    let mut battery = 1.0_f64;
    let mut steps = Vec::with_capacity(arg.steps);
    for i in 0..arg.steps {
        let position = i % arg.lap_length;
        let color = ground_color(position, arg.lap_length);
        if color == Some(MARKER_COLORS[0]) {
            battery = 1.0;
        }
        battery = (battery - BATTERY_DRAIN_PER_STEP).max(0.0);

        let collided = rng.random_bool(COLLISION_PROBABILITY);
        let ambient_light = [0.05, 0.6, 0.9, 0.4, 0.05, 0.0, 0.0, 0.05]
            .map(|v| sample(v, &mut rng))
            .to_vec();
        let red_light = [0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1]
            .map(|v| sample(v, &mut rng))
            .to_vec();
        let proximity = (0..8).map(|_| sample(0.1, &mut rng)).collect();
        let contact = (0..8)
            .map(|k| if collided && k == 0 { 1.0 } else { 0.0 })
            .collect();

        let cruise = arg.max_wheel_speed * 0.9;
        let jitter = arg.max_wheel_speed * 0.05;
        let left = cruise + rng.random_range(-jitter..=jitter);
        let right = cruise + rng.random_range(-jitter..=jitter);

        steps.push(TraceStep {
            left,
            right,
            collided,
            readings: vec![
                SensorReading::new(SensorKind::Proximity, proximity),
                SensorReading::new(SensorKind::AmbientLight, ambient_light),
                SensorReading::new(SensorKind::RedLight, red_light),
                SensorReading::new(SensorKind::Contact, contact),
                SensorReading::new(SensorKind::Ground, vec![color.unwrap_or(TRACK_COLOR)]),
                SensorReading::new(SensorKind::RedBattery, vec![battery]),
                SensorReading::new(SensorKind::Battery, vec![1.0]),
            ],
        });
    }

    Ok(RunTrace {
        robots: vec![RobotTrace {
            max_wheel_speed: arg.max_wheel_speed,
            steps,
        }],
    })
}

/// Marker color under the robot at `position` along the lap, if any.
fn ground_color(position: usize, lap_length: usize) -> Option<f64> {
    let half = lap_length / 2;
    match position {
        p if p < MARKER_WIDTH => Some(MARKER_COLORS[0]),
        p if (half..half + MARKER_WIDTH).contains(&p) => Some(MARKER_COLORS[1]),
        _ => None,
    }
}
