//! Fitness evaluation for single-robot evolutionary runs.
//!
//! This crate scores the behavior of one tracked robot over a simulated run and produces the
//! scalar fitness consumed by an outside optimizer. It is organized in three levels:
//!
//! 1. **Step Scoring** ([`accumulator`]) - Turns one step's [`AggregatedFrame`] and wheel
//!    speeds into a step score, and updates the running counters (steps, laps, collisions,
//!    misorientation events).
//! 2. **Final Fitness** ([`accumulator::FitnessAccumulator::final_fitness`]) - Normalizes the
//!    accumulated score by the step count and applies the collision, misorientation and lap
//!    factors.
//! 3. **Run Evaluation** ([`run_evaluator`]) - Replays recorded runs through a fresh
//!    accumulator and averages fitness over several runs.
//!
//! # Architecture
//!
//! ```text
//! Run Evaluation (replay traces, average fitness)
//!     ↓ uses
//! Fitness Accumulator (step score + counters → final fitness)
//!     ↓ uses
//! Sensor Aggregation (robofit-sensor: readings → AggregatedFrame)
//! ```
//!
//! The simulator, the robot model and the collision manager stay outside this crate. They are
//! reached through the [`robot::TrackedRobot`] and [`robot::CollisionCounter`] traits.
//!
//! # Example
//!
//! ```
//! use robofit_evaluator::accumulator::{FitnessAccumulator, WheelSpeeds};
//! use robofit_sensor::{SensorKind, SensorReading, aggregate};
//!
//! let readings = [
//!     SensorReading::new(
//!         SensorKind::AmbientLight,
//!         vec![0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
//!     ),
//!     SensorReading::new(SensorKind::RedBattery, vec![1.0]),
//!     SensorReading::new(SensorKind::Ground, vec![1.0]),
//! ];
//! let frame = aggregate(&readings);
//!
//! let mut accumulator = FitnessAccumulator::default();
//! accumulator.step(&frame, WheelSpeeds::new(0.5, 0.5, 1.0))?;
//!
//! let fitness = accumulator.final_fitness(0)?;
//! assert!(fitness > 0.0);
//! # Ok::<(), robofit_evaluator::FitnessError>(())
//! ```
//!
//! # Known Quirks
//!
//! The scoring rules carry tuned constants and are reproduced as they were tuned:
//!
//! - A misorientation event with adequate battery is counted twice in one step.
//! - The final fitness uses the collision manager's total, not the locally counted contacts.
//! - Lap detection compares ground colors with exact equality.
//!
//! [`AggregatedFrame`]: robofit_sensor::AggregatedFrame

pub mod accumulator;
pub mod params;
pub mod robot;
pub mod run_evaluator;

/// Errors reported by the fitness evaluator.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FitnessError {
    #[display("no robot to track, fitness can not be computed")]
    NoRobot,
    #[display("fitness requested before any simulation step was scored")]
    NoSteps,
    #[display("no runs to evaluate")]
    NoRuns,
    #[display("maximum wheel speed must be positive and finite, got {_0}")]
    InvalidMaxWheelSpeed(#[error(not(source))] f64),
    #[display("fitness parameter `{name}` must be positive and finite, got {value}")]
    InvalidParam { name: &'static str, value: f64 },
}
