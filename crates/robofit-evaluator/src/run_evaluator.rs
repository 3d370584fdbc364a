//! Run evaluation: replaying recorded runs to compute fitness.
//!
//! A [`RunTrace`] records what the simulator reported for every robot at every step: sensor
//! readings, wheel speeds, and whether the collision manager registered a collision. The
//! [`RunEvaluator`] replays a trace the same way a live host would drive the scorer:
//!
//! 1. **Select Robot** - Track the first robot (see [`select_tracked_robot`])
//! 2. **Score Steps** - Feed each recorded step to a fresh [`FitnessAccumulator`]
//! 3. **Compute Fitness** - Apply the final fitness with the collision manager's total
//!
//! Each run starts from an empty [`ScorerState`](crate::accumulator::ScorerState); nothing
//! carries over between runs.
//!
//! # Usage
//!
//! ```
//! use robofit_evaluator::{
//!     params::FitnessParams,
//!     run_evaluator::{DefaultRunEvaluator, RobotTrace, RunEvaluator, RunTrace, TraceStep},
//! };
//! use robofit_sensor::{SensorKind, SensorReading};
//!
//! let step = TraceStep {
//!     left: 0.1,
//!     right: 0.1,
//!     collided: false,
//!     readings: vec![
//!         SensorReading::new(SensorKind::AmbientLight, vec![0.0, 0.0, 1.0]),
//!         SensorReading::new(SensorKind::RedBattery, vec![1.0]),
//!         SensorReading::new(SensorKind::Ground, vec![1.0]),
//!     ],
//! };
//! let trace = RunTrace {
//!     robots: vec![RobotTrace { max_wheel_speed: 0.1, steps: vec![step; 2] }],
//! };
//!
//! let evaluator = DefaultRunEvaluator::new(FitnessParams::default());
//! let outcome = evaluator.evaluate_run(&trace)?;
//! assert_eq!(outcome.state.step_count(), 2);
//! assert_eq!(outcome.breakdown.fitness, 0.7);
//! # Ok::<(), robofit_evaluator::FitnessError>(())
//! ```

use std::fmt;

use log::{debug, error};
use robofit_sensor::SensorReading;
use serde::{Deserialize, Serialize};

use crate::{
    FitnessError,
    accumulator::{FitnessAccumulator, FitnessBreakdown, ScorerState, WheelSpeeds},
    params::FitnessParams,
    robot::{CollisionCounter, TrackedRobot, select_tracked_robot},
};

/// One recorded simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTrace {
    pub robots: Vec<RobotTrace>,
}

/// Everything recorded for one robot during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotTrace {
    pub max_wheel_speed: f64,
    pub steps: Vec<TraceStep>,
}

/// One robot's state at one simulated step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub left: f64,
    pub right: f64,
    /// Whether the collision manager registered a collision for this robot at this step.
    #[serde(default)]
    pub collided: bool,
    pub readings: Vec<SensorReading>,
}

/// A recorded step seen through the [`TrackedRobot`] interface.
#[derive(Debug, Clone, Copy)]
pub struct ReplayedRobot<'a> {
    step: &'a TraceStep,
    max_wheel_speed: f64,
}

impl<'a> ReplayedRobot<'a> {
    #[must_use]
    pub fn new(step: &'a TraceStep, max_wheel_speed: f64) -> Self {
        Self {
            step,
            max_wheel_speed,
        }
    }
}

impl TrackedRobot for ReplayedRobot<'_> {
    fn sensor_readings(&self) -> &[SensorReading] {
        &self.step.readings
    }

    fn wheel_speeds(&self) -> WheelSpeeds {
        WheelSpeeds::new(self.step.left, self.step.right, self.max_wheel_speed)
    }
}

/// Collision manager total for a replayed run: every recorded collision of every robot.
#[derive(Debug, Clone, Copy)]
pub struct TraceCollisionLog<'a> {
    trace: &'a RunTrace,
}

impl<'a> TraceCollisionLog<'a> {
    #[must_use]
    pub fn new(trace: &'a RunTrace) -> Self {
        Self { trace }
    }
}

impl CollisionCounter for TraceCollisionLog<'_> {
    fn total_collisions(&self) -> u32 {
        let count = self
            .trace
            .robots
            .iter()
            .flat_map(|robot| &robot.steps)
            .filter(|step| step.collided)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Result of evaluating one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub state: ScorerState,
    pub external_collisions: u32,
    pub breakdown: FitnessBreakdown,
}

/// Outcomes of several runs and their mean fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// One outcome per run, in input order.
    pub outcomes: Vec<RunOutcome>,
    pub mean_fitness: f64,
}

/// Evaluates recorded runs.
pub trait RunEvaluator: fmt::Debug + Send + Sync {
    /// Replays a single run and computes its fitness.
    fn evaluate_run(&self, trace: &RunTrace) -> Result<RunOutcome, FitnessError>;

    /// Replays multiple runs, returning every outcome and the average fitness.
    ///
    /// Stops at the first run that fails.
    #[expect(clippy::cast_precision_loss)]
    fn evaluate_runs(&self, traces: &[RunTrace]) -> Result<RunSummary, FitnessError> {
        if traces.is_empty() {
            return Err(FitnessError::NoRuns);
        }
        let mut outcomes = Vec::with_capacity(traces.len());
        for (index, trace) in traces.iter().enumerate() {
            let outcome = self.evaluate_run(trace).inspect_err(|err| {
                error!("run {index} could not be evaluated: {err}");
            })?;
            outcomes.push(outcome);
        }
        let total_fitness = outcomes.iter().map(|o| o.breakdown.fitness).sum::<f64>();
        let mean_fitness = total_fitness / outcomes.len() as f64;
        Ok(RunSummary {
            outcomes,
            mean_fitness,
        })
    }
}

/// Default run evaluator: replays the tracked robot's steps through a fresh accumulator.
#[derive(Debug, Default, Clone)]
pub struct DefaultRunEvaluator {
    params: FitnessParams,
}

impl DefaultRunEvaluator {
    #[must_use]
    pub fn new(params: FitnessParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &FitnessParams {
        &self.params
    }
}

impl RunEvaluator for DefaultRunEvaluator {
    fn evaluate_run(&self, trace: &RunTrace) -> Result<RunOutcome, FitnessError> {
        let robot = select_tracked_robot(&trace.robots)?;
        let mut accumulator = FitnessAccumulator::new(self.params.clone());
        for step in &robot.steps {
            accumulator.observe(&ReplayedRobot::new(step, robot.max_wheel_speed))?;
        }

        let external_collisions = TraceCollisionLog::new(trace).total_collisions();
        let breakdown = accumulator.final_fitness_breakdown(external_collisions)?;
        debug!(
            "run evaluated: {} steps, {} collisions, fitness {breakdown}",
            accumulator.state().step_count(),
            external_collisions
        );

        Ok(RunOutcome {
            state: accumulator.state().clone(),
            external_collisions,
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use robofit_sensor::SensorKind;

    use super::*;

    fn lit_step(color: f64, collided: bool) -> TraceStep {
        TraceStep {
            left: 0.1,
            right: 0.1,
            collided,
            readings: vec![
                SensorReading::new(
                    SensorKind::AmbientLight,
                    vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                ),
                SensorReading::new(SensorKind::RedBattery, vec![1.0]),
                SensorReading::new(SensorKind::Ground, vec![color]),
            ],
        }
    }

    fn single_robot(steps: Vec<TraceStep>) -> RunTrace {
        RunTrace {
            robots: vec![RobotTrace {
                max_wheel_speed: 0.1,
                steps,
            }],
        }
    }

    #[test]
    fn test_run_without_robots_fails() {
        let evaluator = DefaultRunEvaluator::default();
        let trace = RunTrace { robots: vec![] };
        assert_eq!(
            evaluator.evaluate_run(&trace).unwrap_err(),
            FitnessError::NoRobot
        );
    }

    #[test]
    fn test_run_without_steps_fails() {
        let evaluator = DefaultRunEvaluator::default();
        assert_eq!(
            evaluator.evaluate_run(&single_robot(vec![])).unwrap_err(),
            FitnessError::NoSteps
        );
    }

    #[test]
    fn test_collisions_come_from_every_robot() {
        let mut trace = single_robot(vec![lit_step(1.0, true), lit_step(1.0, false)]);
        trace.robots.push(RobotTrace {
            max_wheel_speed: 0.1,
            steps: vec![lit_step(1.0, true)],
        });
        assert_eq!(TraceCollisionLog::new(&trace).total_collisions(), 2);

        let outcome = DefaultRunEvaluator::default().evaluate_run(&trace).unwrap();
        assert_eq!(outcome.external_collisions, 2);
        assert_eq!(outcome.state.step_count(), 2);
        assert_eq!(outcome.breakdown.collision_factor, 1.0 - 0.2);
    }

    #[test]
    fn test_local_contacts_do_not_affect_fitness() {
        let mut step = lit_step(1.0, false);
        step.readings.push(SensorReading::new(SensorKind::Contact, vec![1.0]));
        let outcome = DefaultRunEvaluator::default()
            .evaluate_run(&single_robot(vec![step]))
            .unwrap();
        assert_eq!(outcome.state.collision_count(), 1);
        assert_eq!(outcome.external_collisions, 0);
        assert_eq!(outcome.breakdown.fitness, 0.7);
    }

    #[test]
    fn test_runs_start_from_fresh_state() {
        let evaluator = DefaultRunEvaluator::default();
        let trace = single_robot(vec![lit_step(0.0, false), lit_step(0.5, false)]);
        let first = evaluator.evaluate_run(&trace).unwrap();
        let second = evaluator.evaluate_run(&trace).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.state.lap_count(), 1.0);
    }

    #[test]
    fn test_evaluate_runs_averages_fitness() {
        let evaluator = DefaultRunEvaluator::default();
        let lit = single_robot(vec![lit_step(1.0, false)]);
        let mut dark_step = lit_step(1.0, false);
        dark_step.readings.remove(0);
        let dark = single_robot(vec![dark_step]);

        let summary = evaluator.evaluate_runs(&[lit, dark]).unwrap();
        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.outcomes[0].breakdown.fitness, 0.7);
        assert_eq!(summary.outcomes[1].breakdown.fitness, 0.0);
        assert_eq!(summary.mean_fitness, 0.35);
        assert_eq!(evaluator.evaluate_runs(&[]), Err(FitnessError::NoRuns));
    }

    #[test]
    fn test_evaluate_runs_stops_at_failing_run() {
        let evaluator = DefaultRunEvaluator::default();
        let lit = single_robot(vec![lit_step(1.0, false)]);
        let empty = single_robot(vec![]);
        assert_eq!(
            evaluator.evaluate_runs(&[lit, empty]),
            Err(FitnessError::NoSteps)
        );
    }

    #[test]
    fn test_trace_json_defaults_collided() {
        let json = r#"{
            "robots": [{
                "max_wheel_speed": 0.1,
                "steps": [{
                    "left": 0.1,
                    "right": -0.1,
                    "readings": [
                        {"kind": "ground", "values": [0.0]},
                        {"kind": "laser", "values": [3.0]}
                    ]
                }]
            }]
        }"#;
        let trace: RunTrace = serde_json::from_str(json).unwrap();
        let step = &trace.robots[0].steps[0];
        assert!(!step.collided);
        assert_eq!(step.readings[1].kind(), SensorKind::Unknown);

        let outcome = DefaultRunEvaluator::default().evaluate_run(&trace).unwrap();
        assert_eq!(outcome.state.lap_count(), 0.5);
    }
}
