//! Step scoring and final fitness for the tracked robot.
//!
//! # Step Score
//!
//! Every simulated step is scored from the normalized wheel speeds and the aggregated sensor
//! frame:
//!
//! ```text
//! norm          = 0.5 + speed / (2 × max_speed)            (per wheel, ∈ [0, 1])
//! speed         = |norm_l - 0.5| + |norm_r - 0.5|
//! straightness  = 1 - sqrt(|norm_l - norm_r|)
//! orientation   = 0.7·light[2] + 0.1·light[3] + 0.2·light[1]
//! red           = 0.4·red[0] + 0.4·red[7]
//! battery       = red_battery[0] if low (< 0.3), else 1.0
//! step_score    = orientation × speed × straightness × (norm_l × norm_r) × battery
//! ```
//!
//! While the red battery is low, `red` is raised to at least 0.1. While it is adequate, a
//! `red` above 0.3 counts as a misorientation event before scoring, and again after scoring.
//!
//! # Lap Detection
//!
//! A two-phase detector watches ground channel 0. In the low phase a color of exactly 0.0
//! adds half a lap and switches to the high phase; in the high phase a color of exactly 0.5
//! adds half a lap and switches back. The comparison is exact because the ground sensor is
//! discretized; a color drifting by one ulp is never counted.
//!
//! # Final Fitness
//!
//! ```text
//! fitness = mean(step_score)
//!         × (1 - min(collisions, 10) / 10)
//!         × (1 - min(misoriented, 30) / 30)
//!         × (max(laps, 4) / 4)
//! ```
//!
//! clamped below at 0.0. `collisions` is the collision manager's total, supplied by the host.

use std::fmt;

use log::trace;
use robofit_sensor::{AggregatedFrame, aggregate};
use serde::{Deserialize, Serialize};

use crate::{
    FitnessError,
    params::{FitnessParams, weighted_sum},
    robot::{CollisionCounter, TrackedRobot},
};

/// Wheel speeds of a differential-drive robot, in simulator units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
    /// Configured maximum wheel speed of the robot.
    pub max: f64,
}

impl WheelSpeeds {
    #[must_use]
    pub const fn new(left: f64, right: f64, max: f64) -> Self {
        Self { left, right, max }
    }

    /// Maps both wheel speeds from `[-max, max]` onto `[0, 1]`, with standstill at 0.5.
    pub fn normalized(&self) -> Result<(f64, f64), FitnessError> {
        if !(self.max.is_finite() && self.max > 0.0) {
            return Err(FitnessError::InvalidMaxWheelSpeed(self.max));
        }
        let normalize = |speed: f64| 0.5 + speed / (2.0 * self.max);
        Ok((normalize(self.left), normalize(self.right)))
    }
}

/// Phase of the lap detector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LapPhase {
    /// Waiting for the enter color.
    #[default]
    Low,
    /// Waiting for the exit color.
    High,
}

/// Running counters of one evaluation.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerState {
    step_count: u64,
    accumulated_score: f64,
    collision_count: u64,
    lap_count: f64,
    misoriented_to_red_count: f64,
    lap_phase: LapPhase,
}

impl ScorerState {
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Sum of all step scores so far.
    #[must_use]
    pub fn accumulated_score(&self) -> f64 {
        self.accumulated_score
    }

    /// Steps whose contact maximum registered a collision.
    ///
    /// Tracked for reporting only; the final fitness uses the collision manager's total.
    #[must_use]
    pub fn collision_count(&self) -> u64 {
        self.collision_count
    }

    /// Completed laps, in multiples of half a lap.
    #[must_use]
    pub fn lap_count(&self) -> f64 {
        self.lap_count
    }

    #[must_use]
    pub fn misoriented_to_red_count(&self) -> f64 {
        self.misoriented_to_red_count
    }

    #[must_use]
    pub fn lap_phase(&self) -> LapPhase {
        self.lap_phase
    }

    /// `true` while the lap detector waits for the exit color.
    #[must_use]
    pub fn ground_color_flag(&self) -> bool {
        self.lap_phase == LapPhase::High
    }
}

/// Every factor computed while scoring one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepEvaluation {
    pub normalized_left: f64,
    pub normalized_right: f64,
    pub speed_magnitude: f64,
    pub straightness: f64,
    pub orientation_score: f64,
    /// Red orientation after battery gating.
    pub red_orientation: f64,
    /// Battery factor applied to the step score (1.0 unless the red battery is low).
    pub battery_factor: f64,
    pub step_score: f64,
    /// Misorientation events counted during this step (0, 1 or 2).
    pub misorientation_events: u8,
    pub collided: bool,
    pub half_lap: bool,
}

/// Final fitness together with the factors it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    pub mean_step_score: f64,
    pub collision_factor: f64,
    pub misorientation_factor: f64,
    pub lap_factor: f64,
    /// Product of all factors, clamped to be non-negative.
    pub fitness: f64,
}

impl fmt::Display for FitnessBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4} (mean step {:.4} × collisions {:.3} × misorientation {:.3} × laps {:.3})",
            self.fitness,
            self.mean_step_score,
            self.collision_factor,
            self.misorientation_factor,
            self.lap_factor
        )
    }
}

/// Stateful scorer for the single tracked robot.
///
/// Call [`step`](Self::step) (or [`observe`](Self::observe)) once per simulated step, then
/// query [`final_fitness`](Self::final_fitness) as often as needed. Start a new accumulator
/// for every evaluation.
#[derive(Debug, Default, Clone)]
pub struct FitnessAccumulator {
    params: FitnessParams,
    state: ScorerState,
}

impl FitnessAccumulator {
    #[must_use]
    pub fn new(params: FitnessParams) -> Self {
        Self {
            params,
            state: ScorerState::default(),
        }
    }

    #[must_use]
    pub fn params(&self) -> &FitnessParams {
        &self.params
    }

    #[must_use]
    pub fn state(&self) -> &ScorerState {
        &self.state
    }

    /// Aggregates the robot's current sensors and scores one step.
    pub fn observe<R>(&mut self, robot: &R) -> Result<StepEvaluation, FitnessError>
    where
        R: TrackedRobot + ?Sized,
    {
        let frame = aggregate(robot.sensor_readings());
        self.step(&frame, robot.wheel_speeds())
    }

    /// Scores one simulated step and updates the counters.
    ///
    /// Fails without touching the counters if the maximum wheel speed is not positive.
    #[expect(clippy::float_cmp)]
    pub fn step(
        &mut self,
        frame: &AggregatedFrame,
        wheels: WheelSpeeds,
    ) -> Result<StepEvaluation, FitnessError> {
        let params = &self.params;
        let state = &mut self.state;

        let (left, right) = wheels.normalized()?;
        let speed_magnitude = (left - 0.5).abs() + (right - 0.5).abs();
        let straightness = 1.0 - (left - right).abs().sqrt();

        let light = frame.ambient_light();
        let orientation_score = weighted_sum(&params.orientation_weights, |i| light.channel(i));
        let red_light = frame.red_light();
        let mut red_orientation =
            weighted_sum(&params.red_orientation_weights, |i| red_light.channel(i));

        let mut misorientation_events = 0;
        let mut battery_factor = frame.red_battery_level();
        if battery_factor < params.low_battery_threshold {
            red_orientation = red_orientation.max(params.red_orientation_floor);
        } else {
            if red_orientation > params.misorientation_threshold {
                misorientation_events += 1;
            }
            battery_factor = 1.0;
        }

        let step_score =
            orientation_score * speed_magnitude * straightness * (left * right) * battery_factor;

        state.step_count += 1;
        state.accumulated_score += step_score;

        // counted again regardless of battery; the caps were tuned against this
        if red_orientation > params.misorientation_threshold {
            misorientation_events += 1;
        }
        state.misoriented_to_red_count += f64::from(misorientation_events);

        let collided = frame.contact_max() == params.contact_value;
        if collided {
            state.collision_count += 1;
        }

        let color = frame.ground_color();
        let half_lap = match state.lap_phase {
            LapPhase::High if color == params.lap_exit_color => {
                state.lap_phase = LapPhase::Low;
                true
            }
            LapPhase::Low if color == params.lap_enter_color => {
                state.lap_phase = LapPhase::High;
                true
            }
            LapPhase::High | LapPhase::Low => false,
        };
        if half_lap {
            state.lap_count += params.half_lap;
        }

        trace!(
            "step {}: score={step_score:.5} red={red_orientation:.3} color={color} laps={}",
            state.step_count, state.lap_count
        );

        Ok(StepEvaluation {
            normalized_left: left,
            normalized_right: right,
            speed_magnitude,
            straightness,
            orientation_score,
            red_orientation,
            battery_factor,
            step_score,
            misorientation_events,
            collided,
            half_lap,
        })
    }

    /// Computes the final fitness from the counters and the collision manager's total.
    ///
    /// Does not modify the accumulator. Fails with [`FitnessError::NoSteps`] if no step was
    /// scored, and with [`FitnessError::InvalidParam`] if a cap or the lap target is not
    /// positive.
    pub fn final_fitness(&self, external_collisions: u32) -> Result<f64, FitnessError> {
        self.final_fitness_breakdown(external_collisions)
            .map(|breakdown| breakdown.fitness)
    }

    /// Like [`final_fitness`](Self::final_fitness), reading the total from a collision counter.
    pub fn final_fitness_with<C>(&self, collisions: &C) -> Result<f64, FitnessError>
    where
        C: CollisionCounter + ?Sized,
    {
        self.final_fitness(collisions.total_collisions())
    }

    #[expect(clippy::cast_precision_loss)]
    pub fn final_fitness_breakdown(
        &self,
        external_collisions: u32,
    ) -> Result<FitnessBreakdown, FitnessError> {
        let params = &self.params;
        let state = &self.state;
        if state.step_count == 0 {
            return Err(FitnessError::NoSteps);
        }
        params.validate()?;

        let mean_step_score = state.accumulated_score / state.step_count as f64;
        let collision_factor = 1.0
            - f64::from(external_collisions).min(params.collision_cap) / params.collision_cap;
        let misorientation_factor = 1.0
            - state
                .misoriented_to_red_count
                .min(params.misorientation_cap)
                / params.misorientation_cap;
        let lap_factor = state.lap_count.max(params.lap_target) / params.lap_target;

        let raw = mean_step_score * collision_factor * misorientation_factor * lap_factor;
        let fitness = if raw.is_nan() || raw < 0.0 { 0.0 } else { raw };

        Ok(FitnessBreakdown {
            mean_step_score,
            collision_factor,
            misorientation_factor,
            lap_factor,
            fitness,
        })
    }
}
