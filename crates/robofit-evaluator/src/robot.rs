//! Boundary with the simulator: the tracked robot and the collision manager.

use log::{error, warn};
use robofit_sensor::SensorReading;

use crate::{FitnessError, accumulator::WheelSpeeds};

/// A simulated robot whose sensors and wheels can be sampled once per step.
pub trait TrackedRobot {
    /// Computed readings of every sensor mounted on the robot, in any order.
    fn sensor_readings(&self) -> &[SensorReading];

    /// Current wheel speeds together with the configured maximum.
    fn wheel_speeds(&self) -> WheelSpeeds;
}

/// Source of the total number of collisions observed so far in the simulation.
pub trait CollisionCounter {
    fn total_collisions(&self) -> u32;
}

impl CollisionCounter for u32 {
    fn total_collisions(&self) -> u32 {
        *self
    }
}

/// Picks the robot to evaluate from the simulator's robot list.
///
/// The fitness function tracks exactly one robot. An empty list is a misconfiguration that
/// the evaluation can not recover from. With more than one robot a warning is logged and the
/// first one is tracked.
pub fn select_tracked_robot<R>(robots: &[R]) -> Result<&R, FitnessError> {
    let Some(first) = robots.first() else {
        error!("no robot, so fitness can not be computed");
        return Err(FitnessError::NoRobot);
    };
    if robots.len() > 1 {
        warn!(
            "{} robots present but fitness tracks a single robot, using the first one",
            robots.len()
        );
    }
    Ok(first)
}
