//! Tunable constants of the fitness function.
//!
//! [`FitnessParams::default()`] reproduces the tuned values. Hosts may load overrides from
//! JSON; any field left out keeps its default.

use serde::{Deserialize, Serialize};

use crate::FitnessError;

/// Weight applied to one light channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelWeight {
    pub channel: usize,
    pub weight: f64,
}

impl ChannelWeight {
    #[must_use]
    pub const fn new(channel: usize, weight: f64) -> Self {
        Self { channel, weight }
    }
}

/// Sums `weight × value(channel)` in list order.
///
/// List order is summation order, so reordering the weights can change the last bits of the
/// result.
pub(crate) fn weighted_sum<F>(weights: &[ChannelWeight], value: F) -> f64
where
    F: Fn(usize) -> f64,
{
    weights
        .iter()
        .map(|w| w.weight * value(w.channel))
        .fold(0.0, |sum, term| sum + term)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessParams {
    /// Ambient-light channels rewarded as "oriented toward the light".
    pub orientation_weights: Vec<ChannelWeight>,
    /// Red-light channels forming the red orientation signal.
    pub red_orientation_weights: Vec<ChannelWeight>,
    /// Red battery level below which the battery counts as low.
    pub low_battery_threshold: f64,
    /// Red orientation raised to at least this value while the battery is low.
    pub red_orientation_floor: f64,
    /// Red orientation above which a step counts as misoriented.
    pub misorientation_threshold: f64,
    /// Contact maximum that registers a collision (binary contact signal).
    pub contact_value: f64,
    /// Ground color that completes a half lap while the lap flag is low.
    pub lap_enter_color: f64,
    /// Ground color that completes a half lap while the lap flag is high.
    pub lap_exit_color: f64,
    /// Lap count added per detected color transition.
    pub half_lap: f64,
    /// Collisions at which the collision factor reaches zero.
    pub collision_cap: f64,
    /// Misorientation events at which the misorientation factor reaches zero.
    pub misorientation_cap: f64,
    /// Lap count below which the lap factor stays at 1.
    pub lap_target: f64,
}

impl Default for FitnessParams {
    fn default() -> Self {
        Self {
            orientation_weights: vec![
                ChannelWeight::new(2, 0.7),
                ChannelWeight::new(3, 0.1),
                ChannelWeight::new(1, 0.2),
            ],
            red_orientation_weights: vec![ChannelWeight::new(0, 0.4), ChannelWeight::new(7, 0.4)],
            low_battery_threshold: 0.3,
            red_orientation_floor: 0.1,
            misorientation_threshold: 0.3,
            contact_value: 1.0,
            lap_enter_color: 0.0,
            lap_exit_color: 0.5,
            half_lap: 0.5,
            collision_cap: 10.0,
            misorientation_cap: 30.0,
            lap_target: 4.0,
        }
    }
}

impl FitnessParams {
    /// Checks that the caps and the lap target can be divided by.
    ///
    /// A zero cap would turn its factor into `0 / 0`, and a zero lap target makes the lap
    /// factor infinite.
    ///
    /// # Errors
    ///
    /// Returns [`FitnessError::InvalidParam`] naming the first cap or target that is not
    /// positive and finite.
    pub fn validate(&self) -> Result<(), FitnessError> {
        let divisors = [
            ("collision_cap", self.collision_cap),
            ("misorientation_cap", self.misorientation_cap),
            ("lap_target", self.lap_target),
        ];
        for (name, value) in divisors {
            if !(value.is_finite() && value > 0.0) {
                return Err(FitnessError::InvalidParam { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let params: FitnessParams =
            serde_json::from_str(r#"{"collision_cap": 5.0, "lap_target": 2.0}"#).unwrap();
        assert_eq!(params.collision_cap, 5.0);
        assert_eq!(params.lap_target, 2.0);
        assert_eq!(params.misorientation_cap, 30.0);
        assert_eq!(
            params.orientation_weights,
            FitnessParams::default().orientation_weights
        );
    }

    #[test]
    fn test_empty_json_is_default() {
        let params: FitnessParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, FitnessParams::default());
    }

    #[test]
    fn test_weighted_sum_follows_list_order() {
        let light = [0.0, 0.3, 0.9, 0.6, 0.0, 0.0, 0.0, 0.0];
        let params = FitnessParams::default();
        let sum = weighted_sum(&params.orientation_weights, |i| light[i]);
        assert_eq!(sum, 0.7 * 0.9 + 0.1 * 0.6 + 0.2 * 0.3);
    }

    #[test]
    fn test_weighted_sum_of_empty_list_is_zero() {
        assert_eq!(weighted_sum(&[], |_| 1.0), 0.0);
    }

    #[test]
    fn test_default_params_are_valid() {
        assert_eq!(FitnessParams::default().validate(), Ok(()));
    }

    #[test]
    fn test_non_positive_divisors_are_rejected() {
        let params: FitnessParams = serde_json::from_str(r#"{"collision_cap": 0.0}"#).unwrap();
        assert_eq!(
            params.validate(),
            Err(FitnessError::InvalidParam {
                name: "collision_cap",
                value: 0.0
            })
        );

        let params = FitnessParams {
            misorientation_cap: -30.0,
            ..FitnessParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(FitnessError::InvalidParam {
                name: "misorientation_cap",
                ..
            })
        ));

        let params = FitnessParams {
            lap_target: 0.0,
            ..FitnessParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(FitnessError::InvalidParam {
                name: "lap_target",
                ..
            })
        ));
    }
}
