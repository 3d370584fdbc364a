//! Per-step aggregation of sensor readings.
//!
//! See the [crate-level documentation](crate) for the aggregation rules.

use serde::{Deserialize, Serialize};

use crate::{SensorKind, SensorReading};

/// Running maximum plus the recognized per-channel values of a light sensor.
///
/// Only channels 0 to [`LightChannels::CHANNELS`]` - 1` have a slot. Channels beyond that
/// range still take part in the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LightChannels {
    max: f64,
    channels: [f64; LightChannels::CHANNELS],
}

impl LightChannels {
    /// Number of recognized channels (the e-puck ring of eight sensors).
    pub const CHANNELS: usize = 8;

    /// Largest channel value observed this step, or 0.0 if none exceeded it.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Value of recognized channel `index`; 0.0 for an unreported or unrecognized channel.
    #[must_use]
    pub fn channel(&self, index: usize) -> f64 {
        self.channels.get(index).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn channels(&self) -> &[f64; Self::CHANNELS] {
        &self.channels
    }

    fn absorb(&mut self, values: &[f64]) {
        self.max = running_max(self.max, values);
        for (slot, value) in self.channels.iter_mut().zip(values) {
            *slot = *value;
        }
    }
}

/// Typed view of one step's sensor readings.
///
/// Created fresh each step by [`aggregate`]. Every accessor is total: a sensor that did not
/// report this step reads as 0.0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedFrame {
    proximity_max: f64,
    contact_max: f64,
    ambient_light: LightChannels,
    blue_light: LightChannels,
    red_light: LightChannels,
    ground: Vec<f64>,
    ground_memory: Vec<f64>,
    battery: Vec<f64>,
    blue_battery: Vec<f64>,
    red_battery: Vec<f64>,
}

/// Aggregates one step's sensor readings into an [`AggregatedFrame`].
///
/// Readings may arrive in any order. If a kind reports more than once, max kinds keep the
/// running maximum across all of its readings (per-channel light values come from the last
/// reading), and vector kinds keep the last vector seen.
#[must_use]
pub fn aggregate<'a, I>(readings: I) -> AggregatedFrame
where
    I: IntoIterator<Item = &'a SensorReading>,
{
    let mut frame = AggregatedFrame::default();
    for reading in readings {
        frame.absorb(reading);
    }
    frame
}

impl<'a> FromIterator<&'a SensorReading> for AggregatedFrame {
    fn from_iter<T: IntoIterator<Item = &'a SensorReading>>(iter: T) -> Self {
        aggregate(iter)
    }
}

impl AggregatedFrame {
    fn absorb(&mut self, reading: &SensorReading) {
        let values = reading.values();
        match reading.kind() {
            SensorKind::Proximity => self.proximity_max = running_max(self.proximity_max, values),
            SensorKind::Contact => self.contact_max = running_max(self.contact_max, values),
            SensorKind::AmbientLight => self.ambient_light.absorb(values),
            SensorKind::BlueLight => self.blue_light.absorb(values),
            SensorKind::RedLight => self.red_light.absorb(values),
            SensorKind::Ground => values.clone_into(&mut self.ground),
            SensorKind::GroundMemory => values.clone_into(&mut self.ground_memory),
            SensorKind::Battery => values.clone_into(&mut self.battery),
            SensorKind::BlueBattery => values.clone_into(&mut self.blue_battery),
            SensorKind::RedBattery => values.clone_into(&mut self.red_battery),
            SensorKind::Unknown => {}
        }
    }

    #[must_use]
    pub fn proximity_max(&self) -> f64 {
        self.proximity_max
    }

    /// Maximum contact channel. A binary contact sensor reports exactly 1.0 when touching.
    #[must_use]
    pub fn contact_max(&self) -> f64 {
        self.contact_max
    }

    #[must_use]
    pub fn ambient_light(&self) -> &LightChannels {
        &self.ambient_light
    }

    #[must_use]
    pub fn blue_light(&self) -> &LightChannels {
        &self.blue_light
    }

    #[must_use]
    pub fn red_light(&self) -> &LightChannels {
        &self.red_light
    }

    /// Full channel vector of a vector kind; empty if the kind did not report.
    ///
    /// Returns `None` for max kinds and [`SensorKind::Unknown`], which have no vector slot.
    #[must_use]
    pub fn vector(&self, kind: SensorKind) -> Option<&[f64]> {
        let values = match kind {
            SensorKind::Ground => &self.ground,
            SensorKind::GroundMemory => &self.ground_memory,
            SensorKind::Battery => &self.battery,
            SensorKind::BlueBattery => &self.blue_battery,
            SensorKind::RedBattery => &self.red_battery,
            SensorKind::Proximity
            | SensorKind::AmbientLight
            | SensorKind::BlueLight
            | SensorKind::RedLight
            | SensorKind::Contact
            | SensorKind::Unknown => return None,
        };
        Some(values)
    }

    /// Channel `index` of a vector kind, 0.0 when absent.
    #[must_use]
    pub fn vector_channel(&self, kind: SensorKind, index: usize) -> f64 {
        self.vector(kind)
            .and_then(|values| values.get(index).copied())
            .unwrap_or(0.0)
    }

    /// Ground color under the robot (ground channel 0).
    #[must_use]
    pub fn ground_color(&self) -> f64 {
        self.vector_channel(SensorKind::Ground, 0)
    }

    #[must_use]
    pub fn ground_memory(&self) -> f64 {
        self.vector_channel(SensorKind::GroundMemory, 0)
    }

    #[must_use]
    pub fn battery_level(&self) -> f64 {
        self.vector_channel(SensorKind::Battery, 0)
    }

    #[must_use]
    pub fn blue_battery_level(&self) -> f64 {
        self.vector_channel(SensorKind::BlueBattery, 0)
    }

    #[must_use]
    pub fn red_battery_level(&self) -> f64 {
        self.vector_channel(SensorKind::RedBattery, 0)
    }
}

fn running_max(current: f64, values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .fold(current, |max, v| if v > max { v } else { max })
}
