use serde::{Deserialize, Serialize};

/// Kind of a sensor mounted on the robot.
///
/// The serialized form uses `snake_case` names. Names this crate does not recognize
/// deserialize to [`SensorKind::Unknown`], so traces recorded with newer sensor sets still
/// load and the extra readings are ignored during aggregation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    #[display("proximity")]
    Proximity,
    #[display("ground memory")]
    GroundMemory,
    #[display("ground")]
    Ground,
    #[display("ambient light")]
    AmbientLight,
    #[display("blue light")]
    BlueLight,
    #[display("red light")]
    RedLight,
    #[display("battery")]
    Battery,
    #[display("blue battery")]
    BlueBattery,
    #[display("red battery")]
    RedBattery,
    #[display("contact")]
    Contact,
    #[display("unknown")]
    #[serde(other)]
    Unknown,
}

impl SensorKind {
    /// Every kind the aggregator understands, in declaration order.
    pub const KNOWN: [Self; 10] = [
        Self::Proximity,
        Self::GroundMemory,
        Self::Ground,
        Self::AmbientLight,
        Self::BlueLight,
        Self::RedLight,
        Self::Battery,
        Self::BlueBattery,
        Self::RedBattery,
        Self::Contact,
    ];

    /// Returns `true` if the aggregator keeps only the maximum (plus recognized channels for
    /// light kinds) rather than the full channel vector.
    #[must_use]
    pub const fn is_max_kind(self) -> bool {
        matches!(
            self,
            Self::Proximity | Self::AmbientLight | Self::BlueLight | Self::RedLight | Self::Contact
        )
    }
}

/// One sensor's computed readings for the current step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    kind: SensorKind,
    values: Vec<f64>,
}

impl SensorReading {
    #[must_use]
    pub fn new(kind: SensorKind, values: Vec<f64>) -> Self {
        Self { kind, values }
    }

    #[must_use]
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Returns all channel values in channel order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the value of channel `index`, or `None` if the sensor has fewer channels.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}
