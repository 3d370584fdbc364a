//! Sensor readings and per-step aggregation for differential-drive robots.
//!
//! A simulated robot reports a heterogeneous list of sensor readings every step. Each
//! reading is tagged with a [`SensorKind`] and carries an ordered sequence of channel
//! values. The fitness evaluator does not consume those readings directly: it consumes an
//! [`AggregatedFrame`], a typed view extracted from one step's readings by [`aggregate`].
//!
//! # Aggregation Rules
//!
//! Sensor kinds fall into two groups:
//!
//! - **Max kinds** - proximity, ambient light, blue light, red light and contact. The frame
//!   keeps the maximum channel value observed during the step. For the three light kinds it
//!   also keeps the value of every recognized channel (indices 0-7), because the scoring
//!   formula weights specific channels.
//! - **Vector kinds** - ground, ground memory, battery, blue battery and red battery. The frame
//!   keeps the full channel vector because channel identity matters downstream.
//!
//! A kind missing from the step leaves its slot at the default (0.0, or an empty vector whose
//! channels read as 0.0). Readings of [`SensorKind::Unknown`] are skipped.
//!
//! # Example
//!
//! ```
//! use robofit_sensor::{SensorKind, SensorReading, aggregate};
//!
//! let readings = [
//!     SensorReading::new(SensorKind::Proximity, vec![0.1, 0.4, 0.2]),
//!     SensorReading::new(SensorKind::Ground, vec![0.5]),
//! ];
//! let frame = aggregate(&readings);
//!
//! assert_eq!(frame.proximity_max(), 0.4);
//! assert_eq!(frame.ground_color(), 0.5);
//! assert_eq!(frame.red_battery_level(), 0.0); // absent sensor
//! ```

pub use self::{
    frame::{AggregatedFrame, LightChannels, aggregate},
    reading::{SensorKind, SensorReading},
};

pub mod frame;
pub mod reading;
