//! Compass Heading - orientation estimation for handheld compass displays
//!
//! This library turns raw orientation sensor streams into a stable compass
//! heading. It prefers the platform's fused rotation-vector sensor and falls
//! back to combining magnetometer and accelerometer readings when no rotation
//! vector is available. Readings are smoothed with an exponential low-pass
//! filter, corrected for the current screen rotation and delivered to a single
//! listener only when they move beyond a configurable sensitivity.
//!
//! # Features
//!
//! - Rotation-vector fusion with one-way latch (never falls back once working)
//! - Magnetometer + accelerometer fusion with free-fall and weak-field rejection
//! - Per-sensor exponential smoothing
//! - Screen-rotation correction for 0°, 90°, 180° and 270° displays
//! - Per-axis change thresholds (azimuth, pitch, roll)
//! - Thread-safe sample processing behind a single lock
//!
//! # Quick Start
//!
//! ```rust
//! use compass_heading::{
//!     Estimator, EstimatorSettings, ScreenRotation, SensorDelay, SensorKind, SensorPlatform,
//!     SensorSample, Sensitivity,
//! };
//!
//! struct Phone;
//!
//! impl SensorPlatform for Phone {
//!     fn has_sensor(&self, kind: SensorKind) -> bool {
//!         kind == SensorKind::RotationVector
//!     }
//!     fn register_listener(&self, _kind: SensorKind, _delay: SensorDelay) {}
//!     fn unregister_listeners(&self) {}
//!     fn screen_rotation(&self) -> ScreenRotation {
//!         ScreenRotation::Deg0
//!     }
//! }
//!
//! let (compass, headings) = Estimator::with_channel(Phone, EstimatorSettings::default())
//!     .expect("device has a rotation vector sensor");
//! compass.start(Sensitivity::new(1.0, 360.0, 360.0));
//!
//! // Called by the platform's sensor dispatch
//! compass.on_sample(&SensorSample::new(SensorKind::RotationVector, 0, &[0.0, 0.0, 0.0, 1.0]));
//!
//! let estimate = headings.recv().unwrap();
//! println!("Heading: {:.0}°", estimate.azimuth);
//!
//! compass.stop();
//! ```

pub mod cardinal;
mod error;
mod estimator;
mod math;
pub mod platform;
pub mod rotation;
pub mod screen;
pub mod smoothing;
mod types;

// Re-export all public types and functions
pub use cardinal::CardinalDirection;
pub use error::EstimatorError;
pub use estimator::{AvailableSensors, Estimator, Listener};
pub use math::{DEG_TO_RAD, RAD_TO_DEG, Vector3Ext, normalize_azimuth, reflect_flipped, round_degrees};
pub use platform::SensorPlatform;
pub use screen::{correct, correct_degrees};
pub use types::*;
