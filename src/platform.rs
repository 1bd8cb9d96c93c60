//! Platform seam: sensor discovery, listener registration and display rotation
//!
//! The estimator never talks to hardware directly. A [`SensorPlatform`]
//! reports which sensors exist, subscribes the estimator to their streams and
//! answers screen-rotation queries. The platform delivers readings by calling
//! [`Estimator::on_sample`](crate::Estimator::on_sample), possibly from a
//! dedicated sensor thread.

use crate::types::{ScreenRotation, SensorDelay, SensorKind};

/// Host services required by the estimator
///
/// Implementations must tolerate repeated registration of the same sensor
/// (duplicates collapse into one subscription) and unregistration when
/// nothing is registered.
pub trait SensorPlatform: Send + Sync {
    /// Whether the device exposes a default sensor of this kind
    fn has_sensor(&self, kind: SensorKind) -> bool;

    /// Subscribe the estimator to a sensor stream
    fn register_listener(&self, kind: SensorKind, delay: SensorDelay);

    /// Revoke every subscription held by the estimator
    fn unregister_listeners(&self);

    /// Current display rotation; queried for every processed sample
    fn screen_rotation(&self) -> ScreenRotation;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    //! In-memory platform for tests and simulations

    use super::SensorPlatform;
    use crate::types::{ScreenRotation, SensorDelay, SensorKind};
    use std::collections::HashMap;
    use std::sync::{Mutex, PoisonError};

    /// Mock platform
    ///
    /// Tracks which sensors are present, which listeners are registered and
    /// the simulated display rotation.
    #[derive(Debug, Default)]
    pub struct MockPlatform {
        present: Vec<SensorKind>,
        registered: Mutex<HashMap<SensorKind, SensorDelay>>,
        registrations: Mutex<usize>,
        rotation: Mutex<ScreenRotation>,
    }

    impl MockPlatform {
        /// Platform exposing exactly the given sensors
        pub fn with_sensors(sensors: &[SensorKind]) -> Self {
            Self {
                present: sensors.to_vec(),
                ..Default::default()
            }
        }

        /// Platform exposing all three sensors
        pub fn full() -> Self {
            Self::with_sensors(&SensorKind::ALL)
        }

        /// Simulate the user rotating the display
        pub fn set_screen_rotation(&self, rotation: ScreenRotation) {
            *self.rotation.lock().unwrap_or_else(PoisonError::into_inner) = rotation;
        }

        /// Currently registered listeners and their requested delay
        pub fn registered(&self) -> HashMap<SensorKind, SensorDelay> {
            self.registered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn is_registered(&self, kind: SensorKind) -> bool {
            self.registered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&kind)
        }

        /// Total number of register calls, including duplicates
        pub fn registration_calls(&self) -> usize {
            *self.registrations.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl SensorPlatform for MockPlatform {
        fn has_sensor(&self, kind: SensorKind) -> bool {
            self.present.contains(&kind)
        }

        fn register_listener(&self, kind: SensorKind, delay: SensorDelay) {
            *self.registrations.lock().unwrap_or_else(PoisonError::into_inner) += 1;
            self.registered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(kind, delay);
        }

        fn unregister_listeners(&self) {
            self.registered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }

        fn screen_rotation(&self) -> ScreenRotation {
            *self.rotation.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

}
