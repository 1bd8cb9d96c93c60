//! Orientation estimator: sensor fusion, smoothing and change notification
//!
//! The estimator is purely reactive. The platform calls [`Estimator::on_sample`]
//! for every reading; the estimator smooths it, derives a rotation matrix,
//! extracts azimuth/pitch/roll, corrects for the current screen rotation and
//! notifies its single listener when the change exceeds the configured
//! [`Sensitivity`].
//!
//! # Example
//! ```
//! # #[cfg(feature = "mock")]
//! # {
//! use compass_heading::platform::mock::MockPlatform;
//! use compass_heading::{Estimator, EstimatorSettings, SensorKind, SensorSample};
//!
//! let platform = MockPlatform::full();
//! let (estimator, headings) = Estimator::with_channel(platform, EstimatorSettings::default()).unwrap();
//! estimator.start_default();
//!
//! estimator.on_sample(&SensorSample::new(SensorKind::RotationVector, 0, &[0.0, 0.0, 0.0, 1.0]));
//! let estimate = headings.try_recv().unwrap();
//! assert_eq!(estimate.azimuth, 0.0);
//! # }
//! ```

use crate::error::EstimatorError;
use crate::math::RAD_TO_DEG;
use crate::platform::SensorPlatform;
use crate::rotation::{
    inclination_angle, orientation, rotation_matrix_from_gravity, rotation_matrix_from_vector,
};
use crate::screen::correct;
use crate::smoothing::SmoothedVector;
use crate::types::{
    EstimatorSettings, FusionMode, OrientationEstimate, RawOrientation, SensorKind, SensorSample,
    Sensitivity,
};
use log::{debug, info, trace};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Callback receiving every emitted estimate
pub type Listener = Box<dyn FnMut(OrientationEstimate) + Send>;

/// Sensors found on the device when the estimator was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AvailableSensors {
    pub rotation_vector: bool,
    pub magnetometer: bool,
    pub accelerometer: bool,
}

impl AvailableSensors {
    /// Query the platform for each sensor kind
    pub fn probe<P: SensorPlatform>(platform: &P) -> Self {
        Self {
            rotation_vector: platform.has_sensor(SensorKind::RotationVector),
            magnetometer: platform.has_sensor(SensorKind::Magnetometer),
            accelerometer: platform.has_sensor(SensorKind::Accelerometer),
        }
    }

    pub fn contains(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::RotationVector => self.rotation_vector,
            SensorKind::Magnetometer => self.magnetometer,
            SensorKind::Accelerometer => self.accelerometer,
        }
    }

    /// Rotation vector alone, or magnetometer together with accelerometer
    pub fn is_usable(&self) -> bool {
        self.rotation_vector || (self.magnetometer && self.accelerometer)
    }
}

/// Mutable fusion state, guarded by the estimator's lock
struct FusionState {
    mode: FusionMode,
    rotation_vector: SmoothedVector<5>,
    geomagnetic: SmoothedVector<3>,
    gravity: SmoothedVector<3>,
    sensitivity: Sensitivity,
    last: OrientationEstimate,
    emissions: u64,
    inclination: Option<f32>,
}

impl FusionState {
    fn new(settings: &EstimatorSettings) -> Self {
        Self {
            mode: FusionMode::Undetermined,
            rotation_vector: SmoothedVector::new(settings.smoothing.rotation_vector),
            geomagnetic: SmoothedVector::new(settings.smoothing.geomagnetic),
            gravity: SmoothedVector::new(settings.smoothing.gravity),
            sensitivity: Sensitivity::ANY_CHANGE,
            last: OrientationEstimate::default(),
            emissions: 0,
            inclination: None,
        }
    }

    /// Fold a sample into the smoothed vectors and derive a raw orientation
    ///
    /// Returns `None` when the sample does not produce an orientation: the
    /// other half of the magnetometer/accelerometer pair is still missing,
    /// the fused vectors are degenerate, or the rotation vector is latched.
    fn fuse(&mut self, sample: &SensorSample) -> Option<RawOrientation> {
        match sample.kind {
            SensorKind::RotationVector => {
                if self.mode != FusionMode::RotationVector {
                    debug!("Using rotation vector sensor");
                    self.mode = FusionMode::RotationVector;
                }
                let smoothed = self.rotation_vector.update(&complete_rotation_vector(sample.values()));
                let rotation = rotation_matrix_from_vector(&smoothed)?;
                Some(orientation(&rotation))
            }
            SensorKind::Magnetometer | SensorKind::Accelerometer
                if self.mode != FusionMode::RotationVector =>
            {
                let values = vector3(sample.values())?;
                if sample.kind == SensorKind::Magnetometer {
                    self.geomagnetic.update(&values);
                } else {
                    self.gravity.update(&values);
                }

                let (Some(gravity), Some(geomagnetic)) = (self.gravity.value(), self.geomagnetic.value())
                else {
                    return None;
                };
                let solution = rotation_matrix_from_gravity(gravity, geomagnetic)?;

                if self.mode == FusionMode::Undetermined {
                    debug!("Using magnetometer and accelerometer");
                    self.mode = FusionMode::MagnetAccel;
                }
                self.inclination = Some(inclination_angle(&solution.inclination) * RAD_TO_DEG);
                Some(orientation(&solution.rotation))
            }
            _ => None,
        }
    }

    fn should_emit(&self, estimate: &OrientationEstimate) -> bool {
        // A last azimuth of exactly 0° reads as "nothing emitted yet", which
        // also lets a genuine 0° heading through on every sample
        (estimate.azimuth - self.last.azimuth).abs() >= self.sensitivity.azimuth
            || (estimate.pitch - self.last.pitch).abs() >= self.sensitivity.pitch
            || (estimate.roll - self.last.roll).abs() >= self.sensitivity.roll
            || self.last.azimuth == 0.0
    }
}

/// Pad a rotation-vector reading to five components, deriving w when absent
fn complete_rotation_vector(values: &[f32]) -> [f32; 5] {
    let mut vector = [0.0; 5];
    let len = values.len().min(5);
    vector[..len].copy_from_slice(&values[..len]);

    if len < 4 {
        let [x, y, z, ..] = vector;
        let w_squared = 1.0 - x * x - y * y - z * z;
        vector[3] = if w_squared > 0.0 { w_squared.sqrt() } else { 0.0 };
    }
    vector
}

fn vector3(values: &[f32]) -> Option<[f32; 3]> {
    match values {
        [x, y, z, ..] => Some([*x, *y, *z]),
        _ => None,
    }
}

/// Compass orientation estimator
///
/// Created once per screen session with [`Estimator::create`]. Between
/// [`start`](Estimator::start) and [`stop`](Estimator::stop) the platform
/// feeds readings into [`on_sample`](Estimator::on_sample), which may be
/// called concurrently from several threads.
pub struct Estimator<P: SensorPlatform> {
    platform: P,
    settings: EstimatorSettings,
    available: AvailableSensors,
    state: Mutex<FusionState>,
    listener: Mutex<Listener>,
}

impl<P: SensorPlatform> Estimator<P> {
    /// Create an estimator if the device has a usable sensor combination
    ///
    /// Fails with [`EstimatorError::Unavailable`] unless a rotation-vector
    /// sensor, or both a magnetometer and an accelerometer, are present.
    pub fn create<F>(platform: P, settings: EstimatorSettings, listener: F) -> Result<Self, EstimatorError>
    where
        F: FnMut(OrientationEstimate) + Send + 'static,
    {
        let available = AvailableSensors::probe(&platform);
        if available.rotation_vector {
            debug!("Rotation vector sensor found");
        } else if available.magnetometer && available.accelerometer {
            debug!("Magnetometer and accelerometer found");
        } else {
            debug!("Device does not have the required sensors");
            return Err(EstimatorError::Unavailable);
        }

        Ok(Self {
            state: Mutex::new(FusionState::new(&settings)),
            listener: Mutex::new(Box::new(listener)),
            platform,
            settings,
            available,
        })
    }

    /// Create an estimator whose emissions are sent over a channel
    pub fn with_channel(
        platform: P,
        settings: EstimatorSettings,
    ) -> Result<(Self, Receiver<OrientationEstimate>), EstimatorError> {
        let (sender, receiver) = mpsc::channel();
        let estimator = Self::create(platform, settings, move |estimate| {
            // The consumer may have gone away; emissions are fire-and-forget
            let _ = sender.send(estimate);
        })?;
        Ok((estimator, receiver))
    }

    /// Register listeners for every present sensor and set thresholds
    ///
    /// Calling this again while running re-registers (the platform
    /// de-duplicates) and replaces the thresholds.
    pub fn start(&self, sensitivity: Sensitivity) {
        self.lock_state().sensitivity = sensitivity;

        for kind in SensorKind::ALL {
            if self.available.contains(kind) {
                self.platform.register_listener(kind, self.settings.sensor_delay);
            }
        }
        info!(
            "Compass started (azimuth {}°, pitch {}°, roll {}°)",
            sensitivity.azimuth, sensitivity.pitch, sensitivity.roll
        );
    }

    /// Start with [`EstimatorSettings::default_sensitivity`]
    pub fn start_default(&self) {
        self.start(self.settings.default_sensitivity);
    }

    /// Unregister all listeners and zero the thresholds
    ///
    /// Safe to call when never started.
    pub fn stop(&self) {
        self.lock_state().sensitivity = Sensitivity::ANY_CHANGE;
        self.platform.unregister_listeners();
        info!("Compass stopped");
    }

    /// Process one sensor reading
    ///
    /// Never fails: malformed samples, magnetometer/accelerometer samples
    /// arriving after the rotation vector took over, and readings that
    /// cannot yet be fused are dropped silently, as are readings whose
    /// orientation overflows to a non-finite value.
    ///
    /// The listener is invoked after the fusion lock has been released, so
    /// it may call back into [`start`](Estimator::start) or
    /// [`stop`](Estimator::stop) from any thread. Estimates computed
    /// concurrently on different sensor threads may reach the listener in
    /// either order.
    pub fn on_sample(&self, sample: &SensorSample) {
        if !sample.is_well_formed() {
            trace!("Discarding malformed {:?} sample", sample.kind);
            return;
        }

        let mut state = self.lock_state();
        let Some(raw) = state.fuse(sample) else {
            trace!("No orientation from {:?} sample", sample.kind);
            return;
        };

        let estimate = correct(raw, self.platform.screen_rotation());
        if !estimate.is_finite() {
            trace!("Discarding non-finite orientation from {:?} sample", sample.kind);
            return;
        }
        if !state.should_emit(&estimate) {
            return;
        }
        state.last = estimate;
        state.emissions += 1;

        // Never hold both locks: the listener may re-enter through start/stop
        // while another sensor thread is waiting on the state
        drop(state);
        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        (*listener)(estimate);
    }

    /// Replace the downstream consumer
    ///
    /// Must not be called from inside the listener itself.
    pub fn set_listener<F>(&self, listener: F)
    where
        F: FnMut(OrientationEstimate) + Send + 'static,
    {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Box::new(listener);
    }

    /// Sensor source currently in use
    pub fn fusion_mode(&self) -> FusionMode {
        self.lock_state().mode
    }

    /// Thresholds currently applied
    pub fn sensitivity(&self) -> Sensitivity {
        self.lock_state().sensitivity
    }

    /// Most recently emitted estimate, `None` before the first emission
    pub fn last_emitted(&self) -> Option<OrientationEstimate> {
        let state = self.lock_state();
        (state.emissions > 0).then_some(state.last)
    }

    /// Number of estimates delivered to the listener so far
    pub fn emission_count(&self) -> u64 {
        self.lock_state().emissions
    }

    /// Magnetic dip angle in degrees from the last magnetometer/accelerometer fusion
    pub fn magnetic_inclination(&self) -> Option<f32> {
        self.lock_state().inclination
    }

    pub fn available_sensors(&self) -> AvailableSensors {
        self.available
    }

    pub fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn lock_state(&self) -> MutexGuard<'_, FusionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockPlatform;
    use crate::types::{ScreenRotation, SensorDelay, SmoothingFactors};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    const EPSILON: f32 = 1e-3;

    fn unsmoothed() -> EstimatorSettings {
        EstimatorSettings {
            smoothing: SmoothingFactors::NONE,
            ..Default::default()
        }
    }

    /// Rotation vector of a device lying flat, top edge towards `azimuth_deg`
    fn heading_sample(azimuth_deg: f32) -> SensorSample {
        let half = -azimuth_deg.to_radians() / 2.0;
        SensorSample::new(
            SensorKind::RotationVector,
            0,
            &[0.0, 0.0, half.sin(), half.cos(), 0.0],
        )
    }

    fn recording(
        platform: MockPlatform,
        settings: EstimatorSettings,
    ) -> (Estimator<MockPlatform>, Arc<Mutex<Vec<OrientationEstimate>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let estimator = Estimator::create(platform, settings, move |estimate| {
            sink.lock().unwrap().push(estimate);
        })
        .unwrap();
        (estimator, received)
    }

    #[test]
    fn test_create_requires_usable_sensors() {
        let none = MockPlatform::with_sensors(&[]);
        assert_eq!(
            Estimator::with_channel(none, EstimatorSettings::default()).err(),
            Some(EstimatorError::Unavailable)
        );

        let magnetometer_only = MockPlatform::with_sensors(&[SensorKind::Magnetometer]);
        assert!(Estimator::with_channel(magnetometer_only, EstimatorSettings::default()).is_err());

        let accelerometer_only = MockPlatform::with_sensors(&[SensorKind::Accelerometer]);
        assert!(Estimator::with_channel(accelerometer_only, EstimatorSettings::default()).is_err());

        let rotation_only = MockPlatform::with_sensors(&[SensorKind::RotationVector]);
        assert!(Estimator::with_channel(rotation_only, EstimatorSettings::default()).is_ok());

        let pair = MockPlatform::with_sensors(&[SensorKind::Magnetometer, SensorKind::Accelerometer]);
        assert!(Estimator::with_channel(pair, EstimatorSettings::default()).is_ok());
    }

    #[test]
    fn test_available_sensors_probe() {
        let platform = MockPlatform::with_sensors(&[SensorKind::Magnetometer, SensorKind::Accelerometer]);
        let available = AvailableSensors::probe(&platform);
        assert!(!available.contains(SensorKind::RotationVector));
        assert!(available.is_usable());

        let magnetometer_only = AvailableSensors {
            magnetometer: true,
            ..Default::default()
        };
        assert!(!magnetometer_only.is_usable());
    }

    #[test]
    fn test_start_registers_every_present_sensor() {
        let settings = EstimatorSettings {
            sensor_delay: SensorDelay::Game,
            ..Default::default()
        };
        let (estimator, _rx) = Estimator::with_channel(MockPlatform::full(), settings).unwrap();
        estimator.start(Sensitivity::new(1.0, 2.0, 3.0));

        let registered = estimator.platform().registered();
        assert_eq!(registered.len(), 3);
        assert!(registered.values().all(|delay| *delay == SensorDelay::Game));
        assert_eq!(estimator.settings().sensor_delay, SensorDelay::Game);
        assert_eq!(estimator.settings().sensor_delay.period_us(), 20_000);
        assert_eq!(estimator.sensitivity(), Sensitivity::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_start_skips_missing_sensors() {
        let platform = MockPlatform::with_sensors(&[SensorKind::RotationVector]);
        let (estimator, _rx) = Estimator::with_channel(platform, EstimatorSettings::default()).unwrap();
        estimator.start_default();

        assert!(estimator.platform().is_registered(SensorKind::RotationVector));
        assert!(!estimator.platform().is_registered(SensorKind::Magnetometer));
        assert!(!estimator.platform().is_registered(SensorKind::Accelerometer));
    }

    #[test]
    fn test_start_twice_updates_thresholds() {
        let (estimator, _rx) = Estimator::with_channel(MockPlatform::full(), EstimatorSettings::default()).unwrap();
        estimator.start(Sensitivity::new(1.0, 1.0, 1.0));
        estimator.start(Sensitivity::new(5.0, 6.0, 7.0));

        assert_eq!(estimator.sensitivity(), Sensitivity::new(5.0, 6.0, 7.0));
        assert_eq!(estimator.platform().registered().len(), 3);
        assert_eq!(estimator.platform().registration_calls(), 6);
    }

    #[test]
    fn test_start_default_uses_configured_sensitivity() {
        let settings = EstimatorSettings {
            default_sensitivity: Sensitivity::new(1.0, 360.0, 360.0),
            ..Default::default()
        };
        let (estimator, _rx) = Estimator::with_channel(MockPlatform::full(), settings).unwrap();
        estimator.start_default();
        assert_eq!(estimator.sensitivity(), Sensitivity::new(1.0, 360.0, 360.0));
    }

    #[test]
    fn test_stop_unregisters_and_zeroes_thresholds() {
        let (estimator, _rx) = Estimator::with_channel(MockPlatform::full(), EstimatorSettings::default()).unwrap();
        estimator.start(Sensitivity::new(5.0, 5.0, 5.0));
        estimator.stop();

        assert!(estimator.platform().registered().is_empty());
        assert_eq!(estimator.sensitivity(), Sensitivity::ANY_CHANGE);
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let (estimator, _rx) = Estimator::with_channel(MockPlatform::full(), EstimatorSettings::default()).unwrap();
        estimator.stop();
        estimator.stop();
        assert!(estimator.platform().registered().is_empty());
        assert_eq!(estimator.emission_count(), 0);
    }

    #[test]
    fn test_first_estimate_always_emitted() {
        let (estimator, rx) = Estimator::with_channel(MockPlatform::full(), unsmoothed()).unwrap();
        estimator.start(Sensitivity::new(360.0, 360.0, 360.0));

        estimator.on_sample(&heading_sample(42.0));
        let estimate = rx.try_recv().unwrap();
        assert!((estimate.azimuth - 42.0).abs() < EPSILON);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_threshold_gating() {
        let (estimator, received) = recording(MockPlatform::full(), unsmoothed());
        estimator.start(Sensitivity::new(5.0, 5.0, 5.0));

        for azimuth in [10.0, 12.0, 14.0, 20.0] {
            estimator.on_sample(&heading_sample(azimuth));
        }

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert!((received[0].azimuth - 10.0).abs() < EPSILON);
        assert!((received[1].azimuth - 20.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_sensitivity_emits_every_sample() {
        let (estimator, received) = recording(MockPlatform::full(), unsmoothed());
        estimator.start_default();

        for _ in 0..4 {
            estimator.on_sample(&heading_sample(33.0));
        }
        assert_eq!(received.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_zero_azimuth_always_passes_gate() {
        // Last azimuth of 0° is indistinguishable from "never emitted"
        let (estimator, received) = recording(MockPlatform::full(), unsmoothed());
        estimator.start(Sensitivity::new(360.0, 360.0, 360.0));

        for _ in 0..3 {
            estimator.on_sample(&heading_sample(0.0));
        }
        assert_eq!(received.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_rotation_vector_latch_is_one_way() {
        let (estimator, received) = recording(MockPlatform::full(), unsmoothed());
        estimator.start_default();

        estimator.on_sample(&SensorSample::new(SensorKind::Accelerometer, 0, &[0.0, 0.0, 9.81]));
        estimator.on_sample(&SensorSample::new(SensorKind::Magnetometer, 0, &[-22.0, 0.0, -40.0]));
        assert_eq!(estimator.fusion_mode(), FusionMode::MagnetAccel);
        assert_eq!(received.lock().unwrap().len(), 1);

        estimator.on_sample(&heading_sample(200.0));
        assert_eq!(estimator.fusion_mode(), FusionMode::RotationVector);
        assert_eq!(received.lock().unwrap().len(), 2);

        estimator.on_sample(&SensorSample::new(SensorKind::Magnetometer, 0, &[22.0, 0.0, -40.0]));
        estimator.on_sample(&SensorSample::new(SensorKind::Accelerometer, 0, &[0.0, 0.0, 9.81]));
        assert_eq!(estimator.fusion_mode(), FusionMode::RotationVector);
        assert_eq!(received.lock().unwrap().len(), 2);
        assert!((estimator.last_emitted().unwrap().azimuth - 200.0).abs() < EPSILON);
    }

    #[test]
    fn test_magnet_accel_needs_both_vectors() {
        let platform = MockPlatform::with_sensors(&[SensorKind::Magnetometer, SensorKind::Accelerometer]);
        let (estimator, rx) = Estimator::with_channel(platform, EstimatorSettings::default()).unwrap();
        estimator.start_default();

        estimator.on_sample(&SensorSample::new(SensorKind::Magnetometer, 0, &[-22.0, 0.0, -40.0]));
        assert!(rx.try_recv().is_err());
        assert_eq!(estimator.fusion_mode(), FusionMode::Undetermined);

        estimator.on_sample(&SensorSample::new(SensorKind::Accelerometer, 0, &[0.0, 0.0, 9.81]));
        let estimate = rx.try_recv().unwrap();
        assert!((estimate.azimuth - 90.0).abs() < EPSILON);
        assert!(estimator.magnetic_inclination().is_some());
    }

    #[test]
    fn test_screen_rotation_queried_per_sample() {
        let (estimator, received) = recording(MockPlatform::full(), unsmoothed());
        estimator.start_default();

        estimator.on_sample(&heading_sample(10.0));
        estimator.platform().set_screen_rotation(ScreenRotation::Deg90);
        estimator.on_sample(&heading_sample(10.0));
        estimator.platform().set_screen_rotation(ScreenRotation::Deg270);
        estimator.on_sample(&heading_sample(10.0));

        let received = received.lock().unwrap();
        assert!((received[0].azimuth - 10.0).abs() < EPSILON);
        assert!((received[1].azimuth - 100.0).abs() < EPSILON);
        assert!((received[2].azimuth - 280.0).abs() < EPSILON);
    }

    #[test]
    fn test_malformed_samples_discarded() {
        let (estimator, rx) = Estimator::with_channel(MockPlatform::full(), unsmoothed()).unwrap();
        estimator.start_default();

        estimator.on_sample(&SensorSample::new(SensorKind::RotationVector, 0, &[0.1, 0.2]));
        estimator.on_sample(&SensorSample::new(SensorKind::RotationVector, 0, &[f32::NAN, 0.0, 0.0, 1.0]));
        estimator.on_sample(&SensorSample::new(SensorKind::Accelerometer, 0, &[]));

        assert!(rx.try_recv().is_err());
        assert_eq!(estimator.fusion_mode(), FusionMode::Undetermined);
    }

    #[test]
    fn test_rotation_vector_smoothing_applied() {
        let settings = EstimatorSettings {
            smoothing: SmoothingFactors {
                rotation_vector: 0.5,
                ..SmoothingFactors::NONE
            },
            ..Default::default()
        };
        let (estimator, received) = recording(MockPlatform::full(), settings);
        estimator.start_default();

        estimator.on_sample(&heading_sample(0.0));
        estimator.on_sample(&heading_sample(90.0));

        let received = received.lock().unwrap();
        let second = received[1].azimuth;
        // Halfway quaternion lands between the two headings
        assert!(second > 1.0 && second < 89.0, "azimuth {} not smoothed", second);
    }

    #[test]
    fn test_listener_may_stop_estimator() {
        let platform = MockPlatform::full();
        let (estimator, rx) = Estimator::with_channel(platform, unsmoothed()).unwrap();
        let estimator = Arc::new(estimator);
        estimator.start_default();

        let handle = Arc::clone(&estimator);
        let (tx, stopped) = mpsc::channel();
        estimator.set_listener(move |estimate| {
            handle.stop();
            let _ = tx.send(estimate);
        });

        estimator.on_sample(&heading_sample(45.0));
        assert!(stopped.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
        assert!(estimator.platform().registered().is_empty());
    }

    #[test]
    fn test_listener_may_stop_while_other_thread_samples() {
        let (estimator, _rx) = Estimator::with_channel(MockPlatform::full(), unsmoothed()).unwrap();
        let estimator = Arc::new(estimator);
        estimator.start_default();

        let handle = Arc::downgrade(&estimator);
        estimator.set_listener(move |_| {
            thread::sleep(Duration::from_millis(100));
            if let Some(estimator) = handle.upgrade() {
                estimator.stop();
            }
        });

        let (done_tx, done) = mpsc::channel();
        let workers: Vec<_> = [10.0, 200.0]
            .into_iter()
            .enumerate()
            .map(|(i, azimuth)| {
                let estimator = Arc::clone(&estimator);
                let done_tx = done_tx.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(30 * i as u64));
                    estimator.on_sample(&heading_sample(azimuth));
                    let _ = done_tx.send(i);
                })
            })
            .collect();

        for _ in 0..workers.len() {
            assert!(
                done.recv_timeout(Duration::from_secs(5)).is_ok(),
                "sensor thread did not finish"
            );
        }
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(estimator.emission_count(), 2);
        assert!(estimator.platform().registered().is_empty());
    }

    #[test]
    fn test_overflowing_rotation_vector_discarded() {
        let (estimator, received) = recording(MockPlatform::full(), EstimatorSettings::default());
        estimator.start_default();

        estimator.on_sample(&SensorSample::new(SensorKind::RotationVector, 0, &[1e20; 4]));
        assert!(received.lock().unwrap().is_empty());
        assert_eq!(estimator.last_emitted(), None);

        for i in 0..200 {
            estimator.on_sample(&heading_sample((i * 7 % 360) as f32));
        }

        let received = received.lock().unwrap();
        assert!(!received.is_empty());
        for estimate in received.iter() {
            assert!(estimate.is_finite(), "non-finite estimate {:?}", estimate);
            assert!((0.0..360.0).contains(&estimate.azimuth));
        }
    }

    #[test]
    fn test_complete_rotation_vector() {
        let vector = complete_rotation_vector(&[0.0, 0.0, 0.6]);
        assert!((vector[3] - 0.8).abs() < 1e-6);
        assert_eq!(vector[4], 0.0);

        let vector = complete_rotation_vector(&[0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(vector, [0.1, 0.2, 0.3, 0.4, 0.5]);
    }
}
