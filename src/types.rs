//! Core types and configuration for the compass heading estimator

/// Physical sensor a sample originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Platform-fused rotation vector (x, y, z, optional w, optional accuracy)
    RotationVector,
    /// Geomagnetic field in µT
    Magnetometer,
    /// Acceleration including gravity in m/s²
    Accelerometer,
}

impl SensorKind {
    /// All sensor kinds, in registration order
    pub const ALL: [SensorKind; 3] = [
        SensorKind::RotationVector,
        SensorKind::Magnetometer,
        SensorKind::Accelerometer,
    ];

    /// Minimum number of components a sample of this kind must carry
    pub fn min_components(self) -> usize {
        3
    }

    /// Maximum number of components retained for this kind
    pub fn max_components(self) -> usize {
        match self {
            SensorKind::RotationVector => 5,
            SensorKind::Magnetometer | SensorKind::Accelerometer => 3,
        }
    }
}

/// A single reading delivered by the platform
///
/// Ephemeral: produced by the sensor dispatch and consumed immediately by
/// [`Estimator::on_sample`](crate::Estimator::on_sample).
///
/// # Example
/// ```
/// use compass_heading::{SensorKind, SensorSample};
///
/// let sample = SensorSample::new(SensorKind::Accelerometer, 0, &[0.0, 0.0, 9.81]);
/// assert_eq!(sample.values(), &[0.0, 0.0, 9.81]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    /// Which sensor produced the values
    pub kind: SensorKind,
    /// Platform timestamp in nanoseconds
    pub timestamp_ns: u64,
    values: [f32; 5],
    len: usize,
}

impl SensorSample {
    /// Build a sample from a slice of values
    ///
    /// Values beyond the kind's maximum component count are dropped.
    pub fn new(kind: SensorKind, timestamp_ns: u64, values: &[f32]) -> Self {
        let len = values.len().min(kind.max_components());
        let mut buffer = [0.0; 5];
        buffer[..len].copy_from_slice(&values[..len]);
        Self {
            kind,
            timestamp_ns,
            values: buffer,
            len,
        }
    }

    /// The sample values as delivered
    pub fn values(&self) -> &[f32] {
        &self.values[..self.len]
    }

    /// Whether the sample carries enough finite components to be processed
    pub fn is_well_formed(&self) -> bool {
        self.len >= self.kind.min_components() && self.values().iter().all(|v| v.is_finite())
    }
}

/// Current display orientation relative to the device's natural orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenRotation {
    /// Natural orientation
    #[default]
    Deg0,
    /// Rotated 90° counter-clockwise
    Deg90,
    /// Upside down
    Deg180,
    /// Rotated 90° clockwise
    Deg270,
}

impl ScreenRotation {
    /// Rotation in degrees
    pub fn degrees(self) -> f32 {
        match self {
            ScreenRotation::Deg0 => 0.0,
            ScreenRotation::Deg90 => 90.0,
            ScreenRotation::Deg180 => 180.0,
            ScreenRotation::Deg270 => 270.0,
        }
    }
}

/// Minimum change in degrees, per axis, before a new estimate is emitted
///
/// Set an axis to 0 to be notified of every sample, or to 360 to never be
/// notified because of that axis alone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sensitivity {
    pub azimuth: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Sensitivity {
    /// Notify on every processed sample
    pub const ANY_CHANGE: Sensitivity = Sensitivity {
        azimuth: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    pub fn new(azimuth: f32, pitch: f32, roll: f32) -> Self {
        Self {
            azimuth,
            pitch,
            roll,
        }
    }
}

/// Exponential smoothing factors, one per sensor kind
///
/// Each factor lies in `0 < alpha <= 1`. A factor of 1 disables smoothing;
/// a factor of 0 freezes the first value forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingFactors {
    pub rotation_vector: f32,
    pub geomagnetic: f32,
    pub gravity: f32,
}

impl SmoothingFactors {
    /// Pass every sample through unchanged
    pub const NONE: SmoothingFactors = SmoothingFactors {
        rotation_vector: 1.0,
        geomagnetic: 1.0,
        gravity: 1.0,
    };
}

impl Default for SmoothingFactors {
    fn default() -> Self {
        Self {
            rotation_vector: 0.5,
            geomagnetic: 0.4,
            gravity: 0.1,
        }
    }
}

/// Requested delivery rate for sensor listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorDelay {
    /// As fast as the hardware allows
    Fastest,
    /// Rate suitable for games (~20 ms)
    Game,
    /// Rate suitable for the user interface (~66 ms)
    Ui,
    /// Rate suitable for screen orientation changes (~200 ms)
    #[default]
    Normal,
}

impl SensorDelay {
    /// Nominal sampling period in microseconds
    pub fn period_us(self) -> u32 {
        match self {
            SensorDelay::Fastest => 0,
            SensorDelay::Game => 20_000,
            SensorDelay::Ui => 66_667,
            SensorDelay::Normal => 200_000,
        }
    }
}

/// Estimator configuration
///
/// # Example
/// ```
/// use compass_heading::{EstimatorSettings, Sensitivity, SmoothingFactors};
///
/// let settings = EstimatorSettings {
///     smoothing: SmoothingFactors { rotation_vector: 0.3, ..Default::default() },
///     default_sensitivity: Sensitivity::new(1.0, 360.0, 360.0),
///     ..Default::default()
/// };
/// assert_eq!(settings.smoothing.gravity, 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EstimatorSettings {
    /// Smoothing factors applied to incoming sensor vectors
    pub smoothing: SmoothingFactors,
    /// Thresholds applied by [`Estimator::start_default`](crate::Estimator::start_default)
    pub default_sensitivity: Sensitivity,
    /// Listener delivery rate requested from the platform
    pub sensor_delay: SensorDelay,
}

/// Which sensor source the estimator is currently fusing
///
/// Transitions are one-way: `Undetermined -> MagnetAccel -> RotationVector`
/// or `Undetermined -> RotationVector`. Once `RotationVector` is reached it
/// is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FusionMode {
    /// No sample has produced an orientation yet
    #[default]
    Undetermined,
    /// Magnetometer and accelerometer are fused
    MagnetAccel,
    /// The rotation-vector sensor is authoritative
    RotationVector,
}

/// Orientation derived from the device frame, in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawOrientation {
    pub azimuth: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Screen-corrected orientation, in degrees
///
/// Azimuth lies in `[0, 360)`, pitch in `[-180, 180]`, roll in `[-90, 90]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationEstimate {
    pub azimuth: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl OrientationEstimate {
    /// True when azimuth, pitch and roll are all finite
    pub fn is_finite(&self) -> bool {
        self.azimuth.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}
