//! Angle helpers and nalgebra extensions for the heading estimator

use nalgebra::Vector3;

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Wrap an azimuth in degrees into `[0, 360)`
///
/// Inputs are expected within one turn below zero, which holds for every
/// value produced by the screen correction (raw azimuth ≥ -180, offset ≤ 450).
///
/// # Example
/// ```
/// use compass_heading::normalize_azimuth;
///
/// assert_eq!(normalize_azimuth(-90.0), 270.0);
/// assert_eq!(normalize_azimuth(450.0), 90.0);
/// ```
pub fn normalize_azimuth(azimuth: f32) -> f32 {
    let wrapped = (azimuth + 360.0) % 360.0;
    // % keeps the dividend's sign, so anything below -360 needs a second pass
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

/// Reflect an angle across ±180° when the device is upside down
///
/// `v > 0` maps to `180 - v`, everything else to `-180 - v`.
pub fn reflect_flipped(value: f32) -> f32 {
    if value > 0.0 {
        180.0 - value
    } else {
        -180.0 - value
    }
}

/// Round to two decimal places, coercing non-finite input to 0°
///
/// # Example
/// ```
/// use compass_heading::round_degrees;
///
/// assert_eq!(round_degrees(12.3456), 12.35);
/// assert_eq!(round_degrees(f32::NAN), 0.0);
/// ```
pub fn round_degrees(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.is_finite() { rounded } else { 0.0 }
}

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, returning zero vector if magnitude is zero
    fn safe_normalize(&self) -> Vector3<f32>;
}

impl Vector3Ext for Vector3<f32> {
    fn safe_normalize(&self) -> Vector3<f32> {
        let magnitude_squared = self.magnitude_squared();
        if magnitude_squared > 0.0 {
            *self / magnitude_squared.sqrt()
        } else {
            Vector3::zeros()
        }
    }
}
