//! Rotation matrix derivation and orientation extraction
//!
//! Rotation matrices map device coordinates to world coordinates, where the
//! world frame is East-North-Up: X points East, Y points magnetic North and
//! Z points towards the sky. Row 0 of the matrix is the East axis expressed
//! in device coordinates, row 1 is North and row 2 is Up.

use crate::math::Vector3Ext;
use crate::types::RawOrientation;
use nalgebra::{Matrix3, Vector3};

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Below this squared magnitude the accelerometer is treated as free-falling
const FREE_FALL_GRAVITY_SQUARED: f32 = 0.01 * STANDARD_GRAVITY * STANDARD_GRAVITY;

/// Minimum magnitude of `geomagnetic × gravity` before the device is
/// considered too close to magnetic north/south or the field too weak
const MIN_HORIZONTAL_FIELD: f32 = 0.1;

/// Rotation and inclination matrices derived from gravity and geomagnetic field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityRotation {
    /// Device-to-world rotation
    pub rotation: Matrix3<f32>,
    /// Rotation of the geomagnetic vector into the gravity frame
    pub inclination: Matrix3<f32>,
}

/// Build a rotation matrix from a rotation-vector reading
///
/// The first three components are the vector part of a unit quaternion.
/// The scalar part is taken from the fourth component when present,
/// otherwise derived from the unit-norm constraint.
///
/// Returns `None` for readings with fewer than three components.
///
/// # Example
/// ```
/// use compass_heading::rotation::rotation_matrix_from_vector;
/// use nalgebra::Matrix3;
///
/// let rotation = rotation_matrix_from_vector(&[0.0, 0.0, 0.0, 1.0]).unwrap();
/// assert_eq!(rotation, Matrix3::identity());
/// ```
pub fn rotation_matrix_from_vector(rotation_vector: &[f32]) -> Option<Matrix3<f32>> {
    let (q1, q2, q3) = match rotation_vector {
        [x, y, z, ..] => (*x, *y, *z),
        _ => return None,
    };

    let q0 = match rotation_vector.get(3) {
        Some(w) => *w,
        None => {
            let w_squared = 1.0 - q1 * q1 - q2 * q2 - q3 * q3;
            if w_squared > 0.0 { w_squared.sqrt() } else { 0.0 }
        }
    };

    let sq_q1 = 2.0 * q1 * q1;
    let sq_q2 = 2.0 * q2 * q2;
    let sq_q3 = 2.0 * q3 * q3;
    let q1_q2 = 2.0 * q1 * q2;
    let q3_q0 = 2.0 * q3 * q0;
    let q1_q3 = 2.0 * q1 * q3;
    let q2_q0 = 2.0 * q2 * q0;
    let q2_q3 = 2.0 * q2 * q3;
    let q1_q0 = 2.0 * q1 * q0;

    Some(Matrix3::new(
        1.0 - sq_q2 - sq_q3,
        q1_q2 - q3_q0,
        q1_q3 + q2_q0,
        q1_q2 + q3_q0,
        1.0 - sq_q1 - sq_q3,
        q2_q3 - q1_q0,
        q1_q3 - q2_q0,
        q2_q3 + q1_q0,
        1.0 - sq_q1 - sq_q2,
    ))
}

/// Build rotation and inclination matrices from gravity and geomagnetic vectors
///
/// Uses cross products to construct the orthogonal East and North axes:
/// `East = geomagnetic × gravity`, `North = gravity × East`.
///
/// Returns `None` when the device is in free fall or when the horizontal
/// component of the magnetic field is too small to define East.
///
/// # Example
/// ```
/// use compass_heading::rotation::{orientation, rotation_matrix_from_gravity};
///
/// // Flat on a table, top edge pointing at magnetic north
/// let gravity = [0.0, 0.0, 9.81];
/// let geomagnetic = [0.0, 22.0, -40.0];
///
/// let solution = rotation_matrix_from_gravity(&gravity, &geomagnetic).unwrap();
/// let raw = orientation(&solution.rotation);
/// assert!(raw.azimuth.abs() < 1e-5);
/// ```
pub fn rotation_matrix_from_gravity(
    gravity: &[f32; 3],
    geomagnetic: &[f32; 3],
) -> Option<GravityRotation> {
    let gravity = Vector3::from(*gravity);
    let geomagnetic = Vector3::from(*geomagnetic);

    if gravity.magnitude_squared() < FREE_FALL_GRAVITY_SQUARED {
        return None;
    }

    let east = geomagnetic.cross(&gravity);
    if east.magnitude() < MIN_HORIZONTAL_FIELD {
        return None;
    }

    let east = east.safe_normalize();
    let up = gravity.safe_normalize();
    let north = up.cross(&east);

    let rotation = Matrix3::from_rows(&[east.transpose(), north.transpose(), up.transpose()]);

    let field = geomagnetic.magnitude();
    let inclination = if field > 0.0 {
        let c = geomagnetic.dot(&north) / field;
        let s = geomagnetic.dot(&up) / field;
        Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
    } else {
        Matrix3::identity()
    };

    Some(GravityRotation {
        rotation,
        inclination,
    })
}

/// Extract azimuth, pitch and roll (radians) from a rotation matrix
///
/// - azimuth: rotation about -Z, `atan2(R[0][1], R[1][1])`, range -π..π
/// - pitch: rotation about -X, `asin(-R[2][1])`, range -π/2..π/2
/// - roll: rotation about Y, `atan2(-R[2][0], R[2][2])`, range -π..π
pub fn orientation(rotation: &Matrix3<f32>) -> RawOrientation {
    // Numerical drift can push the sine slightly outside [-1, 1]
    let pitch_sine = (-rotation[(2, 1)]).clamp(-1.0, 1.0);

    RawOrientation {
        azimuth: rotation[(0, 1)].atan2(rotation[(1, 1)]),
        pitch: pitch_sine.asin(),
        roll: (-rotation[(2, 0)]).atan2(rotation[(2, 2)]),
    }
}

/// Magnetic dip angle in radians from an inclination matrix
pub fn inclination_angle(inclination: &Matrix3<f32>) -> f32 {
    inclination[(1, 2)].atan2(inclination[(1, 1)])
}
