//! Screen-rotation compensation
//!
//! Orientation is derived in the device's natural frame. When the display is
//! rotated the heading shown to the user must follow the screen's top edge
//! instead, so azimuth is offset by the rotation and pitch/roll are remapped.
//!
//! # Example
//! ```
//! use compass_heading::{RawOrientation, ScreenRotation, correct};
//!
//! let raw = RawOrientation { azimuth: 0.0, pitch: 0.0, roll: 0.0 };
//! let estimate = correct(raw, ScreenRotation::Deg90);
//! assert_eq!(estimate.azimuth, 90.0);
//! ```

use crate::math::{RAD_TO_DEG, normalize_azimuth, reflect_flipped};
use crate::types::{OrientationEstimate, RawOrientation, ScreenRotation};

/// Apply screen-rotation correction to a raw orientation in radians
///
/// | rotation | azimuth | pitch        | roll         | flip check |
/// |----------|---------|--------------|--------------|------------|
/// | 0°       | + 0     | raw pitch    | raw roll     | yes        |
/// | 90°      | + 90    | raw roll     | -raw pitch   | no         |
/// | 180°     | + 180   | -raw pitch   | -raw roll    | yes        |
/// | 270°     | + 270   | -raw roll    | raw pitch    | no         |
///
/// The flip check fires when the corrected roll is `>= 90` or `<= -90`
/// (device face down): azimuth gains another 180° and pitch/roll are
/// reflected with [`reflect_flipped`]. The resulting azimuth is wrapped into
/// `[0, 360)`.
pub fn correct(raw: RawOrientation, rotation: ScreenRotation) -> OrientationEstimate {
    correct_degrees(
        raw.azimuth * RAD_TO_DEG,
        raw.pitch * RAD_TO_DEG,
        raw.roll * RAD_TO_DEG,
        rotation,
    )
}

/// Same as [`correct`] with inputs already converted to degrees
pub fn correct_degrees(
    azimuth: f32,
    pitch: f32,
    roll: f32,
    rotation: ScreenRotation,
) -> OrientationEstimate {
    let (azimuth, pitch, roll) = match rotation {
        ScreenRotation::Deg0 => unflip(azimuth, pitch, roll),
        ScreenRotation::Deg90 => (azimuth + 90.0, roll, -pitch),
        ScreenRotation::Deg180 => unflip(azimuth + 180.0, -pitch, -roll),
        ScreenRotation::Deg270 => (azimuth + 270.0, -roll, pitch),
    };

    OrientationEstimate {
        azimuth: normalize_azimuth(azimuth),
        pitch,
        roll,
    }
}

fn unflip(azimuth: f32, pitch: f32, roll: f32) -> (f32, f32, f32) {
    if roll >= 90.0 || roll <= -90.0 {
        (azimuth + 180.0, reflect_flipped(pitch), reflect_flipped(roll))
    } else {
        (azimuth, pitch, roll)
    }
}
