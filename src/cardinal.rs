//! Eight-point compass labels for an azimuth

use crate::math::normalize_azimuth;
use core::fmt;

/// Compass point nearest to a heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

/// Closed sectors checked in order; anything unmatched is north
const SECTORS: [(f32, f32, CardinalDirection); 7] = [
    (22.5, 67.5, CardinalDirection::NorthEast),
    (67.5, 112.5, CardinalDirection::East),
    (112.5, 157.5, CardinalDirection::SouthEast),
    (157.5, 202.5, CardinalDirection::South),
    (202.5, 247.5, CardinalDirection::SouthWest),
    (247.5, 292.5, CardinalDirection::West),
    (292.5, 337.5, CardinalDirection::NorthWest),
];

impl CardinalDirection {
    /// Classify an azimuth in degrees
    ///
    /// The azimuth is wrapped into `[0, 360)` first; non-finite input reads
    /// as north. Sector bounds are inclusive and compared against the
    /// unrounded value, and the first matching sector wins, so 67.5° is
    /// north-east while 22.496° is still north.
    ///
    /// # Example
    /// ```
    /// use compass_heading::CardinalDirection;
    ///
    /// assert_eq!(CardinalDirection::from_azimuth(90.0), CardinalDirection::East);
    /// assert_eq!(CardinalDirection::from_azimuth(350.0), CardinalDirection::North);
    /// assert_eq!(CardinalDirection::from_azimuth(-45.0), CardinalDirection::NorthWest);
    /// ```
    pub fn from_azimuth(azimuth: f32) -> Self {
        let azimuth = normalize_azimuth(azimuth);
        SECTORS
            .iter()
            .find(|(low, high, _)| (*low..=*high).contains(&azimuth))
            .map_or(CardinalDirection::North, |(_, _, direction)| *direction)
    }

    /// Short label such as `"NE"`
    pub fn label(self) -> &'static str {
        match self {
            CardinalDirection::North => "N",
            CardinalDirection::NorthEast => "NE",
            CardinalDirection::East => "E",
            CardinalDirection::SouthEast => "SE",
            CardinalDirection::South => "S",
            CardinalDirection::SouthWest => "SW",
            CardinalDirection::West => "W",
            CardinalDirection::NorthWest => "NW",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
