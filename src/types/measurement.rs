use core::f32::consts::PI;

use derive_more::{Add, From, Sub};

pub const DEGREE_PER_RAD: f32 = 180.0 / PI;

pub const DECIDEGREES_PER_CIRCLE: i32 = 3600;

/// Pitch and roll in radians. On the horizon a positive pitch lifts the ladder
/// and a positive roll turns it clockwise.
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub pitch: f32,
    pub roll: f32,
}

impl Attitude {
    pub fn new(pitch: f32, roll: f32) -> Self {
        Self { pitch, roll }
    }

    pub fn from_degrees(pitch: f32, roll: f32) -> Self {
        Self { pitch: pitch / DEGREE_PER_RAD, roll: roll / DEGREE_PER_RAD }
    }
}

/// Heading in tenths of a degree, always within [0, 3600).
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Heading(u16);

impl Heading {
    pub fn new(decidegrees: i32) -> Self {
        Self(decidegrees.rem_euclid(DECIDEGREES_PER_CIRCLE) as u16)
    }

    pub fn from_degrees(degrees: f32) -> Self {
        Self::new((degrees * 10.0) as i32)
    }

    pub fn decidegrees(self) -> u16 {
        self.0
    }
}

impl From<u16> for Heading {
    fn from(decidegrees: u16) -> Self {
        Self::new(decidegrees as i32)
    }
}

impl<'de> serde::Deserialize<'de> for Heading {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let decidegrees = i32::deserialize(deserializer)?;
        Ok(Self::new(decidegrees))
    }
}

/// Vertical speed in cm/s, climb positive.
#[derive(Copy, Clone, Default, Debug, PartialEq, PartialOrd, Add, Sub, From)]
#[derive(Serialize, Deserialize)]
pub struct VerticalSpeed(pub f32);

impl VerticalSpeed {
    pub fn cms(self) -> f32 {
        self.0
    }
}

mod test {
    #[test]
    fn test_heading_normalize() {
        use super::Heading;

        assert_eq!(Heading::new(0).decidegrees(), 0);
        assert_eq!(Heading::new(3599).decidegrees(), 3599);
        assert_eq!(Heading::new(3600).decidegrees(), 0);
        assert_eq!(Heading::new(-10).decidegrees(), 3590);
        assert_eq!(Heading::from_degrees(90.0).decidegrees(), 900);
    }

    #[test]
    fn test_vertical_speed_delta() {
        use super::VerticalSpeed;

        let delta = VerticalSpeed(120.0) - VerticalSpeed::from(20.0);
        assert_eq!(delta.cms(), 100.0);
    }
}
