use super::measurement::{Attitude, Heading, VerticalSpeed};

/// One sample of the flight-state values consumed by the overlay per render tick.
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightState {
    pub attitude: Attitude,
    #[serde(rename = "vertical-speed")]
    pub vertical_speed: VerticalSpeed,
    pub heading: Heading,
    /// Relative bearing to home in degrees, if known
    #[serde(rename = "home-direction")]
    pub home_direction: Option<f32>,
}
