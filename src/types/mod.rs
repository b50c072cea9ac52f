pub mod flight;
pub mod measurement;

pub use flight::FlightState;
pub use measurement::{Attitude, Heading, VerticalSpeed};
