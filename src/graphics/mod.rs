pub mod context;
pub mod raster;
pub mod transform;

pub use context::{GraphicsState, StateStack};
pub use transform::Transform;
