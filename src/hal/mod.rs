pub mod canvas;
pub mod font;

pub use canvas::{BitmapOption, Canvas, Capabilities, Color, Metrics, OutlineType, Point, Rect};
pub use font::{Font, Glyph};
