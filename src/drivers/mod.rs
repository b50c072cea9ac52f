pub mod framebuffer;
pub mod pixel_canvas;
#[cfg(any(test, feature = "std"))]
pub mod recorder;

pub use framebuffer::FrameBuffer;
pub use pixel_canvas::PixelCanvas;
