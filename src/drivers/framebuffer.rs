use crate::hal::canvas::Color;

/// Overlay pixel buffer shared between the render tick and the display driver
pub struct FrameBuffer<const W: usize, const H: usize> {
    pixels: [[Color; W]; H],
}

impl<const W: usize, const H: usize> Default for FrameBuffer<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> FrameBuffer<W, H> {
    pub const fn new() -> Self {
        Self { pixels: [[Color::Transparent; W]; H] }
    }

    pub const fn width(&self) -> u16 {
        W as u16
    }

    pub const fn height(&self) -> u16 {
        H as u16
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 {
            return None;
        }
        self.pixels.get(y as usize).and_then(|row| row.get(x as usize)).copied()
    }

    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(pixel) = self.pixels.get_mut(y as usize).and_then(|row| row.get_mut(x as usize))
        {
            *pixel = color;
        }
    }

    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|row| row.iter_mut().for_each(|p| *p = Color::Transparent));
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Color; W]> {
        self.pixels.iter()
    }

    pub fn count(&self, color: Color) -> usize {
        self.rows().map(|row| row.iter().filter(|&&p| p == color).count()).sum()
    }
}
