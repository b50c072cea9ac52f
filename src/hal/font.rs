use super::canvas::Color;

/// Character cell of MAX7456 compatible fonts
pub const GLYPH_WIDTH: u8 = 12;
pub const GLYPH_HEIGHT: u8 = 18;
pub const GLYPH_DATA_SIZE: usize = GLYPH_WIDTH as usize * GLYPH_HEIGHT as usize / 4;

/// Glyph bitmap with 2 bits per pixel, most significant pair first,
/// `00` black, `10` white and `x1` transparent.
#[derive(Copy, Clone, Debug)]
pub struct Glyph<'a> {
    pub width: u8,
    pub height: u8,
    pub data: &'a [u8],
}

impl<'a> Glyph<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { width: GLYPH_WIDTH, height: GLYPH_HEIGHT, data }
    }

    pub fn pixel(&self, x: u8, y: u8) -> Color {
        let index = y as usize * self.width as usize + x as usize;
        let byte = match self.data.get(index / 4) {
            Some(&byte) => byte,
            None => return Color::Transparent,
        };
        match (byte >> (6 - 2 * (index % 4))) & 0b11 {
            0b00 => Color::Black,
            0b10 => Color::White,
            _ => Color::Transparent,
        }
    }
}

pub trait Font {
    fn glyph(&self, chr: u16) -> Option<Glyph>;
}

mod test {
    #[test]
    fn test_glyph_pixel() {
        use super::{Glyph, GLYPH_DATA_SIZE};
        use crate::hal::canvas::Color;

        let mut data = [0x55u8; GLYPH_DATA_SIZE];
        data[0] = 0b00_10_01_11;
        let glyph = Glyph::new(&data);
        assert_eq!(glyph.pixel(0, 0), Color::Black);
        assert_eq!(glyph.pixel(1, 0), Color::White);
        assert_eq!(glyph.pixel(2, 0), Color::Transparent);
        assert_eq!(glyph.pixel(3, 0), Color::Transparent);
        assert_eq!(glyph.pixel(11, 17), Color::Transparent);
    }
}
