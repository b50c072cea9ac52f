#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate pro_osd;

use std::collections::HashMap;
use std::f32::consts::PI;
use std::time::{Duration, Instant};

use pro_osd::config::OSD;
use pro_osd::drivers::{FrameBuffer, PixelCanvas};
use pro_osd::hal::canvas::Color;
use pro_osd::hal::font::{Font, Glyph, GLYPH_DATA_SIZE, GLYPH_HEIGHT, GLYPH_WIDTH};
use pro_osd::osd::{symbol, Overlay};
use pro_osd::types::{Attitude, FlightState, Heading, VerticalSpeed};

lazy_static! {
    static ref BOOT: Instant = Instant::now();
}

#[no_mangle]
fn get_jiffies() -> Duration {
    BOOT.elapsed()
}

const PATTERN_SCALE: usize = 2;

#[rustfmt::skip]
const PATTERNS: [(u16, [u8; 5]); 20] = [
    (b'0' as u16, [0b111, 0b101, 0b101, 0b101, 0b111]),
    (b'1' as u16, [0b010, 0b110, 0b010, 0b010, 0b111]),
    (b'2' as u16, [0b111, 0b001, 0b111, 0b100, 0b111]),
    (b'3' as u16, [0b111, 0b001, 0b111, 0b001, 0b111]),
    (b'4' as u16, [0b101, 0b101, 0b111, 0b001, 0b001]),
    (b'5' as u16, [0b111, 0b100, 0b111, 0b001, 0b111]),
    (b'6' as u16, [0b111, 0b100, 0b111, 0b101, 0b111]),
    (b'7' as u16, [0b111, 0b001, 0b001, 0b001, 0b001]),
    (b'8' as u16, [0b111, 0b101, 0b111, 0b101, 0b111]),
    (b'9' as u16, [0b111, 0b101, 0b111, 0b001, 0b111]),
    (symbol::HEADING_N, [0b101, 0b111, 0b111, 0b111, 0b101]),
    (symbol::HEADING_E, [0b111, 0b100, 0b111, 0b100, 0b111]),
    (symbol::HEADING_S, [0b111, 0b100, 0b111, 0b001, 0b111]),
    (symbol::HEADING_W, [0b101, 0b101, 0b111, 0b111, 0b101]),
    (symbol::HEADING_LINE, [0b000, 0b000, 0b000, 0b000, 0b010]),
    (symbol::HEADING_DIVIDED_LINE, [0b000, 0b000, 0b010, 0b010, 0b010]),
    (symbol::VARIO_UP_2A, [0b010, 0b111, 0b101, 0b000, 0b000]),
    (symbol::VARIO_DOWN_2A, [0b000, 0b000, 0b101, 0b111, 0b010]),
    (b'-' as u16, [0b000, 0b000, 0b111, 0b000, 0b000]),
    (b' ' as u16, [0b000, 0b000, 0b000, 0b000, 0b000]),
];

/// Coarse 3x5 font scaled up into 12x18 cells with a black outline
pub struct BlockFont {
    glyphs: HashMap<u16, [u8; GLYPH_DATA_SIZE]>,
}

impl BlockFont {
    pub fn new() -> Self {
        let glyphs = PATTERNS.iter().map(|&(chr, rows)| (chr, Self::render(&rows))).collect();
        Self { glyphs }
    }

    fn render(rows: &[u8; 5]) -> [u8; GLYPH_DATA_SIZE] {
        let (w, h) = (GLYPH_WIDTH as usize, GLYPH_HEIGHT as usize);
        let (left, top) = ((w - 3 * PATTERN_SCALE) / 2, (h - 5 * PATTERN_SCALE) / 2);
        let white = |x: isize, y: isize| {
            if x < left as isize || y < top as isize {
                return false;
            }
            let (px, py) = ((x as usize - left) / PATTERN_SCALE, (y as usize - top) / PATTERN_SCALE);
            px < 3 && py < 5 && rows[py] & (0b100 >> px) != 0
        };
        let mut data = [0x55u8; GLYPH_DATA_SIZE];
        for y in 0..h as isize {
            for x in 0..w as isize {
                let bits = if white(x, y) {
                    0b10
                } else if (-1..=1).any(|dy| (-1..=1).any(|dx| white(x + dx, y + dy))) {
                    0b00
                } else {
                    continue;
                };
                let index = y as usize * w + x as usize;
                let shift = 6 - 2 * (index % 4);
                data[index / 4] = (data[index / 4] & !(0b11 << shift)) | (bits << shift);
            }
        }
        data
    }
}

impl Font for BlockFont {
    fn glyph(&self, chr: u16) -> Option<Glyph> {
        self.glyphs.get(&chr).map(|data| Glyph::new(&data[..]))
    }
}

/// Scripted flight, a slow climbing turn with some wobble
pub fn flight_state(seconds: f32) -> FlightState {
    let pitch = 15.0 * (seconds * PI / 6.0).sin();
    let roll = 30.0 * (seconds * PI / 4.0).sin();
    FlightState {
        attitude: Attitude::from_degrees(pitch, roll),
        vertical_speed: VerticalSpeed(200.0 * (seconds * PI / 8.0).sin()),
        heading: Heading::from_degrees(seconds * 10.0),
        home_direction: Some(90.0 * (seconds * PI / 10.0).sin()),
    }
}

pub struct Simulator<const W: usize, const H: usize> {
    frame: Box<FrameBuffer<W, H>>,
    font: BlockFont,
    overlay: Overlay,
}

pub type PalSimulator = Simulator<360, 288>;
pub type NtscSimulator = Simulator<360, 234>;

impl<const W: usize, const H: usize> Simulator<W, H> {
    /// Frame buffer must match the video standard the overlay is laid out for
    pub fn new(config: &OSD) -> Result<Self, String> {
        let metrics = config.standard.metrics();
        if (metrics.width as usize, metrics.height as usize) != (W, H) {
            let (width, height) = (metrics.width, metrics.height);
            return Err(format!("{} needs {}x{} frame, got {}x{}", config.standard, width, height, W, H));
        }
        let frame = Box::new(FrameBuffer::new());
        Ok(Self { frame, font: BlockFont::new(), overlay: Overlay::new(config) })
    }

    pub fn render(&mut self, state: &FlightState, now: Duration) {
        trace!("Render {:?} at {:?}", state, now);
        let mut canvas = PixelCanvas::new(&mut self.frame, &self.font);
        self.overlay.render_at(Some(&mut canvas), state, now);
    }

    /// Downsampled text view, each character covering `sx` x `sy` pixels
    pub fn ascii(&self, sx: usize, sy: usize) -> String {
        let (sx, sy) = (sx.max(1), sy.max(1));
        let mut output = String::new();
        for by in (0..H).step_by(sy) {
            for bx in (0..W).step_by(sx) {
                let mut counts = [0usize; 4];
                for y in by..(by + sy).min(H) {
                    for x in bx..(bx + sx).min(W) {
                        if let Some(color) = self.frame.get(x as i32, y as i32) {
                            counts[color as usize] += 1;
                        }
                    }
                }
                let chr = if counts[Color::White as usize] > 0 {
                    '#'
                } else if counts[Color::Gray as usize] > 0 {
                    '+'
                } else if counts[Color::Black as usize] > 0 {
                    '.'
                } else {
                    ' '
                };
                output.push(chr);
            }
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn test_frame_follows_standard() {
        use pro_osd::config::{Standard, OSD};

        use super::{NtscSimulator, PalSimulator};

        let ntsc = OSD { standard: Standard::NTSC, ..OSD::DEFAULT };
        assert!(PalSimulator::new(&OSD::DEFAULT).is_ok());
        assert!(NtscSimulator::new(&ntsc).is_ok());
        assert!(PalSimulator::new(&ntsc).is_err());

        let simulator = NtscSimulator::new(&ntsc).unwrap();
        let text = simulator.ascii(3, 6);
        assert_eq!(text.lines().count(), 39);
        assert!(text.lines().all(|line| line.len() == 120));
    }
}
