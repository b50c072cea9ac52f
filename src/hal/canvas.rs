use bitflags::bitflags;
use heapless::Vec;

use crate::graphics::Transform;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    /// Erases when painted
    Transparent = 1,
    White = 2,
    Gray = 3,
}

impl Default for Color {
    fn default() -> Self {
        Self::Transparent
    }
}

impl Color {
    pub fn inverted(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
            color => color,
        }
    }
}

/// Side of a stroked line that receives a one pixel outline
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutlineType {
    None,
    Top,
    Right,
    Bottom,
    Left,
}

impl OutlineType {
    pub fn offset(self) -> Option<(i32, i32)> {
        match self {
            Self::None => None,
            Self::Top => Some((0, -1)),
            Self::Right => Some((1, 0)),
            Self::Bottom => Some((0, 1)),
            Self::Left => Some((-1, 0)),
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct BitmapOption: u8 {
        const INVERT_COLORS = 1 << 0;
        const SOLID_BACKGROUND = 1 << 1;
        /// Transparent glyph pixels erase the background
        const ERASE_TRANSPARENT = 1 << 2;
    }
}

bitflags! {
    /// Operations a canvas backend actually implements
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Capabilities: u16 {
        const PIXEL = 1 << 0;
        const STROKE = 1 << 1;
        const FILL = 1 << 2;
        const CHARACTER = 1 << 3;
        const TRANSFORM = 1 << 4;
        const CONTEXT = 1 << 5;
        const CLIP = 1 << 6;
        const OUTLINE = 1 << 7;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Turns negative extents into positive ones spanning the same area
    pub fn normalized(self) -> Self {
        let (x, w) = if self.w < 0 { (self.x + self.w, -self.w) } else { (self.x, self.w) };
        let (y, h) = if self.h < 0 { (self.y + self.h, -self.h) } else { (self.y, self.h) };
        Self { x, y, w, h }
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let (a, b) = (self.normalized(), other.normalized());
        let x0 = a.x.max(b.x);
        let y0 = a.y.max(b.y);
        let x1 = (a.x + a.w).min(b.x + b.w);
        let y1 = (a.y + a.h).min(b.y + b.h);
        Rect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Metrics {
    pub width: u16,
    pub height: u16,
    pub grid_element_width: u8,
    pub grid_element_height: u8,
}

impl Metrics {
    pub fn gw(&self) -> i32 {
        self.grid_element_width as i32
    }

    pub fn gh(&self) -> i32 {
        self.grid_element_height as i32
    }
}

const MAX_STRING_SIZE: usize = 32;

fn to_characters(string: &str) -> Vec<u16, MAX_STRING_SIZE> {
    string.bytes().take(MAX_STRING_SIZE).map(|b| b as u16).collect()
}

/// A 2D drawing surface.
///
/// Coordinates handed to primitives are in the local frame of the current
/// transformation matrix; the backend projects them to device pixels. Clip and
/// clear rectangles are given in device pixels. Nothing reports failure, a
/// caller checks `capabilities()` once before a draw sequence.
pub trait Canvas {
    fn metrics(&self) -> Metrics;
    fn capabilities(&self) -> Capabilities;

    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_and_fill_color(&mut self, color: Color) {
        self.set_stroke_color(color);
        self.set_fill_color(color);
    }
    fn set_color_inversion(&mut self, inverted: bool);
    fn set_line_outline_type(&mut self, outline: OutlineType);
    fn set_line_outline_color(&mut self, color: Color);

    fn set_pixel(&mut self, x: i32, y: i32, color: Color);
    fn set_pixel_to_stroke_color(&mut self, x: i32, y: i32);
    fn set_pixel_to_fill_color(&mut self, x: i32, y: i32);

    fn clear_rect(&mut self, rect: Rect);
    fn clip_to_rect(&mut self, rect: Rect);
    fn reset_drawing_context(&mut self);

    /// Glyphs are placed at the projected anchor and advance in device pixels
    fn draw_characters(&mut self, x: i32, y: i32, chars: &[u16], opts: BitmapOption);
    /// Paints the opaque pixels of each glyph with a single color
    fn draw_characters_mask(
        &mut self,
        x: i32,
        y: i32,
        chars: &[u16],
        color: Color,
        opts: BitmapOption,
    );
    fn draw_character(&mut self, x: i32, y: i32, chr: u16, opts: BitmapOption) {
        self.draw_characters(x, y, &[chr], opts)
    }
    fn draw_character_mask(&mut self, x: i32, y: i32, chr: u16, color: Color, opts: BitmapOption) {
        self.draw_characters_mask(x, y, &[chr], color, opts)
    }
    fn draw_string(&mut self, x: i32, y: i32, string: &str, opts: BitmapOption) {
        self.draw_characters(x, y, &to_characters(string), opts)
    }
    fn draw_string_mask(&mut self, x: i32, y: i32, string: &str, color: Color, opts: BitmapOption) {
        self.draw_characters_mask(x, y, &to_characters(string), color, opts)
    }

    fn move_to_point(&mut self, x: i32, y: i32);
    fn stroke_line_to_point(&mut self, x: i32, y: i32);

    fn stroke_triangle(&mut self, p1: Point, p2: Point, p3: Point);
    fn fill_triangle(&mut self, p1: Point, p2: Point, p3: Point);
    fn fill_stroke_triangle(&mut self, p1: Point, p2: Point, p3: Point) {
        self.fill_triangle(p1, p2, p3);
        self.stroke_triangle(p1, p2, p3);
    }

    fn stroke_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect);
    fn fill_stroke_rect(&mut self, rect: Rect) {
        self.fill_rect(rect);
        self.stroke_rect(rect);
    }

    fn stroke_ellipse_in_rect(&mut self, rect: Rect);
    fn fill_ellipse_in_rect(&mut self, rect: Rect);
    fn fill_stroke_ellipse_in_rect(&mut self, rect: Rect) {
        self.fill_ellipse_in_rect(rect);
        self.stroke_ellipse_in_rect(rect);
    }

    fn ctm_reset(&mut self);
    fn ctm_set(&mut self, ctm: Transform);
    fn ctm_translate(&mut self, tx: f32, ty: f32);
    fn ctm_scale(&mut self, sx: f32, sy: f32);
    fn ctm_rotate(&mut self, radians: f32);

    fn context_push(&mut self);
    fn context_pop(&mut self);
}

/// Hands out the canvas only when it is bound and supports everything required
pub fn ready<'a>(
    canvas: Option<&'a mut (dyn Canvas + 'a)>,
    required: Capabilities,
) -> Option<&'a mut (dyn Canvas + 'a)> {
    let canvas = match canvas {
        Some(canvas) => canvas,
        None => {
            debug!("No canvas bound");
            return None;
        }
    };
    let missing = required - canvas.capabilities();
    if !missing.is_empty() {
        debug!("Canvas lacks capabilities {:?}", missing);
        return None;
    }
    Some(canvas)
}

mod test {
    #[test]
    fn test_rect_normalize_and_intersect() {
        use super::Rect;

        let rect = Rect::new(10, 20, 12, -9);
        assert_eq!(rect.normalized(), Rect::new(10, 11, 12, 9));
        let clip = Rect::new(0, 0, 16, 16);
        assert_eq!(rect.intersect(&clip), Rect::new(10, 11, 6, 5));
        assert!(Rect::new(0, 0, 4, 4).intersect(&Rect::new(8, 8, 4, 4)).is_empty());
    }

    #[test]
    fn test_color_inversion() {
        use super::Color;

        assert_eq!(Color::White.inverted(), Color::Black);
        assert_eq!(Color::Transparent.inverted(), Color::Transparent);
    }
}
