use std::vec::Vec;

use crate::graphics::Transform;
use crate::hal::canvas::{
    BitmapOption, Canvas, Capabilities, Color, Metrics, OutlineType, Point, Rect,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    StrokeColor(Color),
    FillColor(Color),
    ColorInversion(bool),
    OutlineType(OutlineType),
    OutlineColor(Color),
    Pixel(i32, i32, Color),
    StrokePixel(i32, i32),
    FillPixel(i32, i32),
    ClearRect(Rect),
    ClipToRect(Rect),
    ResetDrawingContext,
    /// `color` is set when the glyphs are painted as a mask
    Characters { x: i32, y: i32, chars: Vec<u16>, color: Option<Color>, opts: BitmapOption },
    MoveTo(i32, i32),
    LineTo(i32, i32),
    StrokeTriangle([Point; 3]),
    FillTriangle([Point; 3]),
    StrokeRect(Rect),
    FillRect(Rect),
    StrokeEllipse(Rect),
    FillEllipse(Rect),
    CtmReset,
    CtmSet(Transform),
    CtmTranslate(f32, f32),
    CtmScale(f32, f32),
    CtmRotate(f32),
    ContextPush,
    ContextPop,
}

impl Call {
    /// Same call with every color replaced, used to compare geometry only
    pub fn masked(&self) -> Call {
        match self {
            Self::StrokeColor(_) => Self::StrokeColor(Color::Black),
            Self::FillColor(_) => Self::FillColor(Color::Black),
            Self::OutlineColor(_) => Self::OutlineColor(Color::Black),
            Self::Pixel(x, y, _) => Self::Pixel(*x, *y, Color::Black),
            Self::Characters { x, y, chars, opts, .. } => {
                Self::Characters { x: *x, y: *y, chars: chars.clone(), color: None, opts: *opts }
            }
            call => call.clone(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        match self {
            Self::Pixel(..) | Self::StrokePixel(..) | Self::FillPixel(..) | Self::ClearRect(_) => true,
            Self::Characters { .. } | Self::LineTo(..) => true,
            Self::StrokeTriangle(_) | Self::FillTriangle(_) => true,
            Self::StrokeRect(_) | Self::FillRect(_) => true,
            Self::StrokeEllipse(_) | Self::FillEllipse(_) => true,
            _ => false,
        }
    }
}

/// Canvas that only logs what it is asked to draw
pub struct Recorder {
    metrics: Metrics,
    capabilities: Capabilities,
    calls: Vec<Call>,
    depth: usize,
}

impl Recorder {
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics, capabilities: Capabilities::all(), calls: Vec::new(), depth: 0 }
    }

    /// Pretends to support only `capabilities`
    pub fn with_capabilities(self, capabilities: Capabilities) -> Self {
        Self { capabilities, ..self }
    }

    /// 360x288 surface of 12x18 cells, i.e. a PAL overlay
    pub fn pal() -> Self {
        Self::new(Metrics {
            width: 360,
            height: 288,
            grid_element_width: 12,
            grid_element_height: 18,
        })
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn count(&self) -> usize {
        self.calls.len()
    }

    pub fn primitives(&self) -> usize {
        self.calls.iter().filter(|call| call.is_primitive()).count()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: Call) {
        self.calls.push(call);
    }
}

impl Canvas for Recorder {
    fn metrics(&self) -> Metrics {
        self.metrics
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.record(Call::StrokeColor(color))
    }

    fn set_fill_color(&mut self, color: Color) {
        self.record(Call::FillColor(color))
    }

    fn set_color_inversion(&mut self, inverted: bool) {
        self.record(Call::ColorInversion(inverted))
    }

    fn set_line_outline_type(&mut self, outline: OutlineType) {
        self.record(Call::OutlineType(outline))
    }

    fn set_line_outline_color(&mut self, color: Color) {
        self.record(Call::OutlineColor(color))
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.record(Call::Pixel(x, y, color))
    }

    fn set_pixel_to_stroke_color(&mut self, x: i32, y: i32) {
        self.record(Call::StrokePixel(x, y))
    }

    fn set_pixel_to_fill_color(&mut self, x: i32, y: i32) {
        self.record(Call::FillPixel(x, y))
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.record(Call::ClearRect(rect))
    }

    fn clip_to_rect(&mut self, rect: Rect) {
        self.record(Call::ClipToRect(rect))
    }

    fn reset_drawing_context(&mut self) {
        self.record(Call::ResetDrawingContext)
    }

    fn draw_characters(&mut self, x: i32, y: i32, chars: &[u16], opts: BitmapOption) {
        self.record(Call::Characters { x, y, chars: chars.to_vec(), color: None, opts })
    }

    fn draw_characters_mask(
        &mut self,
        x: i32,
        y: i32,
        chars: &[u16],
        color: Color,
        opts: BitmapOption,
    ) {
        self.record(Call::Characters { x, y, chars: chars.to_vec(), color: Some(color), opts })
    }

    fn move_to_point(&mut self, x: i32, y: i32) {
        self.record(Call::MoveTo(x, y))
    }

    fn stroke_line_to_point(&mut self, x: i32, y: i32) {
        self.record(Call::LineTo(x, y))
    }

    fn stroke_triangle(&mut self, p1: Point, p2: Point, p3: Point) {
        self.record(Call::StrokeTriangle([p1, p2, p3]))
    }

    fn fill_triangle(&mut self, p1: Point, p2: Point, p3: Point) {
        self.record(Call::FillTriangle([p1, p2, p3]))
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.record(Call::StrokeRect(rect))
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.record(Call::FillRect(rect))
    }

    fn stroke_ellipse_in_rect(&mut self, rect: Rect) {
        self.record(Call::StrokeEllipse(rect))
    }

    fn fill_ellipse_in_rect(&mut self, rect: Rect) {
        self.record(Call::FillEllipse(rect))
    }

    fn ctm_reset(&mut self) {
        self.record(Call::CtmReset)
    }

    fn ctm_set(&mut self, ctm: Transform) {
        self.record(Call::CtmSet(ctm))
    }

    fn ctm_translate(&mut self, tx: f32, ty: f32) {
        self.record(Call::CtmTranslate(tx, ty))
    }

    fn ctm_scale(&mut self, sx: f32, sy: f32) {
        self.record(Call::CtmScale(sx, sy))
    }

    fn ctm_rotate(&mut self, radians: f32) {
        self.record(Call::CtmRotate(radians))
    }

    fn context_push(&mut self) {
        self.depth += 1;
        self.record(Call::ContextPush)
    }

    fn context_pop(&mut self) {
        debug_assert!(self.depth > 0, "Unbalanced context pop");
        self.depth = self.depth.saturating_sub(1);
        self.record(Call::ContextPop)
    }
}

mod test {
    #[test]
    fn test_fill_stroke_order() {
        use super::{Call, Recorder};
        use crate::hal::canvas::{Canvas, Point, Rect};

        let mut recorder = Recorder::pal();
        recorder.fill_stroke_rect(Rect::new(1, 2, 3, 4));
        let (a, b, c) = (Point::new(0, 6), Point::new(5, -6), Point::new(-5, -6));
        recorder.fill_stroke_triangle(a, b, c);
        let expected = std::vec![
            Call::FillRect(Rect::new(1, 2, 3, 4)),
            Call::StrokeRect(Rect::new(1, 2, 3, 4)),
            Call::FillTriangle([a, b, c]),
            Call::StrokeTriangle([a, b, c]),
        ];
        assert_eq!(recorder.calls(), &expected[..]);
        assert_eq!(recorder.primitives(), 4);
    }

    #[test]
    fn test_draw_string() {
        use super::{Call, Recorder};
        use crate::hal::canvas::{BitmapOption, Canvas, Color};

        let mut recorder = Recorder::pal();
        recorder.draw_string_mask(4, 5, "120", Color::Transparent, BitmapOption::empty());
        let expected = Call::Characters {
            x: 4,
            y: 5,
            chars: std::vec![b'1' as u16, b'2' as u16, b'0' as u16],
            color: Some(Color::Transparent),
            opts: BitmapOption::empty(),
        };
        assert_eq!(recorder.calls()[0], expected);
        assert_eq!(recorder.calls()[0].masked(), Call::Characters {
            x: 4,
            y: 5,
            chars: std::vec![b'1' as u16, b'2' as u16, b'0' as u16],
            color: None,
            opts: BitmapOption::empty(),
        });
    }
}
