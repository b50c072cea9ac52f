#[cfg(not(any(test, feature = "std")))]
use micromath::F32Ext;

use super::point::DrawPoint;
use crate::hal::canvas::{ready, Canvas, Capabilities, Color, Point, Rect};
use crate::types::measurement::DEGREE_PER_RAD;

pub const REQUIRED: Capabilities = Capabilities::STROKE
    .union(Capabilities::FILL)
    .union(Capabilities::CLIP)
    .union(Capabilities::TRANSFORM)
    .union(Capabilities::CONTEXT);

const DEADBAND: f32 = 1.0;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DirectionState {
    prev: Option<f32>,
}

impl DirectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bearing in degrees currently on screen
    pub fn last(&self) -> Option<f32> {
        self.prev
    }
}

fn erase_cell(canvas: &mut dyn Canvas, px: i32, py: i32) {
    let metrics = canvas.metrics();
    canvas.set_fill_color(Color::Transparent);
    canvas.fill_rect(Rect::new(px, py, metrics.gw(), metrics.gh()));
}

/// One cell arrow turned by `degrees`, the notch marks its tail
pub fn arrow(canvas: &mut dyn Canvas, point: &DrawPoint, degrees: f32, erase_before: bool) {
    let metrics = canvas.metrics();
    let (px, py) = point.pixels(&metrics);
    let (gw, gh) = (metrics.gw(), metrics.gh());

    canvas.context_push();
    canvas.clip_to_rect(Rect::new(px, py, gw, gh));
    if erase_before {
        erase_cell(canvas, px, py);
    }

    canvas.set_fill_color(Color::White);
    canvas.set_stroke_color(Color::Black);
    canvas.ctm_rotate(-degrees / DEGREE_PER_RAD);
    canvas.ctm_translate((px + gw / 2) as f32, (py + gh / 2) as f32);
    canvas.fill_stroke_triangle(Point::new(0, 6), Point::new(5, -6), Point::new(-5, -6));
    // Notch at the tail
    canvas.set_fill_color(Color::Transparent);
    canvas.fill_stroke_triangle(Point::new(0, -2), Point::new(6, -7), Point::new(-6, -7));
    canvas.move_to_point(6, -7);
    canvas.set_stroke_color(Color::Transparent);
    canvas.stroke_line_to_point(-6, -7);
    canvas.context_pop();
}

/// Redraws the arrow once the bearing moved by a degree or more, `None`
/// clears whatever was drawn
pub fn draw(
    canvas: Option<&mut dyn Canvas>,
    state: &mut DirectionState,
    point: &DrawPoint,
    degrees: Option<f32>,
) {
    let canvas = match ready(canvas, REQUIRED) {
        Some(canvas) => canvas,
        None => return,
    };
    match (state.prev, degrees) {
        (None, None) => (),
        (Some(_), None) => {
            let (px, py) = point.pixels(&canvas.metrics());
            canvas.context_push();
            erase_cell(canvas, px, py);
            canvas.context_pop();
            state.prev = None;
        }
        (Some(prev), Some(degrees)) if (prev - degrees).abs() < DEADBAND => (),
        (prev, Some(degrees)) => {
            arrow(canvas, point, degrees, prev.is_some());
            state.prev = Some(degrees);
        }
    }
}

mod test {
    #[test]
    fn test_arrow_geometry() {
        use super::{draw, DirectionState};
        use crate::drivers::recorder::{Call, Recorder};
        use crate::hal::canvas::{Color, Point, Rect};
        use crate::osd::point::DrawPoint;

        let mut recorder = Recorder::pal();
        let mut state = DirectionState::new();
        let point = DrawPoint::Grid { x: 14, y: 3 };
        draw(Some(&mut recorder), &mut state, &point, Some(0.0));
        let body = [Point::new(0, 6), Point::new(5, -6), Point::new(-5, -6)];
        let notch = [Point::new(0, -2), Point::new(6, -7), Point::new(-6, -7)];
        let expected = std::vec![
            Call::ContextPush,
            Call::ClipToRect(Rect::new(168, 54, 12, 18)),
            Call::FillColor(Color::White),
            Call::StrokeColor(Color::Black),
            Call::CtmRotate(-0.0),
            Call::CtmTranslate(174.0, 63.0),
            Call::FillTriangle(body),
            Call::StrokeTriangle(body),
            Call::FillColor(Color::Transparent),
            Call::FillTriangle(notch),
            Call::StrokeTriangle(notch),
            Call::MoveTo(6, -7),
            Call::StrokeColor(Color::Transparent),
            Call::LineTo(-6, -7),
            Call::ContextPop,
        ];
        assert_eq!(recorder.calls(), &expected[..]);
        assert_eq!(state.last(), Some(0.0));
    }

    #[test]
    fn test_arrow_redraw() {
        use super::{draw, DirectionState};
        use crate::drivers::recorder::{Call, Recorder};
        use crate::hal::canvas::{Color, Rect};
        use crate::osd::point::DrawPoint;

        let mut recorder = Recorder::pal();
        let mut state = DirectionState::new();
        let point = DrawPoint::Pixel { x: 100, y: 50 };
        draw(Some(&mut recorder), &mut state, &point, Some(90.0));
        let count = recorder.count();
        draw(Some(&mut recorder), &mut state, &point, Some(90.5));
        assert_eq!(recorder.count(), count);

        recorder.clear();
        draw(Some(&mut recorder), &mut state, &point, Some(92.0));
        assert_eq!(recorder.calls()[2], Call::FillColor(Color::Transparent));
        assert_eq!(recorder.calls()[3], Call::FillRect(Rect::new(100, 50, 12, 18)));
        assert_eq!(state.last(), Some(92.0));

        recorder.clear();
        draw(Some(&mut recorder), &mut state, &point, None);
        let expected = std::vec![
            Call::ContextPush,
            Call::FillColor(Color::Transparent),
            Call::FillRect(Rect::new(100, 50, 12, 18)),
            Call::ContextPop,
        ];
        assert_eq!(recorder.calls(), &expected[..]);
        assert_eq!(state.last(), None);

        recorder.clear();
        draw(Some(&mut recorder), &mut state, &point, None);
        assert_eq!(recorder.count(), 0);
        assert_eq!(recorder.depth(), 0);
    }
}
