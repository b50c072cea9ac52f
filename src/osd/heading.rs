use super::point::DrawPoint;
use super::symbol::*;
use crate::hal::canvas::{ready, BitmapOption, Canvas, Capabilities, Color, Point, Rect};
use crate::types::measurement::DECIDEGREES_PER_CIRCLE;
use crate::types::Heading;

/// Visible glyphs
pub const WIDTH: usize = 9;
pub const DECIDEGREES_PER_CHAR: usize = 225;

#[rustfmt::skip]
const GRAPH: [u16; 26] = [
    HEADING_W, HEADING_LINE, HEADING_DIVIDED_LINE, HEADING_LINE,
    HEADING_N, HEADING_LINE, HEADING_DIVIDED_LINE, HEADING_LINE,
    HEADING_E, HEADING_LINE, HEADING_DIVIDED_LINE, HEADING_LINE,
    HEADING_S, HEADING_LINE, HEADING_DIVIDED_LINE, HEADING_LINE,
    HEADING_W, HEADING_LINE, HEADING_DIVIDED_LINE, HEADING_LINE,
    HEADING_N, HEADING_LINE, HEADING_DIVIDED_LINE, HEADING_LINE,
    HEADING_E, HEADING_LINE,
];

const MAX_INDEX: usize = (DECIDEGREES_PER_CIRCLE as usize - 1) / DECIDEGREES_PER_CHAR;

// One extra glyph scrolls in while the strip is between two characters
const _: () = assert!(GRAPH.len() > MAX_INDEX + WIDTH + 1, "Heading graph too short");

pub const REQUIRED: Capabilities = Capabilities::CHARACTER
    .union(Capabilities::CLIP)
    .union(Capabilities::FILL)
    .union(Capabilities::STROKE)
    .union(Capabilities::CONTEXT);

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HeadingState {
    prev: Option<Heading>,
}

impl HeadingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Heading> {
        self.prev
    }
}

/// Table slice and pixel offset of the strip for a heading
pub(crate) fn window(heading: Heading, grid_element_width: i32) -> (&'static [u16], i32) {
    let decidegrees = heading.decidegrees() as usize;
    let index = decidegrees / DECIDEGREES_PER_CHAR;
    let remainder = (decidegrees % DECIDEGREES_PER_CHAR) as i32;
    let offset = remainder * grid_element_width / DECIDEGREES_PER_CHAR as i32;
    (&GRAPH[index..index + WIDTH + 1], offset)
}

/// Scrolling compass strip with a fixed marker at its centre.
///
/// Glyphs are stamped with `ERASE_TRANSPARENT` so the previous strip needs no
/// separate erase pass.
pub fn draw(canvas: Option<&mut dyn Canvas>, state: &mut HeadingState, point: &DrawPoint, heading: Heading) {
    let canvas = match ready(canvas, REQUIRED) {
        Some(canvas) => canvas,
        None => return,
    };
    if state.prev == Some(heading) {
        return;
    }

    let metrics = canvas.metrics();
    let (px, py) = point.pixels(&metrics);
    let rw = WIDTH as i32 * metrics.gw();
    let rh = metrics.gh();
    let (glyphs, offset) = window(heading, metrics.gw());

    canvas.context_push();
    canvas.clip_to_rect(Rect::new(px, py, rw, rh));
    // Fonts put the centre arrow at 5px of a 12px cell
    canvas.draw_characters(px - offset + 1, py, glyphs, BitmapOption::ERASE_TRANSPARENT);

    canvas.set_stroke_color(Color::Black);
    canvas.set_fill_color(Color::White);
    let rmx = px + rw / 2;
    canvas.fill_stroke_triangle(
        Point::new(rmx - 2, py - 1),
        Point::new(rmx + 2, py - 1),
        Point::new(rmx, py + 1),
    );
    canvas.context_pop();
    state.prev = Some(heading);
}

mod test {
    #[test]
    fn test_window_in_bounds() {
        use super::{window, DECIDEGREES_PER_CHAR, GRAPH, WIDTH};
        use crate::types::Heading;

        for decidegrees in 0..3600 {
            let index = decidegrees as usize / DECIDEGREES_PER_CHAR;
            assert!(index + WIDTH <= GRAPH.len() - 1);
            let (glyphs, offset) = window(Heading::new(decidegrees), 12);
            assert_eq!(glyphs.len(), WIDTH + 1);
            assert!(offset >= 0 && offset < 12);
        }
    }

    #[test]
    fn test_window() {
        use super::window;
        use crate::osd::symbol::*;
        use crate::types::Heading;

        let (glyphs, offset) = window(Heading::new(0), 12);
        assert_eq!(glyphs[0], HEADING_W);
        assert_eq!(glyphs[4], HEADING_N);
        assert_eq!(offset, 0);

        // 90 degrees puts E at the centre cell
        let (glyphs, offset) = window(Heading::new(900), 12);
        assert_eq!(glyphs[4], HEADING_E);
        assert_eq!(offset, 0);

        let (glyphs, offset) = window(Heading::new(3599), 12);
        assert_eq!(glyphs[0], HEADING_LINE);
        assert_eq!(offset, 11);
    }

    #[test]
    fn test_heading_draw() {
        use super::{draw, HeadingState};
        use crate::drivers::recorder::{Call, Recorder};
        use crate::hal::canvas::{BitmapOption, Color, Point, Rect};
        use crate::osd::point::DrawPoint;
        use crate::osd::symbol::*;
        use crate::types::Heading;

        let mut recorder = Recorder::pal();
        let mut state = HeadingState::new();
        let point = DrawPoint::Grid { x: 10, y: 1 };
        draw(Some(&mut recorder), &mut state, &point, Heading::new(1012));
        let chars = std::vec![
            HEADING_N,
            HEADING_LINE,
            HEADING_DIVIDED_LINE,
            HEADING_LINE,
            HEADING_E,
            HEADING_LINE,
            HEADING_DIVIDED_LINE,
            HEADING_LINE,
            HEADING_S,
            HEADING_LINE,
        ];
        let expected = std::vec![
            Call::ContextPush,
            Call::ClipToRect(Rect::new(120, 18, 108, 18)),
            Call::Characters {
                x: 116,
                y: 18,
                chars,
                color: None,
                opts: BitmapOption::ERASE_TRANSPARENT
            },
            Call::StrokeColor(Color::Black),
            Call::FillColor(Color::White),
            Call::FillTriangle([Point::new(172, 17), Point::new(176, 17), Point::new(174, 19)]),
            Call::StrokeTriangle([Point::new(172, 17), Point::new(176, 17), Point::new(174, 19)]),
            Call::ContextPop,
        ];
        assert_eq!(recorder.calls(), &expected[..]);
    }

    #[test]
    fn test_heading_idempotent() {
        use super::{draw, HeadingState};
        use crate::drivers::recorder::Recorder;
        use crate::osd::point::DrawPoint;
        use crate::types::Heading;

        let mut recorder = Recorder::pal();
        let mut state = HeadingState::new();
        let point = DrawPoint::Grid { x: 10, y: 1 };
        draw(Some(&mut recorder), &mut state, &point, Heading::new(450));
        let count = recorder.primitives();
        draw(Some(&mut recorder), &mut state, &point, Heading::new(450));
        assert_eq!(recorder.primitives(), count);
        draw(Some(&mut recorder), &mut state, &point, Heading::new(451));
        assert!(recorder.primitives() > count);
        assert_eq!(state.last(), Some(Heading::new(451)));
        assert_eq!(recorder.depth(), 0);
    }

    #[test]
    fn test_heading_without_context() {
        use super::{draw, HeadingState};
        use crate::drivers::recorder::Recorder;
        use crate::hal::canvas::Capabilities;
        use crate::osd::point::DrawPoint;
        use crate::types::Heading;

        let point = DrawPoint::Grid { x: 10, y: 1 };
        let mut state = HeadingState::new();
        let capabilities = Capabilities::all() - Capabilities::CONTEXT;
        let mut recorder = Recorder::pal().with_capabilities(capabilities);
        draw(Some(&mut recorder), &mut state, &point, Heading::new(450));
        assert_eq!(recorder.count(), 0);
        assert_eq!(state.last(), None);

        draw(None, &mut state, &point, Heading::new(450));
        assert_eq!(state.last(), None);
    }
}
