use core::f32::consts::PI;
use core::fmt::Write;
use core::time::Duration;

#[cfg(not(any(test, feature = "std")))]
use micromath::F32Ext;

use heapless::String;

use super::point::DrawPoint;
use super::Pass;
use crate::config::Horizon as Config;
use crate::hal::canvas::{ready, BitmapOption, Canvas, Capabilities, Color, OutlineType, Rect};
use crate::sys::jiffies;
use crate::types::Attitude;

const PIXELS_PER_DEGREE: f32 = 3.5;
const CROSSHAIR_MARGIN: i32 = 6;
const BORDER_SIZE: i32 = 3;
/// Rungs exist every 10 degrees up to ±180
const MAX_LEVEL: i32 = 18;

pub const REQUIRED: Capabilities = Capabilities::STROKE
    .union(Capabilities::CHARACTER)
    .union(Capabilities::CLIP)
    .union(Capabilities::TRANSFORM)
    .union(Capabilities::CONTEXT)
    .union(Capabilities::OUTLINE);

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HorizonState {
    prev: Option<Attitude>,
    next_draw: Duration,
}

impl HorizonState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Attitude> {
        self.prev
    }

    pub fn next_draw(&self) -> Duration {
        self.next_draw
    }

    fn due(&self, attitude: &Attitude, threshold: f32, now: Duration) -> bool {
        let prev = match self.prev {
            Some(prev) => prev,
            None => return true,
        };
        (prev.pitch - attitude.pitch).abs() > threshold
            || (prev.roll - attitude.roll).abs() > threshold
            || now > self.next_draw
    }
}

fn set_colors(canvas: &mut dyn Canvas, pass: Pass) {
    match pass {
        Pass::Erase => {
            canvas.set_stroke_color(Color::Transparent);
            canvas.set_line_outline_color(Color::Transparent);
        }
        Pass::Draw => {
            canvas.set_stroke_color(Color::White);
            canvas.set_line_outline_color(Color::Black);
        }
    }
}

/// Pitch ladder rung: two horizontal strokes with end ticks pointing towards
/// the horizon
fn level_line(canvas: &mut dyn Canvas, width: i32, pos: i32, margin: i32, pass: Pass) {
    canvas.set_line_outline_type(OutlineType::Bottom);
    set_colors(canvas, pass);

    let yoff = if pos >= 0 { 10 } else { -10 };
    let yc = -pos - 1;
    let sz = width / 2;

    canvas.move_to_point(-sz, yc);
    canvas.stroke_line_to_point(-margin, yc);
    canvas.move_to_point(sz, yc);
    canvas.stroke_line_to_point(margin, yc);

    canvas.set_line_outline_type(OutlineType::Left);
    canvas.move_to_point(-sz, yc);
    canvas.stroke_line_to_point(-sz, yc + yoff);
    canvas.set_line_outline_type(OutlineType::Right);
    canvas.move_to_point(sz, yc);
    canvas.stroke_line_to_point(sz, yc + yoff);
}

fn corners(canvas: &mut dyn Canvas, lx: i32, ty: i32, rx: i32, by: i32) {
    canvas.set_stroke_color(Color::Black);
    for &(x, y, dx, dy) in &[(lx, ty, 1, 1), (rx, ty, -1, 1), (lx, by, 1, -1), (rx, by, -1, -1)] {
        canvas.move_to_point(x, y + dy * BORDER_SIZE);
        canvas.stroke_line_to_point(x, y);
        canvas.stroke_line_to_point(x + dx * BORDER_SIZE, y);
    }
}

fn shapes(
    canvas: &mut dyn Canvas,
    center: (i32, i32),
    attitude: &Attitude,
    config: &Config,
    pass: Pass,
) {
    let metrics = canvas.metrics();
    let (gw, gh) = (metrics.gw(), metrics.gh());
    let width = config.width.max(1) as i32;
    let bar_width = (width - 1) * gw;
    let level_bar_width = (bar_width as f32 * 0.75) as i32;
    let max_width = (width + 1) * gw;
    let max_height = config.height.max(1) as i32 * gh;

    canvas.context_push();

    let lx = center.0 - max_width / 2;
    let ty = center.1 - max_height / 2;
    if pass == Pass::Draw {
        corners(canvas, lx, ty, lx + max_width, ty + max_height);
    }

    canvas.clip_to_rect(Rect::new(lx + 1, ty + 1, max_width - 2, max_height - 2));
    match pass {
        Pass::Erase => {
            canvas.set_stroke_and_fill_color(Color::Transparent);
            canvas.set_line_outline_color(Color::Transparent);
        }
        Pass::Draw => set_colors(canvas, pass),
    }

    // Only the five rungs closest to the current pitch
    let pitch_degrees = attitude.pitch.to_degrees();
    let pitch_center = ((pitch_degrees / 10.0).round() as i32).clamp(-MAX_LEVEL, MAX_LEVEL);
    let pitch_offset = -pitch_degrees * PIXELS_PER_DEGREE;
    let (cx, cy) = (center.0 as f32, center.1 as f32);

    canvas.context_push();
    canvas.ctm_translate(0.0, pitch_offset);
    canvas.ctm_rotate(-attitude.roll);
    canvas.ctm_translate(cx, cy);
    for level in pitch_center - 2..=pitch_center + 2 {
        if level == 0 {
            canvas.set_line_outline_type(OutlineType::Bottom);
            canvas.move_to_point(-bar_width / 2, 0);
            canvas.stroke_line_to_point(-CROSSHAIR_MARGIN, 0);
            canvas.move_to_point(bar_width / 2, 0);
            canvas.stroke_line_to_point(CROSSHAIR_MARGIN, 0);
            continue;
        }
        let pos = (level as f32 * 10.0 * PIXELS_PER_DEGREE) as i32;
        let margin = if level.abs() > 9 { 9 } else { CROSSHAIR_MARGIN };
        level_line(canvas, level_bar_width, -pos, margin, pass);
    }
    canvas.context_pop();

    // Labels live in a half scale frame and only counter-rotate along X
    canvas.context_push();
    canvas.ctm_scale(0.5, 0.5);
    canvas.ctm_translate(cx, cy + pitch_offset);
    let sx = (-attitude.roll).sin();
    let sy = attitude.roll.cos();
    for level in pitch_center - 2..=pitch_center + 2 {
        if level == 0 {
            continue;
        }
        let degrees = level * 10;
        let abs_degrees = degrees.abs();
        let mut label: String<12> = String::new();
        write!(label, "{}", abs_degrees).ok();
        let pos = (degrees as f32 * PIXELS_PER_DEGREE) as i32;
        let char_y = 9 - pos * 2;
        let lcx = ((if abs_degrees >= 100 { -1.5 } else { -1.0 }) * gw as f32) as i32;
        let shift = pitch_offset + pos as f32;
        let px = (lcx as f32 + shift * sx * 2.0) as i32;
        let py = (-char_y as f32 - shift * (1.0 - sy) * 2.0) as i32;
        match pass {
            Pass::Erase => {
                canvas.draw_string_mask(px, py, &label, Color::Transparent, BitmapOption::empty())
            }
            Pass::Draw => canvas.draw_string(px, py, &label, BitmapOption::empty()),
        }
    }
    canvas.context_pop();

    canvas.context_pop();
}

/// Pitch beyond a half turn or non-finite angles would push the ladder
/// arbitrarily far off the canvas
fn usable(attitude: &Attitude) -> bool {
    attitude.pitch.is_finite() && attitude.roll.is_finite() && attitude.pitch.abs() <= PI
}

/// Artificial horizon centred on `point`, or on the canvas when `None`.
///
/// Redraws at most once per `refresh_interval` unless pitch or roll moved by
/// more than `threshold` since the last drawing.
pub fn draw_at(
    canvas: Option<&mut dyn Canvas>,
    state: &mut HorizonState,
    point: Option<&DrawPoint>,
    attitude: Attitude,
    config: &Config,
    now: Duration,
) {
    let canvas = match ready(canvas, REQUIRED) {
        Some(canvas) => canvas,
        None => return,
    };
    if !usable(&attitude) {
        debug!("Horizon skips attitude {:?}", attitude);
        return;
    }
    let threshold = config.threshold as f32 / 1000.0;
    if !state.due(&attitude, threshold, now) {
        return;
    }

    let metrics = canvas.metrics();
    let center = match point {
        Some(point) => point.pixels(&metrics),
        None => (metrics.width as i32 / 2, metrics.height as i32 / 2),
    };
    trace!("Horizon redraw at {:?}", now);
    if let Some(prev) = state.prev {
        shapes(canvas, center, &prev, config, Pass::Erase);
    }
    shapes(canvas, center, &attitude, config, Pass::Draw);
    state.prev = Some(attitude);
    state.next_draw = now + Duration::from_millis(config.refresh_interval as u64);
}

pub fn draw(
    canvas: Option<&mut dyn Canvas>,
    state: &mut HorizonState,
    point: Option<&DrawPoint>,
    attitude: Attitude,
    config: &Config,
) {
    draw_at(canvas, state, point, attitude, config, jiffies::get())
}

mod test {
    #[cfg(test)]
    use core::time::Duration;

    #[cfg(test)]
    use crate::drivers::recorder::{Call, Recorder};

    #[cfg(test)]
    fn redraws(recorder: &Recorder) -> usize {
        recorder.calls().iter().filter(|&call| matches!(call, Call::CtmScale(..))).count()
    }

    #[test]
    fn test_level_labels() {
        use super::{draw_at, HorizonState};
        use crate::config::Horizon;
        use crate::types::Attitude;

        let mut recorder = Recorder::pal();
        let mut state = HorizonState::new();
        let attitude = Attitude::default();
        draw_at(Some(&mut recorder), &mut state, None, attitude, &Horizon::DEFAULT, Duration::ZERO);
        let labels: std::vec::Vec<_> = recorder
            .calls()
            .iter()
            .filter_map(|call| match call {
                Call::Characters { x, y, chars, .. } => Some((*x, *y, chars.len())),
                _ => None,
            })
            .collect();
        // Levels -20, -10, 10 and 20 with the empirical label offsets
        let expected = std::vec![(-12, -149, 2), (-12, -79, 2), (-12, 61, 2), (-12, 131, 2)];
        assert_eq!(labels, expected);
        assert_eq!(recorder.depth(), 0);
    }

    #[test]
    fn test_corners_on_draw_only() {
        use super::{draw_at, HorizonState};
        use crate::config::Horizon;
        use crate::hal::canvas::Color;
        use crate::types::Attitude;

        let mut recorder = Recorder::pal();
        let mut state = HorizonState::new();
        let now = Duration::ZERO;
        draw_at(Some(&mut recorder), &mut state, None, Attitude::default(), &Horizon::DEFAULT, now);
        let black = Call::StrokeColor(Color::Black);
        assert_eq!(recorder.calls()[1], black);
        // 12 x 9 cells centred on a 360x288 canvas
        assert_eq!(recorder.calls()[2], Call::MoveTo(108, 66));
        assert_eq!(recorder.calls()[3], Call::LineTo(108, 63));
        assert_eq!(recorder.calls()[4], Call::LineTo(111, 63));

        recorder.clear();
        let attitude = Attitude::from_degrees(5.0, 0.0);
        draw_at(Some(&mut recorder), &mut state, None, attitude, &Horizon::DEFAULT, now);
        let erase_end = recorder.calls().iter().position(|call| *call == black).unwrap();
        assert!(recorder.calls()[..erase_end]
            .iter()
            .all(|call| !matches!(call, Call::StrokeColor(Color::White))));
        assert_eq!(redraws(&recorder), 2);
        assert_eq!(recorder.depth(), 0);
    }

    #[test]
    fn test_erase_uses_previous_attitude() {
        use super::{draw_at, HorizonState};
        use crate::config::Horizon;
        use crate::types::Attitude;

        let config = Horizon::DEFAULT;
        let first = Attitude::from_degrees(12.0, -20.0);
        let mut recorder = Recorder::pal();
        let mut state = HorizonState::new();
        draw_at(Some(&mut recorder), &mut state, None, first, &config, Duration::ZERO);
        let drawn: std::vec::Vec<Call> = recorder
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::LineTo(..) | Call::MoveTo(..) | Call::CtmRotate(_)))
            .skip(12)
            .cloned()
            .collect();

        recorder.clear();
        let second = Attitude::from_degrees(0.0, 15.0);
        draw_at(Some(&mut recorder), &mut state, None, second, &config, Duration::ZERO);
        let erased: std::vec::Vec<Call> = recorder
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::LineTo(..) | Call::MoveTo(..) | Call::CtmRotate(_)))
            .take(drawn.len())
            .cloned()
            .collect();
        assert_eq!(erased, drawn);
        assert_eq!(state.last(), Some(second));
    }

    #[test]
    fn test_rate_limit() {
        use super::{draw_at, HorizonState};
        use crate::config::Horizon;
        use crate::types::Attitude;

        let config = Horizon::DEFAULT;
        let mut recorder = Recorder::pal();
        let mut state = HorizonState::new();
        let mut draws = 0;
        for tick in 0..250u64 {
            let now = Duration::from_millis(tick * 20);
            let wobble = if tick % 2 == 0 { 0.0 } else { 0.005 };
            let attitude = Attitude::new(wobble, -wobble);
            let before = recorder.count();
            draw_at(Some(&mut recorder), &mut state, None, attitude, &config, now);
            if recorder.count() > before {
                draws += 1;
            }
        }
        // t = 0, 1020, 2040, 3060 and 4080 ms
        assert_eq!(draws, 5);
        assert_eq!(state.next_draw(), Duration::from_millis(5080));
        assert_eq!(recorder.depth(), 0);
    }

    #[test]
    fn test_threshold_forces_redraw() {
        use super::{draw_at, HorizonState};
        use crate::config::Horizon;
        use crate::types::Attitude;

        let config = Horizon::DEFAULT;
        let mut recorder = Recorder::pal();
        let mut state = HorizonState::new();
        let now = Duration::from_millis(100);
        draw_at(Some(&mut recorder), &mut state, None, Attitude::default(), &config, now);
        let count = recorder.count();
        draw_at(Some(&mut recorder), &mut state, None, Attitude::default(), &config, now);
        assert_eq!(recorder.count(), count);
        draw_at(Some(&mut recorder), &mut state, None, Attitude::new(0.0, 0.011), &config, now);
        assert!(recorder.count() > count);
    }

    #[test]
    fn test_horizon_without_capabilities() {
        use super::{draw_at, HorizonState};
        use crate::config::Horizon;
        use crate::hal::canvas::Capabilities;
        use crate::types::Attitude;

        let mut recorder = Recorder::pal().with_capabilities(Capabilities::all() - Capabilities::OUTLINE);
        let mut state = HorizonState::new();
        let now = Duration::ZERO;
        draw_at(Some(&mut recorder), &mut state, None, Attitude::default(), &Horizon::DEFAULT, now);
        assert_eq!(recorder.count(), 0);
        assert_eq!(state, HorizonState::new());
        draw_at(None, &mut state, None, Attitude::default(), &Horizon::DEFAULT, now);
        assert_eq!(state.last(), None);
    }

    #[test]
    fn test_default_clock() {
        use super::{draw, HorizonState};
        use crate::config::Horizon;
        use crate::types::Attitude;

        let mut recorder = Recorder::pal();
        let mut state = HorizonState::new();
        draw(Some(&mut recorder), &mut state, None, Attitude::default(), &Horizon::DEFAULT);
        assert_eq!(state.next_draw(), Duration::from_millis(2000));
    }

    #[test]
    fn test_labels_follow_rungs() {
        use super::{draw_at, HorizonState};
        use crate::config::Horizon;
        use crate::graphics::Transform;
        use crate::types::Attitude;

        let twenty = std::vec![b'2' as u16, b'0' as u16];
        for &roll in &[0.0f32, 30.0, -30.0] {
            let attitude = Attitude::from_degrees(0.0, roll);
            let mut recorder = Recorder::pal();
            let mut state = HorizonState::new();
            let config = Horizon::DEFAULT;
            draw_at(Some(&mut recorder), &mut state, None, attitude, &config, Duration::ZERO);
            let labels: std::vec::Vec<(i32, i32)> = recorder
                .calls()
                .iter()
                .filter_map(|call| match call {
                    Call::Characters { x, y, chars, .. } if *chars == twenty => Some((*x, *y)),
                    _ => None,
                })
                .collect();
            assert_eq!(labels.len(), 2);

            let mut ladder = Transform::IDENTITY;
            ladder.rotate(-attitude.roll);
            ladder.translate(180.0, 144.0);
            let mut text = Transform::scaling(0.5, 0.5);
            text.translate(180.0, 144.0);
            // Rungs of -20 and +20 degrees
            for (&(lx, ly), &rung) in labels.iter().zip([-71.0f32, 69.0].iter()) {
                let (rx, ry) = ladder.apply(0.0, rung);
                let (ax, ay) = text.apply(lx as f32, ly as f32);
                // Centre of two full size glyphs
                let (cx, cy) = (ax + 12.0, ay + 9.0);
                assert!((cx - rx).abs() < 8.0, "roll {}: label x {} rung x {}", roll, cx, rx);
                assert!((cy - ry).abs() < 8.0, "roll {}: label y {} rung y {}", roll, cy, ry);
            }
        }
    }

    #[test]
    fn test_unusable_attitude() {
        use super::{draw_at, HorizonState};
        use crate::config::Horizon;
        use crate::types::Attitude;

        let config = Horizon::DEFAULT;
        let mut recorder = Recorder::pal();
        let mut state = HorizonState::new();
        let attitudes = [
            Attitude::new(f32::INFINITY, 0.0),
            Attitude::new(f32::NAN, 0.0),
            Attitude::new(0.0, f32::NEG_INFINITY),
            Attitude::new(1.0e30, 0.0),
            Attitude::new(-4.0, 0.0),
        ];
        for &attitude in attitudes.iter() {
            draw_at(Some(&mut recorder), &mut state, None, attitude, &config, Duration::ZERO);
            assert_eq!(recorder.count(), 0);
            assert_eq!(state.last(), None);
        }

        let attitude = Attitude::new(3.0, 100.0);
        draw_at(Some(&mut recorder), &mut state, None, attitude, &config, Duration::ZERO);
        assert!(recorder.count() > 0);
        assert_eq!(state.last(), Some(attitude));
        assert_eq!(recorder.depth(), 0);
    }

    #[test]
    fn test_degenerate_size() {
        use super::{draw_at, HorizonState};
        use crate::config::Horizon;
        use crate::hal::canvas::Rect;
        use crate::types::Attitude;

        let config = Horizon { width: 0, height: 0, ..Horizon::DEFAULT };
        let mut recorder = Recorder::pal();
        let mut state = HorizonState::new();
        draw_at(Some(&mut recorder), &mut state, None, Attitude::default(), &config, Duration::ZERO);
        // One cell high, two cells wide
        assert_eq!(recorder.calls()[2], Call::MoveTo(168, 138));
        assert_eq!(recorder.calls()[4], Call::LineTo(171, 135));
        assert!(recorder.calls().contains(&Call::ClipToRect(Rect::new(169, 136, 22, 16))));
    }
}
