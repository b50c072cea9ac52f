#[cfg(not(any(test, feature = "std")))]
use micromath::F32Ext;

use super::point::DrawPoint;
use super::symbol::{VARIO_DOWN_2A, VARIO_UP_2A};
use super::Pass;
use crate::config::Vario as Config;
use crate::hal::canvas::{ready, BitmapOption, Canvas, Capabilities, Color, Rect};
use crate::types::VerticalSpeed;

pub const REQUIRED: Capabilities =
    Capabilities::CHARACTER.union(Capabilities::CLIP).union(Capabilities::CONTEXT);

/// Vertical speed drawn last, `None` until something is on screen
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VarioState {
    prev: Option<VerticalSpeed>,
}

impl VarioState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<VerticalSpeed> {
        self.prev
    }
}

/// Column of arrow glyphs revealed proportionally to the vertical speed.
///
/// Climbing reveals the upper half of the column from the middle upwards,
/// sinking the lower half downwards. One cell of height is `2 × cm_s_per_arrow`.
fn shape(canvas: &mut dyn Canvas, ex: u8, ey: u8, speed: VerticalSpeed, config: &Config, pass: Pass) {
    let metrics = canvas.metrics();
    let (gw, gh) = (metrics.gw(), metrics.gh());
    let rows = config.rows as i32;
    let arrows = (rows + 1) / 2;
    let scale = config.cm_s_per_arrow.max(1) as f32 * 2.0;
    let limit = arrows * gh;
    let height = ((-speed.0 / scale * gh as f32) as i32).clamp(-limit, limit);

    let (symbol, start, draw_start, step) = if speed.0 > 0.0 {
        let start = (rows as f32 / 2.0).ceil() as i32;
        (VARIO_UP_2A, start, start - 1, -gh)
    } else {
        let start = (rows as f32 / 2.0).floor() as i32;
        (VARIO_DOWN_2A, start, start, gh)
    };

    let x = ex as i32 * gw;
    let y = (start + ey as i32) * gh;
    canvas.context_push();
    canvas.clip_to_rect(Rect::new(x, y, gw, height));
    let mut yy = (draw_start + ey as i32) * gh;
    for _ in 0..arrows {
        match pass {
            Pass::Erase => {
                canvas.draw_character_mask(x, yy, symbol, Color::Transparent, BitmapOption::empty())
            }
            Pass::Draw => canvas.draw_character(x, yy, symbol, BitmapOption::empty()),
        }
        yy += step;
    }
    canvas.context_pop();
}

/// Redraws the vario arrow when the speed moved by at least `cm_s_per_arrow / 20`
pub fn draw(
    canvas: Option<&mut dyn Canvas>,
    state: &mut VarioState,
    point: &DrawPoint,
    speed: VerticalSpeed,
    config: &Config,
) {
    let canvas = match ready(canvas, REQUIRED) {
        Some(canvas) => canvas,
        None => return,
    };
    let deadband = config.cm_s_per_arrow as f32 / 20.0;
    if let Some(prev) = state.prev {
        if (prev.0 - speed.0).abs() < deadband {
            return;
        }
    }

    let (ex, ey) = point.grid(&canvas.metrics());
    trace!("Vario {:?} -> {:?}", state.prev, speed);
    if let Some(prev) = state.prev {
        shape(canvas, ex, ey, prev, config, Pass::Erase);
    }
    shape(canvas, ex, ey, speed, config, Pass::Draw);
    state.prev = Some(speed);
}

mod test {
    #[cfg(test)]
    use std::vec::Vec;

    #[cfg(test)]
    use crate::drivers::recorder::{Call, Recorder};

    #[cfg(test)]
    fn masked(calls: &[Call]) -> Vec<Call> {
        calls.iter().map(|call| call.masked()).collect()
    }

    #[test]
    fn test_vario_layout() {
        use super::{draw, VarioState};
        use crate::config::Vario;
        use crate::drivers::recorder::{Call, Recorder};
        use crate::hal::canvas::{BitmapOption, Rect};
        use crate::osd::point::DrawPoint;
        use crate::osd::symbol::VARIO_UP_2A;
        use crate::types::VerticalSpeed;

        let mut recorder = Recorder::pal();
        let mut state = VarioState::new();
        let point = DrawPoint::Grid { x: 2, y: 1 };
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(150.0), &Vario::DEFAULT);
        let arrow = |y| Call::Characters {
            x: 24,
            y,
            chars: std::vec![VARIO_UP_2A],
            color: None,
            opts: BitmapOption::empty(),
        };
        let expected = std::vec![
            Call::ContextPush,
            Call::ClipToRect(Rect::new(24, 72, 12, -27)),
            arrow(54),
            arrow(36),
            arrow(18),
            Call::ContextPop,
        ];
        assert_eq!(recorder.calls(), &expected[..]);
        assert_eq!(state.last(), Some(VerticalSpeed(150.0)));
    }

    #[test]
    fn test_vario_height_clamped() {
        use super::{draw, VarioState};
        use crate::config::Vario;
        use crate::drivers::recorder::{Call, Recorder};
        use crate::hal::canvas::Rect;
        use crate::osd::point::DrawPoint;
        use crate::types::VerticalSpeed;

        let mut recorder = Recorder::pal();
        let mut state = VarioState::new();
        let point = DrawPoint::Grid { x: 0, y: 0 };
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(-2000.0), &Vario::DEFAULT);
        assert_eq!(recorder.calls()[1], Call::ClipToRect(Rect::new(0, 36, 12, 54)));
    }

    #[test]
    fn test_vario_idempotent() {
        use super::{draw, VarioState};
        use crate::config::Vario;
        use crate::osd::point::DrawPoint;
        use crate::types::VerticalSpeed;

        let mut recorder = Recorder::pal();
        let mut state = VarioState::new();
        let point = DrawPoint::Grid { x: 23, y: 6 };
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(80.0), &Vario::DEFAULT);
        let count = recorder.primitives();
        let snapshot = state;
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(80.0), &Vario::DEFAULT);
        assert_eq!(recorder.primitives(), count);
        assert_eq!(state, snapshot);
        assert_eq!(recorder.depth(), 0);
    }

    #[test]
    fn test_vario_erase_symmetry() {
        use super::{draw, VarioState};
        use crate::config::Vario;
        use crate::hal::canvas::Color;
        use crate::osd::point::DrawPoint;
        use crate::types::VerticalSpeed;

        let point = DrawPoint::Grid { x: 23, y: 6 };
        for &(v0, v1) in &[(120.0, -60.0), (-75.0, 30.0), (10.0, 260.0)] {
            let mut recorder = Recorder::pal();
            let mut state = VarioState::new();
            draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(v0), &Vario::DEFAULT);
            let drawn = masked(recorder.calls());
            recorder.clear();
            draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(v1), &Vario::DEFAULT);
            let erased = &recorder.calls()[..drawn.len()];
            assert_eq!(masked(erased), drawn);
            for call in erased {
                if let Call::Characters { color, .. } = call {
                    assert_eq!(*color, Some(Color::Transparent));
                }
            }
        }
    }

    #[test]
    fn test_vario_deadband() {
        use super::{draw, VarioState};
        use crate::config::Vario;
        use crate::osd::point::DrawPoint;
        use crate::types::VerticalSpeed;

        let config = Vario { cm_s_per_arrow: 40, rows: 5 };
        let point = DrawPoint::Grid { x: 23, y: 6 };
        let mut recorder = Recorder::pal();
        let mut state = VarioState::new();
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(100.0), &config);
        let count = recorder.count();
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(101.9), &config);
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(98.1), &config);
        assert_eq!(recorder.count(), count);
        assert_eq!(state.last(), Some(VerticalSpeed(100.0)));
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(102.0), &config);
        assert!(recorder.count() > count);
        assert_eq!(state.last(), Some(VerticalSpeed(102.0)));
    }

    #[test]
    fn test_vario_without_canvas() {
        use super::{draw, VarioState};
        use crate::config::Vario;
        use crate::hal::canvas::Capabilities;
        use crate::osd::point::DrawPoint;
        use crate::types::VerticalSpeed;

        let point = DrawPoint::Grid { x: 23, y: 6 };
        let mut state = VarioState::new();
        draw(None, &mut state, &point, VerticalSpeed(100.0), &Vario::DEFAULT);
        assert_eq!(state.last(), None);

        let mut recorder = Recorder::pal().with_capabilities(Capabilities::STROKE);
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(100.0), &Vario::DEFAULT);
        assert_eq!(recorder.count(), 0);
        assert_eq!(state.last(), None);

        let capabilities = Capabilities::CHARACTER | Capabilities::CLIP;
        let mut recorder = Recorder::pal().with_capabilities(capabilities);
        draw(Some(&mut recorder), &mut state, &point, VerticalSpeed(100.0), &Vario::DEFAULT);
        assert_eq!(recorder.count(), 0);
        assert_eq!(state.last(), None);
    }
}
