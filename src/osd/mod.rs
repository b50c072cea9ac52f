//! Differential HUD instruments.
//!
//! Every instrument keeps what it drew last in an explicit state record and
//! only touches the canvas when its input moved enough. A redraw first repeats
//! the previous shape in transparent colours, then draws the new one.

pub mod direction;
pub mod heading;
pub mod horizon;
pub mod point;
pub mod symbol;
pub mod vario;

use core::time::Duration;

use crate::config::OSD;
use crate::hal::canvas::{Canvas, Capabilities};
use crate::sys::jiffies;
use crate::types::FlightState;

pub use direction::DirectionState;
pub use heading::HeadingState;
pub use horizon::HorizonState;
pub use point::DrawPoint;
pub use vario::VarioState;

fn reborrow<'a>(canvas: &'a mut Option<&mut dyn Canvas>) -> Option<&'a mut dyn Canvas> {
    match canvas {
        Some(canvas) => Some(&mut **canvas),
        None => None,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Pass {
    Erase,
    Draw,
}

/// All instruments of one overlay with their render states
#[derive(Copy, Clone, Debug, Default)]
pub struct Overlay {
    config: OSD,
    vario: VarioState,
    horizon: HorizonState,
    heading: HeadingState,
    home: DirectionState,
}

impl Overlay {
    pub fn new(config: &OSD) -> Self {
        Self { config: *config, ..Default::default() }
    }

    pub fn config(&self) -> &OSD {
        &self.config
    }

    /// Forgets everything drawn, e.g. after the display was cleared
    pub fn invalidate(&mut self) {
        *self = Self::new(&self.config);
    }

    pub fn render(&mut self, canvas: Option<&mut dyn Canvas>, state: &FlightState) {
        self.render_at(canvas, state, jiffies::get())
    }

    pub fn render_at(&mut self, mut canvas: Option<&mut dyn Canvas>, state: &FlightState, now: Duration) {
        if let Some(canvas) = reborrow(&mut canvas) {
            if canvas.capabilities().contains(Capabilities::TRANSFORM) {
                canvas.ctm_reset();
            }
        }
        let layout = &self.config.layout;
        horizon::draw_at(
            reborrow(&mut canvas),
            &mut self.horizon,
            layout.horizon.as_ref(),
            state.attitude,
            &self.config.horizon,
            now,
        );
        vario::draw(
            reborrow(&mut canvas),
            &mut self.vario,
            &layout.vario,
            state.vertical_speed,
            &self.config.vario,
        );
        heading::draw(reborrow(&mut canvas), &mut self.heading, &layout.heading, state.heading);
        direction::draw(canvas, &mut self.home, &layout.home, state.home_direction);
    }
}

mod test {
    #[test]
    fn test_overlay_render() {
        use core::time::Duration;

        use super::Overlay;
        use crate::config::OSD;
        use crate::drivers::recorder::{Call, Recorder};
        use crate::types::{Attitude, FlightState, Heading, VerticalSpeed};

        let mut overlay = Overlay::new(&OSD::DEFAULT);
        let mut recorder = Recorder::pal();
        let mut state = FlightState {
            attitude: Attitude::from_degrees(3.0, 10.0),
            vertical_speed: VerticalSpeed(120.0),
            heading: Heading::new(900),
            home_direction: Some(45.0),
        };
        overlay.render_at(Some(&mut recorder), &state, Duration::ZERO);
        assert_eq!(recorder.calls()[0], Call::CtmReset);
        assert_eq!(recorder.depth(), 0);
        let count = recorder.primitives();
        assert!(count > 0);

        recorder.clear();
        overlay.render_at(Some(&mut recorder), &state, Duration::from_millis(20));
        assert_eq!(recorder.calls(), &[Call::CtmReset][..]);

        state.heading = Heading::new(910);
        recorder.clear();
        overlay.render_at(Some(&mut recorder), &state, Duration::from_millis(40));
        assert!(recorder.primitives() > 0);
        assert_eq!(recorder.depth(), 0);
    }

    #[test]
    fn test_overlay_without_canvas() {
        use super::Overlay;
        use crate::config::OSD;
        use crate::types::{FlightState, VerticalSpeed};

        let mut overlay = Overlay::new(&OSD::DEFAULT);
        let state = FlightState { vertical_speed: VerticalSpeed(300.0), ..Default::default() };
        overlay.render(None, &state);
        assert_eq!(overlay.vario.last(), None);
        assert_eq!(overlay.horizon.last(), None);
    }

    #[test]
    fn test_overlay_invalidate() {
        use core::time::Duration;

        use super::Overlay;
        use crate::config::OSD;
        use crate::drivers::recorder::Recorder;
        use crate::types::FlightState;

        let mut overlay = Overlay::new(&OSD::DEFAULT);
        let mut recorder = Recorder::pal();
        let state = FlightState::default();
        overlay.render_at(Some(&mut recorder), &state, Duration::ZERO);
        let count = recorder.count();
        overlay.invalidate();
        assert_eq!(overlay.heading.last(), None);
        overlay.render_at(Some(&mut recorder), &state, Duration::ZERO);
        assert_eq!(recorder.count(), count * 2);
    }
}
