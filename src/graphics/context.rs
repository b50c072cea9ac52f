use heapless::Vec;

use super::transform::Transform;
use crate::hal::canvas::{Color, OutlineType, Rect};

pub const MAX_DEPTH: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GraphicsState {
    pub stroke: Color,
    pub fill: Color,
    pub outline_type: OutlineType,
    pub outline_color: Color,
    pub inverted: bool,
    pub ctm: Transform,
    /// Device space, already intersected with the surface bounds
    pub clip: Rect,
}

impl GraphicsState {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            stroke: Color::White,
            fill: Color::White,
            outline_type: OutlineType::None,
            outline_color: Color::Black,
            inverted: false,
            ctm: Transform::IDENTITY,
            clip: Rect::new(0, 0, width as i32, height as i32),
        }
    }
}

/// Saved graphics states, innermost last.
///
/// Pushes and pops must balance within a render pass, misuse trips a debug
/// assertion and is otherwise ignored.
#[derive(Clone, Debug, Default)]
pub struct StateStack<const N: usize = MAX_DEPTH> {
    states: Vec<GraphicsState, N>,
}

impl<const N: usize> StateStack<N> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.states.len()
    }

    pub fn push(&mut self, state: &GraphicsState) {
        if self.states.push(*state).is_err() {
            debug_assert!(false, "Graphics state stack overflow");
            warn!("Graphics state stack overflow");
        }
    }

    pub fn pop(&mut self) -> Option<GraphicsState> {
        let state = self.states.pop();
        if state.is_none() {
            debug_assert!(false, "Graphics state stack underflow");
            warn!("Graphics state stack underflow");
        }
        state
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

mod test {
    #[test]
    fn test_push_pop_restores_state() {
        use super::{GraphicsState, StateStack};
        use crate::hal::canvas::Color;

        let mut stack: StateStack = StateStack::new();
        let mut state = GraphicsState::new(360, 288);
        state.ctm.translate(3.0, 4.0);
        let saved = state;

        stack.push(&state);
        state.ctm.rotate(1.234);
        state.stroke = Color::Transparent;
        state = stack.pop().unwrap();

        assert_eq!(state, saved);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_unbalanced_pop() {
        use super::StateStack;

        let mut stack: StateStack<2> = StateStack::new();
        stack.pop();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_overflow() {
        use super::{GraphicsState, StateStack};

        let mut stack: StateStack<1> = StateStack::new();
        let state = GraphicsState::new(8, 8);
        stack.push(&state);
        stack.push(&state);
    }
}
