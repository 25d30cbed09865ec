//! Pure state transitions: (MenuState, KeyEvent) → Transition.
//!
//! Fully testable without a terminal. Terminal states absorb every key.

use super::state::{Effect, KeyEvent, MenuState, Transition};

/// Pure state transition function for a menu of `len` items.
///
/// Up and Down wrap around, so the active index never leaves `[0, len)`.
pub fn update(state: MenuState, key: KeyEvent, len: usize) -> Transition {
    let index = match state {
        MenuState::Active { index } if len > 0 => index,
        _ => return Transition::State(state),
    };

    match key {
        KeyEvent::Up => Transition::State(MenuState::Active {
            index: (index + len - 1) % len,
        }),
        KeyEvent::Down => Transition::State(MenuState::Active {
            index: (index + 1) % len,
        }),
        KeyEvent::Space => Transition::Effect(Effect::Preview { index }),
        KeyEvent::Enter => Transition::State(MenuState::Confirmed { index }),
        KeyEvent::Escape => Transition::State(MenuState::Cancelled),
        KeyEvent::Other => Transition::State(state),
    }
}

// ============================================================================
// TESTS
// ============================================================================
