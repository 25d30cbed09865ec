//! Menu state algebra: pure types, zero effects.
//!
//! These types define the whole state space of one menu invocation.
//! The transition function in `update` and the effects loop in `run`
//! both program against them. Nothing here outlives an invocation.

// ============================================================================
// ITEMS
// ============================================================================

/// One selectable row of a menu.
///
/// `value` is the opaque identifier handed back to the caller on confirm.
/// `is_current` only changes how the row is drawn (a fixed marker), never
/// which row is highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub value: String,
    pub is_current: bool,
}

impl MenuItem {
    /// Create an item that is not marked as the current value.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        MenuItem {
            label: label.into(),
            value: value.into(),
            is_current: false,
        }
    }

    /// Mark (or unmark) this item as the caller's current value.
    pub fn current(mut self, is_current: bool) -> Self {
        self.is_current = is_current;
        self
    }
}

// ============================================================================
// KEY EVENTS
// ============================================================================

/// Logical key event, decoded from raw terminal bytes.
///
/// Closed set: anything the decoder does not recognise is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Up,
    Down,
    Enter,
    Escape,
    Space,
    Other,
}

// ============================================================================
// MENU STATE
// ============================================================================

/// Selection state machine.
///
/// `Active` carries the highlighted row. `Confirmed` and `Cancelled` are
/// terminal: once reached, no key changes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    /// Waiting for input with `index` highlighted. Always `< item count`.
    Active { index: usize },
    /// User pressed Enter on `index`.
    Confirmed { index: usize },
    /// User pressed Escape.
    Cancelled,
}

impl MenuState {
    /// Initial state for a menu of `len` items.
    ///
    /// Out-of-range starting indices are clamped to the last row so the
    /// index invariant holds from the first paint.
    pub fn start(initial_index: usize, len: usize) -> Self {
        MenuState::Active {
            index: initial_index.min(len.saturating_sub(1)),
        }
    }

    /// Highlighted row, if the menu is still active.
    pub fn active_index(&self) -> Option<usize> {
        match self {
            MenuState::Active { index } => Some(*index),
            _ => None,
        }
    }
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Result of a pure state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Continue with this state (may equal the previous one).
    State(MenuState),
    /// Run a side effect; selection state is unchanged.
    Effect(Effect),
}

/// Side effect requested by a transition. Only the run loop executes these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Invoke the preview callback with the value of row `index`.
    Preview { index: usize },
}

// ============================================================================
// TESTS
// ============================================================================
