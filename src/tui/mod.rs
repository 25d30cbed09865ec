//! Interactive single-choice terminal menu.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: pure data types (MenuItem, KeyEvent, MenuState, Transition)
//! - `update`: pure transitions
//! - `input`: raw bytes → key events
//! - `terminal`: scoped raw input mode
//! - `signals`: terminal restore when a signal ends the process
//! - `view`: inline rendering
//! - `theme`: colors and glyphs
//! - `run`: the effects loop tying them together

pub mod input;
pub mod run;
pub mod signals;
pub mod state;
pub mod terminal;
pub mod theme;
pub mod update;
pub mod view;

pub use run::Menu;
pub use state::{KeyEvent, MenuItem};
