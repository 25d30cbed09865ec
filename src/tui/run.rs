//! Menu effects boundary: raw mode, read-decode-update-render loop.
//!
//! This is the only part of the menu with side effects. It wires the pure
//! layers (state, update) to the terminal through the decoder, renderer and
//! raw-mode guard. Single-threaded: each key read blocks the caller.

use std::io::{self, Write};
use std::time::Duration;

use super::input::{ByteSource, DEFAULT_ESCAPE_TIMEOUT, FdSource, KeyDecoder};
use super::state::{Effect, MenuItem, MenuState, Transition};
use super::terminal::{LineDiscipline, RawMode, Tty};
use super::update::update;
use super::view::MenuRenderer;

/// Hint shown under the title.
pub const DEFAULT_HINT: &str = "(↑/↓ navigate, Enter select, Esc back)";

/// Hint shown when Space previews the highlighted item.
pub const PREVIEW_HINT: &str = "(↑/↓ navigate, Space preview, Enter select, Esc back)";

/// Callback run on Space with the highlighted item's value.
pub type PreviewFn<'a> = Box<dyn FnMut(&str) + 'a>;

// ============================================================================
// MENU
// ============================================================================

/// One interactive single-choice menu.
///
/// Built by the caller, consumed by [`Menu::run`]. Returns the chosen item's
/// value, or `None` if the user pressed Escape.
pub struct Menu<'a> {
    title: String,
    hint: Option<String>,
    items: Vec<MenuItem>,
    initial_index: usize,
    escape_timeout: Duration,
    preview: Option<PreviewFn<'a>>,
}

impl<'a> Menu<'a> {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Menu {
            title: title.into(),
            hint: None,
            items,
            initial_index: 0,
            escape_timeout: DEFAULT_ESCAPE_TIMEOUT,
            preview: None,
        }
    }

    /// Row highlighted when the menu opens.
    pub fn initial_index(mut self, index: usize) -> Self {
        self.initial_index = index;
        self
    }

    /// Replace the default key hint.
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// How long to wait for the rest of an arrow-key escape sequence.
    pub fn escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    /// Run `preview` with the highlighted value whenever Space is pressed.
    pub fn on_preview(mut self, preview: impl FnMut(&str) + 'a) -> Self {
        self.preview = Some(Box::new(preview));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn highlighted_on_open(&self) -> usize {
        MenuState::start(self.initial_index, self.items.len())
            .active_index()
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// The hint line actually drawn.
    pub fn hint_text(&self) -> &str {
        match (&self.hint, self.preview.is_some()) {
            (Some(hint), _) => hint,
            (None, true) => PREVIEW_HINT,
            (None, false) => DEFAULT_HINT,
        }
    }

    /// Invoke the preview callback directly, as Space would.
    pub(crate) fn preview(&mut self, value: &str) {
        if let Some(preview) = self.preview.as_mut() {
            preview(value);
        }
    }

    /// Run the menu on the controlling terminal (stdin/stdout).
    pub fn run(self) -> Option<String> {
        let stdout = io::stdout();
        self.run_with(Tty::stdin(), FdSource::stdin(), stdout.lock())
    }

    /// Run the menu against explicit terminal collaborators.
    ///
    /// Raw mode is held for exactly the duration of this call; the frame is
    /// erased and the cursor shown before the terminal mode is restored.
    pub fn run_with<L, S, W>(mut self, discipline: L, source: S, out: W) -> Option<String>
    where
        L: LineDiscipline,
        S: ByteSource,
        W: Write,
    {
        let len = self.items.len();
        if len == 0 {
            tracing::warn!(title = %self.title, "menu opened with no items");
            return None;
        }

        let _raw = RawMode::enable(discipline);
        let mut decoder = KeyDecoder::new(source).with_escape_timeout(self.escape_timeout);
        let mut renderer = MenuRenderer::new(out);

        let mut state = MenuState::start(self.initial_index, len);
        let mut highlighted = state.active_index().unwrap_or(0);
        self.paint(&mut renderer, highlighted);

        let outcome = loop {
            let key = decoder.next_key();
            match update(state, key, len) {
                Transition::State(MenuState::Active { index }) => {
                    if index != highlighted {
                        highlighted = index;
                        self.paint(&mut renderer, highlighted);
                    }
                    state = MenuState::Active { index };
                }
                Transition::State(MenuState::Confirmed { index }) => {
                    break Some(self.items[index].value.clone());
                }
                Transition::State(MenuState::Cancelled) => break None,
                Transition::Effect(Effect::Preview { index }) => {
                    let value = self.items[index].value.clone();
                    tracing::debug!(value = %value, "preview");
                    self.preview(&value);
                }
            }
        };

        if let Err(e) = renderer.finish() {
            tracing::warn!(error = %e, "could not erase menu");
        }
        tracing::debug!(title = %self.title, selected = ?outcome, "menu closed");
        outcome
    }

    fn paint<W: Write>(&self, renderer: &mut MenuRenderer<W>, highlighted: usize) {
        if let Err(e) = renderer.paint(&self.title, self.hint_text(), &self.items, highlighted) {
            tracing::warn!(error = %e, "could not paint menu");
        }
    }
}

impl std::fmt::Debug for Menu<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("title", &self.title)
            .field("items", &self.items)
            .field("initial_index", &self.initial_index)
            .field("escape_timeout", &self.escape_timeout)
            .field("preview", &self.preview.is_some())
            .finish()
    }
}

// ============================================================================
// PANIC SAFETY
// ============================================================================

/// Install a panic hook that shows the cursor before printing the panic.
///
/// Terminal attributes are restored by the raw-mode guard during unwinding;
/// the hook only covers the hidden cursor, which the panic message would
/// otherwise be printed under.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
        original_hook(panic_info);
    }));
}

// ============================================================================
// TESTS
// ============================================================================
