//! Inline menu rendering.
//!
//! The menu occupies a fixed block of lines below the cursor. Every repaint
//! moves the cursor back up over the previous block, clears to the end of
//! the screen and draws again, so the scrollback never fills with stale
//! frames and the screen is never cleared as a whole.
//!
//! Layout of one frame (`5 + items` lines):
//!
//! ```text
//! <blank>
//! Title
//! (hint)
//! <blank>
//!   ❯ highlighted item ✓
//!     other item
//! <blank>
//! ```

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveUp, Show};
use crossterm::queue;
use crossterm::style::{Print, PrintStyledContent};
use crossterm::terminal::{Clear, ClearType};

use super::state::MenuItem;
use super::theme;

/// Lines of chrome around the item rows: blank, title, hint and blank above
/// them, one blank below.
pub const CHROME_LINES: usize = 5;

/// Total lines one frame occupies.
pub fn frame_height(item_count: usize) -> usize {
    CHROME_LINES + item_count
}

/// Paints a menu in place and erases it when done.
#[derive(Debug)]
pub struct MenuRenderer<W: Write> {
    out: W,
    /// Lines emitted by the last paint; zero before the first one.
    painted_lines: usize,
    cursor_hidden: bool,
}

impl<W: Write> MenuRenderer<W> {
    pub fn new(out: W) -> Self {
        MenuRenderer {
            out,
            painted_lines: 0,
            cursor_hidden: false,
        }
    }

    /// Lines the previous paint left on screen.
    #[cfg(test)]
    pub(crate) fn painted_lines(&self) -> usize {
        self.painted_lines
    }

    /// Draw (or redraw) the menu with `highlighted` as the active row.
    pub fn paint(
        &mut self,
        title: &str,
        hint: &str,
        items: &[MenuItem],
        highlighted: usize,
    ) -> io::Result<()> {
        if self.painted_lines > 0 {
            self.queue_erase()?;
        } else if !self.cursor_hidden {
            queue!(self.out, Hide)?;
            self.cursor_hidden = true;
        }

        queue!(
            self.out,
            Print("\n"),
            PrintStyledContent(theme::title(title)),
            Print("\n"),
            PrintStyledContent(theme::hint(hint)),
            Print("\n"),
            Print("\n")
        )?;

        for (i, item) in items.iter().enumerate() {
            self.queue_item(item, i == highlighted)?;
        }

        queue!(self.out, Print("\n"))?;
        self.out.flush()?;

        self.painted_lines = frame_height(items.len());
        Ok(())
    }

    /// Erase the last frame and show the cursor again.
    ///
    /// Afterwards the cursor sits where the first paint started, so the
    /// caller's next output lands on a clean line.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.painted_lines > 0 {
            self.queue_erase()?;
            self.painted_lines = 0;
        }
        if self.cursor_hidden {
            queue!(self.out, Show)?;
            self.cursor_hidden = false;
        }
        self.out.flush()
    }

    #[cfg(test)]
    pub(crate) fn get_ref(&self) -> &W {
        &self.out
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn queue_erase(&mut self) -> io::Result<()> {
        let lines = u16::try_from(self.painted_lines).unwrap_or(u16::MAX);
        queue!(self.out, MoveUp(lines), Clear(ClearType::FromCursorDown))
    }

    fn queue_item(&mut self, item: &MenuItem, highlighted: bool) -> io::Result<()> {
        queue!(self.out, Print(theme::ITEM_INDENT))?;
        if highlighted {
            queue!(
                self.out,
                PrintStyledContent(theme::highlight(theme::POINTER)),
                Print(" "),
                PrintStyledContent(theme::highlight(&item.label))
            )?;
        } else {
            queue!(self.out, Print("  "), Print(&item.label))?;
        }
        if item.is_current {
            queue!(self.out, PrintStyledContent(theme::current(theme::CURRENT_MARKER)))?;
        }
        queue!(self.out, Print("\n"))
    }
}

// ============================================================================
// TESTS
// ============================================================================
