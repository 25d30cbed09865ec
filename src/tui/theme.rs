//! Menu color semantics and glyphs.
//!
//! Centralized so the renderer stays free of styling decisions.
//!
//! Color semantics:
//! - Bold: title
//! - Dim: key hints
//! - Cyan: highlighted row and its pointer
//! - Green: marker for the caller's current value

use crossterm::style::{Color, StyledContent, Stylize};

// ============================================================================
// GLYPHS
// ============================================================================

/// Pointer drawn in front of the highlighted row.
pub const POINTER: &str = "❯";

/// Marker appended to rows flagged as the current value.
pub const CURRENT_MARKER: &str = " ✓";

/// Left indent of every item row.
pub const ITEM_INDENT: &str = "  ";

// ============================================================================
// SEMANTIC STYLES
// ============================================================================

/// Menu title: bold.
pub fn title(text: &str) -> StyledContent<&str> {
    text.bold()
}

/// Key hint line: dark gray.
pub fn hint(text: &str) -> StyledContent<&str> {
    text.with(Color::DarkGrey)
}

/// Highlighted row and pointer: cyan.
pub fn highlight(text: &str) -> StyledContent<&str> {
    text.with(Color::Cyan)
}

/// Current-value marker: green.
pub fn current(text: &str) -> StyledContent<&str> {
    text.with(Color::Green)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::style::Attribute;

    #[test]
    fn semantic_styles_have_expected_colors() {
        assert_eq!(highlight("x").style().foreground_color, Some(Color::Cyan));
        assert_eq!(current("x").style().foreground_color, Some(Color::Green));
        assert_eq!(hint("x").style().foreground_color, Some(Color::DarkGrey));
    }

    #[test]
    fn title_is_bold() {
        assert!(title("x").style().attributes.has(Attribute::Bold));
    }

    #[test]
    fn styles_keep_content() {
        assert_eq!(*highlight("Glass").content(), "Glass");
    }
}
