//! Terminal line-discipline control: scoped raw input mode.
//!
//! [`RawMode`] captures the terminal attributes on construction, switches
//! to non-canonical, non-echoing, byte-at-a-time input, and restores the
//! captured attributes exactly once when dropped. Early returns and panic
//! unwinds therefore restore the terminal too.
//!
//! Failures to query or set attributes are logged and otherwise ignored:
//! the menu keeps working in whatever mode the terminal is in.
//!
//! A terminating signal skips the drop guard. For a real terminal the
//! snapshot is also parked with [`signals`](super::signals), whose watcher
//! restores it before the process dies.

use std::io;
use std::os::fd::RawFd;

use super::signals;

// ============================================================================
// LINE DISCIPLINE
// ============================================================================

/// Read/write access to a terminal's attributes.
pub trait LineDiscipline {
    fn get_attrs(&self) -> io::Result<libc::termios>;
    fn set_attrs(&self, attrs: &libc::termios) -> io::Result<()>;

    /// Descriptor to restore from a signal watcher, if this is a real device.
    fn raw_fd(&self) -> Option<RawFd> {
        None
    }
}

/// A terminal device addressed by file descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Tty {
    fd: RawFd,
}

impl Tty {
    pub fn new(fd: RawFd) -> Self {
        Tty { fd }
    }

    pub fn stdin() -> Self {
        Tty::new(libc::STDIN_FILENO)
    }

    /// Whether the descriptor refers to a terminal.
    pub fn is_terminal(&self) -> bool {
        // SAFETY: isatty only inspects the descriptor.
        unsafe { libc::isatty(self.fd) == 1 }
    }
}

impl LineDiscipline for Tty {
    fn get_attrs(&self) -> io::Result<libc::termios> {
        // SAFETY: termios is plain old data; tcgetattr fully initializes it on success.
        let mut attrs: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: attrs is a valid, writable termios.
        if unsafe { libc::tcgetattr(self.fd, &mut attrs) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(attrs)
    }

    fn set_attrs(&self, attrs: &libc::termios) -> io::Result<()> {
        // SAFETY: attrs points to a valid termios for the duration of the call.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, attrs) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Some(self.fd)
    }
}

// ============================================================================
// PURE FUNCTIONS
// ============================================================================

/// Derive raw-input attributes from the originals.
///
/// Clears canonical mode and echo, and makes `read` return as soon as a
/// single byte is available (VMIN = 1, VTIME = 0). Everything else,
/// including output processing and signal keys, is left untouched.
pub fn raw_attrs(original: &libc::termios) -> libc::termios {
    let mut raw = *original;
    raw.c_lflag &= !(libc::ICANON | libc::ECHO);
    raw.c_cc[libc::VMIN] = 1;
    raw.c_cc[libc::VTIME] = 0;
    raw
}

// ============================================================================
// RAW MODE GUARD
// ============================================================================

/// Captured original attributes. Only [`RawMode`] can consume it.
pub struct TerminalModeSnapshot(libc::termios);

impl std::fmt::Debug for TerminalModeSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalModeSnapshot").finish_non_exhaustive()
    }
}

/// Raw input mode for the lifetime of this value.
pub struct RawMode<L: LineDiscipline> {
    discipline: L,
    snapshot: Option<TerminalModeSnapshot>,
}

impl<L: LineDiscipline> RawMode<L> {
    /// Capture the current attributes and switch to raw input.
    ///
    /// If the attributes cannot be read, nothing is changed and nothing will
    /// be restored. If they can be read but not set, the snapshot is still
    /// restored on drop.
    pub fn enable(discipline: L) -> Self {
        let original = match discipline.get_attrs() {
            Ok(attrs) => attrs,
            Err(e) => {
                tracing::warn!(error = %e, "could not read terminal attributes; input stays canonical");
                return RawMode { discipline, snapshot: None };
            }
        };

        if let Some(fd) = discipline.raw_fd() {
            signals::hold(fd, original);
        }
        if let Err(e) = discipline.set_attrs(&raw_attrs(&original)) {
            tracing::warn!(error = %e, "could not enable raw input mode");
        }

        RawMode {
            discipline,
            snapshot: Some(TerminalModeSnapshot(original)),
        }
    }

    /// Whether a snapshot is held and will be restored.
    pub fn is_active(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Restore the captured attributes now. Later calls are no-ops.
    pub fn disable(&mut self) {
        let Some(TerminalModeSnapshot(original)) = self.snapshot.take() else {
            return;
        };
        if let Some(fd) = self.discipline.raw_fd() {
            signals::release(fd);
        }
        if let Err(e) = self.discipline.set_attrs(&original) {
            tracing::warn!(error = %e, "could not restore terminal attributes");
        }
    }
}

impl<L: LineDiscipline> Drop for RawMode<L> {
    fn drop(&mut self) {
        self.disable();
    }
}

impl<L: LineDiscipline> std::fmt::Debug for RawMode<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMode")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
