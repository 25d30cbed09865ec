//! Terminal restore on terminating signals.
//!
//! `ISIG` stays enabled in raw mode, so Ctrl-C still delivers SIGINT. A
//! signal kills the process without unwinding, which would skip the
//! [`RawMode`](super::terminal::RawMode) drop guard and leave the shell
//! without echo and with a hidden cursor.
//!
//! [`install_signal_handler`] starts a watcher thread. While a real terminal
//! is held in raw mode its original attributes are parked here; when a
//! terminating signal arrives the watcher puts them back, shows the cursor,
//! and then lets the signal's default action kill the process.

use std::io;
use std::os::fd::RawFd;
use std::sync::{Mutex, PoisonError};

use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;

/// Signals that end the process and therefore need the terminal back first.
pub const TERMINATING_SIGNALS: [libc::c_int; 4] = [SIGINT, SIGTERM, SIGHUP, SIGQUIT];

/// Attributes to put back on `fd` if the process is killed.
#[derive(Clone, Copy)]
struct HeldTerminal {
    fd: RawFd,
    original: libc::termios,
}

static HELD: Mutex<Option<HeldTerminal>> = Mutex::new(None);

fn held() -> std::sync::MutexGuard<'static, Option<HeldTerminal>> {
    HELD.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Park the original attributes of `fd` while it is in raw mode.
pub(crate) fn hold(fd: RawFd, original: libc::termios) {
    *held() = Some(HeldTerminal { fd, original });
}

/// Forget the parked attributes of `fd`. Other descriptors are left alone.
pub(crate) fn release(fd: RawFd) {
    let mut slot = held();
    if matches!(*slot, Some(h) if h.fd == fd) {
        *slot = None;
    }
}

/// Whether some terminal is currently parked.
pub fn is_holding() -> bool {
    held().is_some()
}

/// Restore the parked terminal and write a show-cursor sequence to `out_fd`.
///
/// Writes straight to the descriptor: the menu may hold the stdout lock
/// while blocked on a read. Returns `false` if nothing was parked.
pub fn restore_held_terminal(out_fd: RawFd) -> bool {
    let Some(HeldTerminal { fd, original }) = held().take() else {
        return false;
    };

    // SAFETY: original is a valid termios captured by tcgetattr.
    if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &original) } != 0 {
        tracing::warn!(error = %io::Error::last_os_error(), "could not restore terminal after signal");
    }

    let mut show = Vec::new();
    if crossterm::queue!(show, crossterm::cursor::Show).is_ok() {
        // SAFETY: show is a live buffer of show.len() bytes.
        let _ = unsafe { libc::write(out_fd, show.as_ptr().cast(), show.len()) };
    }
    true
}

/// Start the watcher thread for [`TERMINATING_SIGNALS`].
///
/// Call once per process. After restoring the terminal the watcher re-raises
/// the signal with its default disposition, so the exit status still says
/// which signal ended the process.
pub fn install_signal_handler() -> io::Result<()> {
    let mut signals = Signals::new(TERMINATING_SIGNALS)?;

    std::thread::Builder::new()
        .name("terminal-restore".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                let restored = restore_held_terminal(libc::STDOUT_FILENO);
                tracing::info!(signal, restored, "terminated by signal");
                if let Err(e) = signal_hook::low_level::emulate_default_handler(signal) {
                    tracing::error!(error = %e, signal, "could not re-raise signal");
                    std::process::exit(128 + signal);
                }
            }
        })?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::terminal::{LineDiscipline, RawMode, Tty};
    use std::time::Duration;

    /// Tests in this module share the global slot.
    static SERIAL: Mutex<()> = Mutex::new(());

    struct Pty {
        master: RawFd,
        slave: RawFd,
    }

    impl Pty {
        fn open() -> Pty {
            let (mut master, mut slave) = (0, 0);
            // SAFETY: out-pointers are valid; null name/termios/winsize mean defaults.
            let rc = unsafe {
                libc::openpty(
                    &mut master,
                    &mut slave,
                    std::ptr::null_mut(),
                    std::ptr::null(),
                    std::ptr::null(),
                )
            };
            assert_eq!(rc, 0, "openpty failed: {}", io::Error::last_os_error());
            Pty { master, slave }
        }

        /// Everything the far side has written so far.
        fn drain_master(&self) -> String {
            let mut out = Vec::new();
            let mut buf = [0u8; 256];
            loop {
                let mut pfd = libc::pollfd { fd: self.master, events: libc::POLLIN, revents: 0 };
                // SAFETY: pfd is a single valid pollfd.
                if unsafe { libc::poll(&mut pfd, 1, 200) } <= 0 {
                    break;
                }
                // SAFETY: buf is writable for buf.len() bytes.
                let n = unsafe { libc::read(self.master, buf.as_mut_ptr().cast(), buf.len()) };
                if n <= 0 {
                    break;
                }
                out.extend_from_slice(&buf[..n as usize]);
            }
            String::from_utf8_lossy(&out).into_owned()
        }
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            // SAFETY: both descriptors came from openpty.
            unsafe {
                libc::close(self.master);
                libc::close(self.slave);
            }
        }
    }

    fn cooked(attrs: &libc::termios) -> bool {
        attrs.c_lflag & libc::ECHO != 0 && attrs.c_lflag & libc::ICANON != 0
    }

    #[test]
    fn raw_mode_on_real_terminal_is_parked_and_released() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let pty = Pty::open();

        let guard = RawMode::enable(Tty::new(pty.slave));
        assert!(is_holding());
        drop(guard);
        assert!(!is_holding());
        assert!(cooked(&Tty::new(pty.slave).get_attrs().unwrap()));
    }

    #[test]
    fn restore_puts_back_attributes_and_shows_cursor() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let pty = Pty::open();
        let tty = Tty::new(pty.slave);
        assert!(cooked(&tty.get_attrs().unwrap()));

        let guard = RawMode::enable(tty);
        assert!(!cooked(&tty.get_attrs().unwrap()));

        assert!(restore_held_terminal(pty.slave));
        assert!(cooked(&tty.get_attrs().unwrap()));
        assert!(pty.drain_master().contains("\x1b[?25h"));

        // Nothing left for a second signal or for the guard's own release.
        assert!(!restore_held_terminal(pty.slave));
        drop(guard);
    }

    #[test]
    fn release_ignores_other_descriptors() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let pty = Pty::open();
        let attrs = Tty::new(pty.slave).get_attrs().unwrap();

        hold(pty.slave, attrs);
        release(pty.master + 1000);
        assert!(is_holding());
        release(pty.slave);
        assert!(!is_holding());
    }

    #[test]
    fn sigint_in_menu_restores_terminal_before_dying() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let pty = Pty::open();
        let tty = Tty::new(pty.slave);
        assert!(cooked(&tty.get_attrs().unwrap()));

        // SAFETY: the child only touches its own copies of the descriptors and
        // leaves through _exit or the signal.
        let pid = unsafe { libc::fork() };
        assert!(pid >= 0, "fork failed");
        if pid == 0 {
            // SAFETY: dup2 onto stdout so the cursor sequence lands on the pty.
            unsafe { libc::dup2(pty.slave, libc::STDOUT_FILENO) };
            if install_signal_handler().is_err() {
                unsafe { libc::_exit(2) };
            }
            let _raw = RawMode::enable(Tty::new(pty.slave));
            let hide = b"\x1b[?25l";
            // SAFETY: hide is a live buffer; raise targets this process.
            unsafe {
                libc::write(libc::STDOUT_FILENO, hide.as_ptr().cast(), hide.len());
                libc::raise(libc::SIGINT);
            }
            std::thread::sleep(Duration::from_secs(5));
            unsafe { libc::_exit(3) };
        }

        let mut status = 0;
        // SAFETY: pid is our child; status is writable.
        assert_eq!(unsafe { libc::waitpid(pid, &mut status, 0) }, pid);
        assert!(libc::WIFSIGNALED(status), "child exited normally: {}", status);
        assert_eq!(libc::WTERMSIG(status), libc::SIGINT);

        assert!(cooked(&tty.get_attrs().unwrap()));
        let output = pty.drain_master();
        let hidden = output.find("\x1b[?25l").expect("cursor was never hidden");
        let shown = output.rfind("\x1b[?25h").expect("cursor left hidden");
        assert!(shown > hidden);
    }
}
