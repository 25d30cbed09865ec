//! Raw byte input and key decoding.
//!
//! Reads one byte at a time from the terminal and maps it to a [`KeyEvent`].
//! The only subtle part is ESC: a lone Escape keypress and the start of an
//! arrow-key sequence (`ESC [ A`) begin with the same byte. The decoder
//! waits a short, bounded time for continuation bytes; if none arrive the
//! byte is a lone Escape.
//!
//! Structure:
//! - `ByteSource`: blocking read + "readable within timeout" primitive
//! - `FdSource`: `read(2)` / `poll(2)` on a file descriptor
//! - `KeyDecoder`: byte stream → key events

use std::os::fd::RawFd;
use std::time::Duration;

use super::state::KeyEvent;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default wait for escape-sequence continuation bytes.
///
/// Tuned for local terminal emulators, which deliver `ESC [ A` in one burst.
/// Slow links (remote sessions) may need more.
pub const DEFAULT_ESCAPE_TIMEOUT: Duration = Duration::from_millis(50);

const BYTE_ESC: u8 = 0x1B;
const BYTE_LF: u8 = 0x0A;
const BYTE_CR: u8 = 0x0D;
const BYTE_SPACE: u8 = 0x20;
const BYTE_CSI_OPEN: u8 = b'[';
const BYTE_ARROW_UP: u8 = b'A';
const BYTE_ARROW_DOWN: u8 = b'B';

// ============================================================================
// BYTE SOURCE
// ============================================================================

/// Minimal input device interface the decoder needs.
pub trait ByteSource {
    /// Block until one byte is read. `None` on EOF, error or short read.
    fn read_byte(&mut self) -> Option<u8>;

    /// Whether a byte becomes readable within `timeout`.
    fn wait_readable(&mut self, timeout: Duration) -> bool;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn wait_readable(&mut self, timeout: Duration) -> bool {
        (**self).wait_readable(timeout)
    }
}

/// Byte source backed by a raw file descriptor (normally stdin).
#[derive(Debug, Clone, Copy)]
pub struct FdSource {
    fd: RawFd,
}

impl FdSource {
    pub fn new(fd: RawFd) -> Self {
        FdSource { fd }
    }

    pub fn stdin() -> Self {
        FdSource::new(libc::STDIN_FILENO)
    }
}

impl ByteSource for FdSource {
    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        // SAFETY: buf is a valid, writable 1-byte buffer for the whole call.
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), 1) };
        (n == 1).then_some(buf[0])
    }

    fn wait_readable(&mut self, timeout: Duration) -> bool {
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let millis = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        // SAFETY: pfd points to exactly one initialized pollfd.
        let ready = unsafe { libc::poll(&mut pfd, 1, millis) };
        ready > 0 && pfd.revents & libc::POLLIN != 0
    }
}

// ============================================================================
// DECODER
// ============================================================================

/// Turns a blocking byte stream into [`KeyEvent`]s.
#[derive(Debug)]
pub struct KeyDecoder<S> {
    source: S,
    escape_timeout: Duration,
}

impl<S: ByteSource> KeyDecoder<S> {
    pub fn new(source: S) -> Self {
        KeyDecoder {
            source,
            escape_timeout: DEFAULT_ESCAPE_TIMEOUT,
        }
    }

    /// Override how long to wait for each escape-sequence continuation byte.
    pub fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    pub fn escape_timeout(&self) -> Duration {
        self.escape_timeout
    }

    /// Block until the next key event.
    ///
    /// Never fails: read anomalies come back as [`KeyEvent::Other`].
    pub fn next_key(&mut self) -> KeyEvent {
        match self.source.read_byte() {
            Some(BYTE_LF | BYTE_CR) => KeyEvent::Enter,
            Some(BYTE_SPACE) => KeyEvent::Space,
            Some(BYTE_ESC) => self.decode_escape(),
            Some(_) | None => KeyEvent::Other,
        }
    }

    /// Resolve what follows an ESC byte that has already been consumed.
    fn decode_escape(&mut self) -> KeyEvent {
        let Some(second) = self.continuation_byte() else {
            return KeyEvent::Escape;
        };
        if second != Some(BYTE_CSI_OPEN) {
            tracing::trace!(byte = ?second, "unrecognised escape sequence start");
            return KeyEvent::Other;
        }

        match self.continuation_byte() {
            None => KeyEvent::Escape,
            Some(Some(BYTE_ARROW_UP)) => KeyEvent::Up,
            Some(Some(BYTE_ARROW_DOWN)) => KeyEvent::Down,
            Some(final_byte) => {
                tracing::trace!(byte = ?final_byte, "ignoring CSI sequence");
                KeyEvent::Other
            }
        }
    }

    /// Wait for one more byte of an escape sequence.
    ///
    /// Outer `None`: nothing arrived within the timeout.
    /// Inner `None`: something was readable but the read failed.
    fn continuation_byte(&mut self) -> Option<Option<u8>> {
        if !self.source.wait_readable(self.escape_timeout) {
            return None;
        }
        Some(self.source.read_byte())
    }

    #[cfg(test)]
    pub(crate) fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> S {
        self.source
    }
}

// ============================================================================
// TESTS
// ============================================================================
