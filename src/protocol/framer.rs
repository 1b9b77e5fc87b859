//! Token synchronization for the raw byte stream.
//!
//! There is no length-prefixed framing on the wire; the only way to find a
//! message boundary is to scan for one of the device's ASCII markers: the
//! frame sentinel or a telemetry keyword. The scan runs a small explicit
//! automaton per marker over the current match length, so a failed partial
//! match re-tests the offending byte instead of discarding it.

use std::io::{ErrorKind, Read};

use super::DecodeError;

/// Frame delimiter the device emits before every header.
pub const SENTINEL: &[u8] = b"START";
/// Marker preceding a device-detected center line position.
const CENTER: &[u8] = b"center";
/// Marker preceding a device-detected solid (outside) line position.
const SOLID: &[u8] = b"solid";

/// Which marker the scan locked onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// The frame sentinel; a header follows.
    FrameStart,
    /// A `center` keyword; a decimal line position follows.
    CenterLine,
    /// A `solid` keyword; a decimal line position follows.
    SolidLine,
}

const MARKERS: [(&[u8], Token); 3] = [
    (SENTINEL, Token::FrameStart),
    (CENTER, Token::CenterLine),
    (SOLID, Token::SolidLine),
];

/// Next match length for `pattern` after reading `byte` with `matched`
/// pattern bytes already consumed.
///
/// On a mismatch, the longest pattern prefix that is still a suffix of the
/// bytes actually seen is recomputed, so a false start like `STARS` leaves
/// the automaton ready to match the `S` it just read.
fn advance(pattern: &[u8], matched: usize, byte: u8) -> usize {
    if byte == pattern[matched] {
        return matched + 1;
    }
    let mut len = matched;
    while len > 0 {
        if pattern[len - 1] == byte && pattern[..len - 1] == pattern[matched - (len - 1)..matched] {
            return len;
        }
        len -= 1;
    }
    0
}

/// Consume bytes until one marker has been read in full, leaving the source
/// positioned at the first byte after it.
///
/// All markers are tracked at once, so a partial match of one never hides
/// another. Bytes are consumed irreversibly. Returns `TruncatedStream` if
/// the source ends first and `Timeout` if a read exceeds the transport's
/// budget; the caller resumes scanning from wherever the stream is on the
/// next call.
pub fn sync_to_token<R: Read>(source: &mut R) -> Result<Token, DecodeError> {
    let mut matched = [0usize; MARKERS.len()];
    let mut byte = [0u8; 1];

    loop {
        match source.read(&mut byte) {
            Ok(0) => return Err(DecodeError::TruncatedStream),
            Ok(_) => {
                for (state, (pattern, token)) in matched.iter_mut().zip(MARKERS) {
                    *state = advance(pattern, *state, byte[0]);
                    if *state == pattern.len() {
                        return Ok(token);
                    }
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(DecodeError::from_io(err)),
        }
    }
}
