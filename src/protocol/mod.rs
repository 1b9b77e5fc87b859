//! The serial frame protocol: marker synchronization, fixed-width ASCII
//! hex fields, whole-frame payload decoding, and telemetry lines.
//!
//! The device delimits each frame with the literal `START`, then sends three
//! 4-hex-digit counts (rows, columns, channels), a 7-character format tag,
//! and `rows * cols * channels` 2-hex-digit pixel bytes. Between frames it
//! also prints its own detection results as `center<N>` and `solid<N>`
//! lines, one decimal position per line.

pub mod decoder;
pub mod framer;
pub mod hex;

use std::io;

use thiserror::Error;

use crate::models::{FrameHeader, RawFrame};

/// One decoded message off the wire: a frame or a telemetry line.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A complete pixel frame.
    Frame(RawFrame),
    /// The x position of the lane center the device itself detected.
    Center(u32),
    /// The x position of the solid outside line the device itself detected.
    OutsideLine(u32),
}

/// Errors raised while reconstructing a frame from the byte stream.
///
/// Every variant is fatal to the current frame only: the acquisition loop
/// drops the frame and resumes scanning for the next sentinel. Only failure
/// to open the transport in the first place is fatal to a session.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The source closed before a complete frame was read.
    #[error("stream closed before a complete frame was read")]
    TruncatedStream,

    /// A fixed-width field contained something other than hex ASCII, or a
    /// header declared an impossible payload.
    #[error("malformed {field} field")]
    MalformedField {
        /// Which wire field was bad
        field: &'static str,
    },

    /// The transport did not produce data within its timeout budget.
    #[error("transport read timed out")]
    Timeout,

    /// A transport-level fault occurred mid-frame.
    #[error("transport fault: {0}")]
    IOFailure(io::Error),
}

impl DecodeError {
    /// Classify a transport error. End-of-stream and timeouts get their own
    /// variants so the acquisition loop can tell them apart from real faults.
    pub(crate) fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::TruncatedStream,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => DecodeError::Timeout,
            _ => DecodeError::IOFailure(err),
        }
    }
}

/// Encode a frame the way the device firmware does: sentinel, `%04x` counts,
/// format tag, then `%02x` per payload byte.
///
/// Used by tests, benches, and tooling to synthesize byte streams that the
/// decoder must reproduce bit-for-bit.
pub fn encode_frame(header: &FrameHeader, payload: &[u8]) -> Vec<u8> {
    debug_assert_eq!(payload.len() as u64, header.payload_len());

    let mut out = Vec::with_capacity(framer::SENTINEL.len() + 19 + payload.len() * 2);
    out.extend_from_slice(framer::SENTINEL);
    out.extend_from_slice(&hex::encode_u16(header.rows));
    out.extend_from_slice(&hex::encode_u16(header.cols));
    out.extend_from_slice(&hex::encode_u16(header.channels));
    out.extend_from_slice(header.format.tag().as_bytes());
    for &byte in payload {
        out.extend_from_slice(&hex::encode_byte(byte));
    }
    out
}
