//! Frame header and pixel payload decoding.
//!
//! The per-frame cost is dominated by the payload (one hex pair per pixel
//! byte), so the whole hex payload is pulled in one batched read and decoded
//! in place; field boundaries are preserved because every field has a fixed
//! width.

use std::io::{ErrorKind, Read};

use crate::models::{FrameFormat, FrameHeader, RawFrame};

use super::{DecodeError, StreamEvent, framer, framer::Token, hex};

/// Upper bound on a declared payload, in decoded bytes.
///
/// The device sends at most 240x240x3; a header declaring more than this is
/// garbage that happened to scan as hex, and the frame is dropped so the
/// sentinel scan can resume.
pub const MAX_PAYLOAD_BYTES: u64 = 1 << 24;

/// Telemetry positions longer than this many decimal digits are garbage
/// that happened to follow a keyword.
const MAX_TELEMETRY_DIGITS: usize = 8;

/// Read the next message off the wire: scan to a marker, then decode the
/// frame or telemetry line that follows it.
pub fn read_event<R: Read>(source: &mut R) -> Result<StreamEvent, DecodeError> {
    match framer::sync_to_token(source)? {
        Token::FrameStart => {
            let header = read_header(source)?;
            Ok(StreamEvent::Frame(read_payload(source, header)?))
        }
        Token::CenterLine => Ok(StreamEvent::Center(read_decimal_line(source)?)),
        Token::SolidLine => Ok(StreamEvent::OutsideLine(read_decimal_line(source)?)),
    }
}

/// Read the next complete frame, discarding telemetry lines along the way.
/// The frame is returned whole or not at all.
pub fn read_frame<R: Read>(source: &mut R) -> Result<RawFrame, DecodeError> {
    loop {
        if let StreamEvent::Frame(frame) = read_event(source)? {
            return Ok(frame);
        }
    }
}

/// Decode the fixed-width header that immediately follows the sentinel:
/// three 4-hex-digit counts and a 7-character format tag.
pub fn read_header<R: Read>(source: &mut R) -> Result<FrameHeader, DecodeError> {
    let mut digits = [0u8; 4];

    read_exact(source, &mut digits)?;
    let rows = hex::decode_u16(&digits, "row count")?;
    read_exact(source, &mut digits)?;
    let cols = hex::decode_u16(&digits, "column count")?;
    read_exact(source, &mut digits)?;
    let channels = hex::decode_u16(&digits, "channel count")?;

    let mut tag = [0u8; FrameFormat::TAG_LEN];
    read_exact(source, &mut tag)?;

    Ok(FrameHeader {
        rows,
        cols,
        channels,
        format: FrameFormat::from_tag(&tag),
    })
}

/// Decode the hex payload declared by `header`.
///
/// Never returns a partially filled frame: any truncation, transport fault,
/// or non-hex byte discards everything read so far.
pub fn read_payload<R: Read>(source: &mut R, header: FrameHeader) -> Result<RawFrame, DecodeError> {
    let declared = header.payload_len();
    if declared > MAX_PAYLOAD_BYTES {
        return Err(DecodeError::MalformedField {
            field: "frame extents",
        });
    }
    let len = declared as usize;

    let mut ascii = vec![0u8; len * 2];
    read_exact(source, &mut ascii)?;

    let mut data = Vec::with_capacity(len);
    for pair in ascii.chunks_exact(2) {
        data.push(hex::decode_byte(&[pair[0], pair[1]], "pixel")?);
    }
    Ok(RawFrame::new(header, data))
}

fn read_exact<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<(), DecodeError> {
    source.read_exact(buf).map_err(DecodeError::from_io)
}

/// Decode the decimal position that follows a telemetry keyword. The value
/// runs to the first non-digit byte, normally the line's `\n`, which is
/// consumed with it. A keyword followed by no digits at all is malformed.
fn read_decimal_line<R: Read>(source: &mut R) -> Result<u32, DecodeError> {
    let mut value = 0u64;
    let mut digits = 0usize;
    let mut byte = [0u8; 1];

    loop {
        match source.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => match byte[0] {
                b'0'..=b'9' => {
                    digits += 1;
                    if digits > MAX_TELEMETRY_DIGITS {
                        return Err(DecodeError::MalformedField {
                            field: "telemetry value",
                        });
                    }
                    value = value * 10 + (byte[0] - b'0') as u64;
                }
                _ => break,
            },
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(DecodeError::from_io(err)),
        }
    }

    if digits == 0 {
        return Err(DecodeError::MalformedField {
            field: "telemetry value",
        });
    }
    Ok(value as u32)
}
