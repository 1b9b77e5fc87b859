//! Fixed-width ASCII hex fields as the device firmware emits them:
//! `%04x` for header counts, `%02x` for pixel bytes.

use super::DecodeError;

#[inline]
fn digit_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Decode a 4-digit big-endian hex field (header counts, 0-65535).
pub fn decode_u16(digits: &[u8; 4], field: &'static str) -> Result<u16, DecodeError> {
    let mut value = 0u16;
    for &digit in digits {
        let v = digit_value(digit).ok_or(DecodeError::MalformedField { field })?;
        value = (value << 4) | v as u16;
    }
    Ok(value)
}

/// Decode one 2-digit hex pair (a pixel byte, 0-255).
pub fn decode_byte(pair: &[u8; 2], field: &'static str) -> Result<u8, DecodeError> {
    let hi = digit_value(pair[0]).ok_or(DecodeError::MalformedField { field })?;
    let lo = digit_value(pair[1]).ok_or(DecodeError::MalformedField { field })?;
    Ok((hi << 4) | lo)
}

/// Encode a count as 4 lowercase hex digits, matching `printf("%04x")`.
pub fn encode_u16(value: u16) -> [u8; 4] {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    [
        DIGITS[(value >> 12) as usize & 0xf],
        DIGITS[(value >> 8) as usize & 0xf],
        DIGITS[(value >> 4) as usize & 0xf],
        DIGITS[value as usize & 0xf],
    ]
}

/// Encode a byte as 2 lowercase hex digits, matching `printf("%02x")`.
pub fn encode_byte(value: u8) -> [u8; 2] {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    [
        DIGITS[(value >> 4) as usize],
        DIGITS[(value & 0xf) as usize],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_round_trip() {
        // Header counts must round-trip exactly over the whole range.
        for value in [0u16, 1, 0x60, 0xff, 0x100, 0x1234, 0xabcd, u16::MAX] {
            let encoded = encode_u16(value);
            assert_eq!(decode_u16(&encoded, "count").unwrap(), value);
        }
    }

    #[test]
    fn test_byte_round_trip_is_identity() {
        for value in 0..=255u8 {
            let encoded = encode_byte(value);
            assert_eq!(decode_byte(&encoded, "pixel").unwrap(), value);
        }
    }

    #[test]
    fn test_decode_accepts_both_cases() {
        assert_eq!(decode_u16(b"ABCD", "count").unwrap(), 0xabcd);
        assert_eq!(decode_u16(b"abcd", "count").unwrap(), 0xabcd);
        assert_eq!(decode_byte(b"fF", "pixel").unwrap(), 0xff);
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert!(matches!(
            decode_u16(b"12g4", "count"),
            Err(DecodeError::MalformedField { field: "count" })
        ));
        assert!(matches!(
            decode_byte(b" 1", "pixel"),
            Err(DecodeError::MalformedField { field: "pixel" })
        ));
    }

    #[test]
    fn test_encode_matches_printf() {
        assert_eq!(&encode_u16(0x60), b"0060");
        assert_eq!(&encode_byte(0x0a), b"0a");
        assert_eq!(&encode_byte(0xff), b"ff");
    }
}
