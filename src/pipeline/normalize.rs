//! Format normalization: unpack wire pixel layouts into 8-bit-per-channel
//! frames the rest of the pipeline can index uniformly.

use crate::models::{DisplayFrame, FrameFormat, RawFrame};

/// Rescale an n-bit color lane to the full 8-bit range.
#[inline]
fn widen(value: u16, bits: u32) -> u8 {
    (value as u32 * 255 / ((1 << bits) - 1)) as u8
}

/// Normalize a decoded frame for display and thresholding.
///
/// Packed 16-bit color expands to three 8-bit channels; every other format
/// is already byte-per-channel and passes through unchanged. A packed-color
/// tag on a header declaring any channel count other than 2 is internally
/// inconsistent and passes through as `Unknown` instead of being unpacked.
pub fn normalize(raw: &RawFrame) -> DisplayFrame {
    let header = raw.header();
    let rows = header.rows as usize;
    let cols = header.cols as usize;

    match header.format {
        FrameFormat::ColorPacked16 if header.channels == 2 => {
            let mut data = Vec::with_capacity(rows * cols * 3);
            for pixel in raw.data().chunks_exact(2) {
                // Big-endian 5/6/5: red in the high bits, blue in the low.
                let packed = u16::from_be_bytes([pixel[0], pixel[1]]);
                data.push(widen((packed >> 11) & 0x1f, 5));
                data.push(widen((packed >> 5) & 0x3f, 6));
                data.push(widen(packed & 0x1f, 5));
            }
            DisplayFrame {
                rows,
                cols,
                channels: 3,
                format: FrameFormat::Color24,
                data,
            }
        }
        format => DisplayFrame {
            rows,
            cols,
            channels: header.channels as usize,
            format: if format == FrameFormat::ColorPacked16 {
                FrameFormat::Unknown
            } else {
                format
            },
            data: raw.data().to_vec(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrameHeader;

    fn packed_frame(pixels: &[u16]) -> RawFrame {
        let header = FrameHeader {
            rows: 1,
            cols: pixels.len() as u16,
            channels: 2,
            format: FrameFormat::ColorPacked16,
        };
        let data = pixels.iter().flat_map(|p| p.to_be_bytes()).collect();
        RawFrame::new(header, data)
    }

    #[test]
    fn test_unpack_565_extremes() {
        // All-ones lanes must widen to exactly 255, all-zeros to 0.
        let frame = normalize(&packed_frame(&[0xffff, 0x0000]));
        assert_eq!(frame.channels, 3);
        assert_eq!(frame.format, FrameFormat::Color24);
        assert_eq!(&frame.data[..3], &[255, 255, 255]);
        assert_eq!(&frame.data[3..], &[0, 0, 0]);
    }

    #[test]
    fn test_unpack_565_lanes() {
        // Pure red, pure green, pure blue at full lane intensity.
        let frame = normalize(&packed_frame(&[0xf800, 0x07e0, 0x001f]));
        assert_eq!(&frame.data[0..3], &[255, 0, 0]);
        assert_eq!(&frame.data[3..6], &[0, 255, 0]);
        assert_eq!(&frame.data[6..9], &[0, 0, 255]);
    }

    #[test]
    fn test_unpack_565_midscale() {
        // red=16/31, green=32/63, blue=8/31
        let frame = normalize(&packed_frame(&[0b10000_100000_01000]));
        assert_eq!(frame.data[0], (16u32 * 255 / 31) as u8);
        assert_eq!(frame.data[1], (32u32 * 255 / 63) as u8);
        assert_eq!(frame.data[2], (8u32 * 255 / 31) as u8);
    }

    #[test]
    fn test_mask_passthrough() {
        let header = FrameHeader {
            rows: 2,
            cols: 2,
            channels: 1,
            format: FrameFormat::Mask8,
        };
        let raw = RawFrame::new(header, vec![0, 255, 7, 0]);
        let frame = normalize(&raw);
        assert_eq!(frame.format, FrameFormat::Mask8);
        assert_eq!(frame.channels, 1);
        assert_eq!(frame.data, vec![0, 255, 7, 0]);
    }

    #[test]
    fn test_packed_tag_with_wrong_channel_count_is_not_unpacked() {
        // The buffer only holds rows*cols*1 bytes; unpacking it as 5/6/5
        // would claim three channels the data cannot back.
        let header = FrameHeader {
            rows: 1,
            cols: 2,
            channels: 1,
            format: FrameFormat::ColorPacked16,
        };
        let raw = RawFrame::new(header, vec![0xaa, 0xbb]);
        let frame = normalize(&raw);
        assert_eq!(frame.format, FrameFormat::Unknown);
        assert_eq!(frame.channels, 1);
        assert_eq!(frame.data, vec![0xaa, 0xbb]);
        assert_eq!(frame.data.len(), frame.rows * frame.cols * frame.channels);
    }

    #[test]
    fn test_color24_passthrough_is_idempotent() {
        let header = FrameHeader {
            rows: 1,
            cols: 2,
            channels: 3,
            format: FrameFormat::Color24,
        };
        let raw = RawFrame::new(header, vec![1, 2, 3, 4, 5, 6]);
        let frame = normalize(&raw);
        assert_eq!(frame.data, raw.data());

        let again = normalize(&RawFrame::new(header, frame.data.clone()));
        assert_eq!(again, frame);
    }
}
