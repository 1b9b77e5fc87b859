/// Pixel layouts observed on the wire, identified by a 7-character ASCII tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Packed 16-bit 5/6/5 color, two bytes per pixel (`CV_8UC2`).
    ColorPacked16,
    /// Single-channel 8-bit mask (`CV_8UC1` or `CV_8U__`).
    Mask8,
    /// Three-channel 8-bit color (`CV_8UC3`).
    Color24,
    /// Unrecognized tag; carried through so the caller decides whether to render.
    Unknown,
}

impl FrameFormat {
    /// Length of the format tag on the wire.
    pub const TAG_LEN: usize = 7;

    /// Map a wire tag to a format. Unrecognized tags are not an error.
    pub fn from_tag(tag: &[u8]) -> Self {
        match tag {
            b"CV_8UC2" => FrameFormat::ColorPacked16,
            b"CV_8UC1" | b"CV_8U__" => FrameFormat::Mask8,
            b"CV_8UC3" => FrameFormat::Color24,
            _ => FrameFormat::Unknown,
        }
    }

    /// The canonical 7-character tag for this format.
    pub fn tag(&self) -> &'static str {
        match self {
            FrameFormat::ColorPacked16 => "CV_8UC2",
            FrameFormat::Mask8 => "CV_8UC1",
            FrameFormat::Color24 => "CV_8UC3",
            FrameFormat::Unknown => "UNKNOWN",
        }
    }
}

/// Frame geometry and format, decoded from the fixed hex header that follows
/// the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Number of pixel rows
    pub rows: u16,
    /// Number of pixel columns
    pub cols: u16,
    /// Bytes per pixel
    pub channels: u16,
    /// Pixel layout
    pub format: FrameFormat,
}

impl FrameHeader {
    /// Total payload bytes this header declares.
    ///
    /// Kept in u64 so a garbage header cannot overflow the computation on
    /// 32-bit targets; callers cap it before allocating.
    pub fn payload_len(&self) -> u64 {
        self.rows as u64 * self.cols as u64 * self.channels as u64
    }
}

/// A decoded frame exactly as it came off the wire: one byte per hex pair,
/// row-major, then column, then channel.
///
/// Allocated whole by the payload decoder and immutable afterwards; a frame
/// with uninitialized pixels is never observable.
#[derive(Debug, Clone)]
pub struct RawFrame {
    header: FrameHeader,
    data: Vec<u8>,
}

impl RawFrame {
    /// Wrap a fully decoded payload. The buffer length must match the header.
    pub fn new(header: FrameHeader, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len() as u64, header.payload_len());
        Self { header, data }
    }

    /// The header decoded alongside this payload.
    pub fn header(&self) -> FrameHeader {
        self.header
    }

    /// The raw payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// One byte of one channel of one pixel.
    pub fn at(&self, row: usize, col: usize, channel: usize) -> u8 {
        let channels = self.header.channels as usize;
        self.data[(row * self.header.cols as usize + col) * channels + channel]
    }
}

/// A format-normalized frame ready for display and thresholding.
///
/// Ownership moves through the acquisition handoff; downstream stages read
/// it as a snapshot valid until the next frame is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    /// Number of pixel rows
    pub rows: usize,
    /// Number of pixel columns
    pub cols: usize,
    /// Bytes per pixel after normalization
    pub channels: usize,
    /// Pixel layout after normalization
    pub format: FrameFormat,
    /// Pixel data, row-major, then column, then channel
    pub data: Vec<u8>,
}

impl DisplayFrame {
    /// One byte of one channel of one pixel.
    pub fn at(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.data[(row * self.cols + col) * self.channels + channel]
    }

    /// Whether this frame carries three color channels.
    pub fn is_color(&self) -> bool {
        self.channels == 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tags() {
        assert_eq!(FrameFormat::from_tag(b"CV_8UC2"), FrameFormat::ColorPacked16);
        assert_eq!(FrameFormat::from_tag(b"CV_8UC1"), FrameFormat::Mask8);
        assert_eq!(FrameFormat::from_tag(b"CV_8U__"), FrameFormat::Mask8);
        assert_eq!(FrameFormat::from_tag(b"CV_8UC3"), FrameFormat::Color24);
        assert_eq!(FrameFormat::from_tag(b"CV_16SC1"), FrameFormat::Unknown);
        assert_eq!(FrameFormat::from_tag(b""), FrameFormat::Unknown);
    }

    #[test]
    fn test_canonical_tags_round_trip() {
        for format in [
            FrameFormat::ColorPacked16,
            FrameFormat::Mask8,
            FrameFormat::Color24,
            FrameFormat::Unknown,
        ] {
            assert_eq!(format.tag().len(), FrameFormat::TAG_LEN);
            assert_eq!(FrameFormat::from_tag(format.tag().as_bytes()), format);
        }
    }

    #[test]
    fn test_payload_len_no_overflow() {
        let header = FrameHeader {
            rows: u16::MAX,
            cols: u16::MAX,
            channels: u16::MAX,
            format: FrameFormat::Unknown,
        };
        assert_eq!(header.payload_len(), 65535u64 * 65535 * 65535);
    }

    #[test]
    fn test_raw_frame_indexing() {
        let header = FrameHeader {
            rows: 2,
            cols: 3,
            channels: 2,
            format: FrameFormat::ColorPacked16,
        };
        let data: Vec<u8> = (0..12).collect();
        let frame = RawFrame::new(header, data);
        assert_eq!(frame.at(0, 0, 0), 0);
        assert_eq!(frame.at(0, 0, 1), 1);
        assert_eq!(frame.at(0, 2, 1), 5);
        assert_eq!(frame.at(1, 0, 0), 6);
        assert_eq!(frame.at(1, 2, 1), 11);
    }
}
