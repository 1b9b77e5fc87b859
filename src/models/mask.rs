/// Single-channel binary image produced by the threshold stage.
///
/// Foreground pixels are 255 and background 0, matching the 8-bit mask
/// frames the device itself emits, so a mask can be displayed directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Mask {
    /// Byte value of a set pixel.
    pub const FOREGROUND: u8 = 255;

    /// Create a cleared mask with the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Mask width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the pixel at (x, y) is foreground. Out of bounds reads false.
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y * self.width + x] != 0
    }

    /// Set or clear the pixel at (x, y). Out of bounds is ignored.
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y * self.width + x] = if value { Self::FOREGROUND } else { 0 };
    }

    /// Number of foreground pixels.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&b| b != 0).count()
    }

    /// Whether no pixel is set.
    pub fn is_clear(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Clear every pixel.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Raw pixel bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel bytes for row-parallel fills.
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_set_get() {
        let mut mask = Mask::new(8, 6);
        assert_eq!(mask.width(), 8);
        assert_eq!(mask.height(), 6);
        assert!(mask.is_clear());

        mask.set(3, 4, true);
        assert!(mask.get(3, 4));
        assert!(!mask.get(4, 3));
        assert_eq!(mask.count_set(), 1);
        assert_eq!(mask.as_bytes()[4 * 8 + 3], Mask::FOREGROUND);

        mask.set(3, 4, false);
        assert!(mask.is_clear());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut mask = Mask::new(4, 4);
        mask.set(10, 10, true); // Should not panic
        assert!(!mask.get(10, 10));
        assert!(mask.is_clear());
    }

    #[test]
    fn test_clear() {
        let mut mask = Mask::new(4, 4);
        mask.set(0, 0, true);
        mask.set(3, 3, true);
        mask.clear();
        assert!(mask.is_clear());
    }
}
