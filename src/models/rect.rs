/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Leftmost column
    pub x: u32,
    /// Topmost row
    pub y: u32,
    /// Width in pixels, always at least 1
    pub width: u32,
    /// Height in pixels, always at least 1
    pub height: u32,
}

impl Rect {
    /// Build a box from inclusive pixel extents.
    pub fn from_extents(min_x: usize, min_y: usize, max_x: usize, max_y: usize) -> Self {
        Self {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        }
    }

    /// Bounding-box area, width times height.
    ///
    /// This is deliberately not a pixel count; detection thresholds are
    /// calibrated against box area.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Horizontal midpoint of the box.
    pub fn center_x(&self) -> u32 {
        self.x + self.width / 2
    }

    /// Last row covered by the box, inclusive.
    pub fn bottom(&self) -> u32 {
        self.y + self.height - 1
    }

    /// Whether the box covers any row in the inclusive band [top, bottom].
    pub fn intersects_rows(&self, top: u32, bottom: u32) -> bool {
        self.y <= bottom && self.bottom() >= top
    }
}
