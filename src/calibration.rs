//! Live-tunable calibration parameters and the shared store that hands them
//! to the pipeline.
//!
//! The pipeline reads a whole-value snapshot at the start of every frame and
//! UI collaborators write through [`CalibrationStore::update`], so an edit
//! landing mid-frame can never tear a read or mix old and new parameters
//! within one frame.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::pipeline::Detection;

/// Largest hue in the 8-bit convention (OpenCV halves degrees to fit a byte).
pub const HUE_MAX: u8 = 179;

/// One HSV color, 8 bits per component, hue in [0, 179].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvColor {
    /// Hue, 0-179
    pub hue: u8,
    /// Saturation, 0-255
    pub saturation: u8,
    /// Value, 0-255
    pub value: u8,
}

impl HsvColor {
    /// Build a color, clamping hue into convention.
    pub fn new(hue: u8, saturation: u8, value: u8) -> Self {
        Self {
            hue: hue.min(HUE_MAX),
            saturation,
            value,
        }
    }
}

/// Inclusive color window for thresholding, serialized with the settings
/// collaborator's key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    /// Lower bound, componentwise inclusive
    #[serde(rename = "thresh_color_min")]
    pub min: HsvColor,
    /// Upper bound, componentwise inclusive
    #[serde(rename = "thresh_color_max")]
    pub max: HsvColor,
}

/// Rectangular blanking margins in pixels, one per frame edge.
///
/// Margins are clamped to the frame extents when applied; oversized or
/// degenerate croppings blank rows or columns rather than overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropSpec {
    /// Rows blanked from the top
    pub top: u16,
    /// Rows blanked from the bottom
    pub bottom: u16,
    /// Columns blanked from the left
    pub left: u16,
    /// Columns blanked from the right
    pub right: u16,
}

/// One detection channel's tunable parameters: color window, cropping, and
/// the minimum bounding-box area that counts as a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSettings {
    /// HSV window a pixel must fall inside
    #[serde(flatten)]
    pub color: ColorRange,
    /// Margins blanked before thresholding
    pub cropping: CropSpec,
    /// Minimum bounding-box area for `found = true`
    pub min_detect_area: u32,
}

/// The horizontal band `[y - radius, y + radius]`, spanning the full frame
/// width, in which a stop line is expected to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopLineCalibration {
    /// Band center row
    pub y: u16,
    /// Band half-height
    pub radius: u16,
}

impl StopLineCalibration {
    /// Inclusive top row of the band, saturating at the frame edge.
    pub fn top(&self) -> u32 {
        self.y.saturating_sub(self.radius) as u32
    }

    /// Inclusive bottom row of the band.
    pub fn bottom(&self) -> u32 {
        self.y as u32 + self.radius as u32
    }
}

/// The recorded "natural" x-position of the outside line, captured on demand
/// during calibration and compared against live detections on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutsideLineData {
    /// Ideal line center column
    pub x: u32,
}

/// Every parameter the pipeline reads per frame: one settings block per
/// detection channel, the stop-line band, and the recorded ideal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationState {
    /// Outside-line channel settings
    #[serde(rename = "outside_thresh")]
    pub outside: ThresholdSettings,
    /// Stop-line channel settings
    #[serde(rename = "stop_thresh")]
    pub stop: ThresholdSettings,
    /// Stop-line detection band
    pub detect_loc: StopLineCalibration,
    /// Recorded ideal outside-line position
    pub outside_line_data: OutsideLineData,
}

impl Default for CalibrationState {
    /// The last known-good tune, as generated into the device firmware.
    fn default() -> Self {
        Self {
            outside: ThresholdSettings {
                color: ColorRange {
                    min: HsvColor { hue: 8, saturation: 0, value: 238 },
                    max: HsvColor { hue: 179, saturation: 255, value: 255 },
                },
                cropping: CropSpec { top: 51, bottom: 0, left: 22, right: 0 },
                min_detect_area: 139,
            },
            stop: ThresholdSettings {
                color: ColorRange {
                    min: HsvColor { hue: 0, saturation: 49, value: 156 },
                    max: HsvColor { hue: 29, saturation: 159, value: 247 },
                },
                cropping: CropSpec { top: 48, bottom: 0, left: 0, right: 0 },
                min_detect_area: 139,
            },
            detect_loc: StopLineCalibration { y: 82, radius: 2 },
            outside_line_data: OutsideLineData { x: 66 },
        }
    }
}

impl CalibrationState {
    /// Clamp any out-of-convention value after an external edit. Today that
    /// is only hue, which trackbar UIs already bound but file edits may not.
    pub fn sanitize(&mut self) {
        for settings in [&mut self.outside, &mut self.stop] {
            settings.color.min.hue = settings.color.min.hue.min(HUE_MAX);
            settings.color.max.hue = settings.color.max.hue.min(HUE_MAX);
        }
    }

    /// Record the largest detected region's center as the ideal position,
    /// whether or not it passed the area gate. Returns false when the frame
    /// carried no region at all.
    pub fn record_outside_line(&mut self, detection: &Detection) -> bool {
        match detection.center_x {
            Some(x) => {
                self.outside_line_data.x = x;
                true
            }
            None => false,
        }
    }
}

/// Shared handle over the calibration state.
///
/// Readers clone a snapshot per frame; writers funnel through [`update`],
/// which sanitizes after every edit. Cloning the store shares the state.
///
/// [`update`]: CalibrationStore::update
#[derive(Debug, Clone, Default)]
pub struct CalibrationStore {
    inner: Arc<RwLock<CalibrationState>>,
}

impl CalibrationStore {
    /// Create a store seeded with `state`.
    pub fn new(state: CalibrationState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// A whole-value snapshot for one frame's processing.
    pub fn snapshot(&self) -> CalibrationState {
        self.inner.read().unwrap().clone()
    }

    /// Apply one edit atomically, then sanitize.
    pub fn update(&self, edit: impl FnOnce(&mut CalibrationState)) {
        let mut state = self.inner.write().unwrap();
        edit(&mut state);
        state.sanitize();
    }
}
