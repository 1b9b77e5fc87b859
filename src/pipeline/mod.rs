//! The per-frame processing pipeline: acquisition, normalization, crop and
//! HSV thresholding, and region detection.
//!
//! Stages after acquisition are pure functions of one frame and one
//! calibration snapshot; [`analyze`] composes them into the full per-frame
//! result.

pub mod acquisition;
pub mod detect;
pub mod normalize;
pub mod threshold;

pub use acquisition::{FrameReceiver, Telemetry, spawn_frame_reader};
pub use detect::{Detection, classify_largest, classify_stop_band, find_regions};
pub use normalize::normalize;
pub use threshold::{rgb_to_hsv, threshold_mask};

use crate::calibration::CalibrationState;
use crate::models::{DisplayFrame, Mask};

/// Everything the pipeline produces for one frame, valid until the next one.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    /// The normalized frame the analysis ran over
    pub frame: DisplayFrame,
    /// Outside-line channel mask
    pub outside_mask: Mask,
    /// Stop-line channel mask
    pub stop_mask: Mask,
    /// Outside-line detection (largest-blob policy)
    pub outside: Detection,
    /// Stop-line detection (band-overlap policy)
    pub stop: Detection,
}

/// Run both detection channels over one frame with one calibration snapshot.
pub fn analyze(frame: DisplayFrame, calibration: &CalibrationState) -> FrameAnalysis {
    let outside_mask = threshold_mask(&frame, &calibration.outside);
    let stop_mask = threshold_mask(&frame, &calibration.stop);

    let outside = classify_largest(&outside_mask, calibration.outside.min_detect_area);
    let stop = classify_stop_band(
        &stop_mask,
        calibration.stop.min_detect_area,
        &calibration.detect_loc,
    );

    FrameAnalysis {
        frame,
        outside_mask,
        stop_mask,
        outside,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrameFormat;

    #[test]
    fn test_analyze_runs_both_channels() {
        // Bright green is hue 60, saturation 255, value 255: inside the
        // default outside window everywhere the crop leaves alone, outside
        // the default stop window (hue capped at 29).
        let frame = DisplayFrame {
            rows: 96,
            cols: 96,
            channels: 3,
            format: FrameFormat::Color24,
            data: [0u8, 255, 0].repeat(96 * 96),
        };
        let calibration = CalibrationState::default();
        let analysis = analyze(frame, &calibration);

        assert!(analysis.outside.found);
        assert!(!analysis.outside_mask.is_clear());
        assert!(!analysis.stop.found);
        assert!(analysis.stop_mask.is_clear());
        assert_eq!(analysis.frame.rows, 96);
    }
}
