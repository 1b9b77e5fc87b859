//! lane-cal - calibration toolkit for a serial-linked lane camera
//!
//! Decodes the ASCII-hex frame protocol an embedded lane-detection camera
//! streams over its serial link, frames and device telemetry lines alike,
//! runs the same crop / HSV-threshold / region-detection pipeline the
//! device runs, and keeps the tunable
//! calibration parameters in a shared store that UI and settings
//! collaborators can edit while frames flow.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Tunable calibration parameters and the shared store
pub mod calibration;
/// Core data structures (frames, masks, bounding boxes)
pub mod models;
/// Per-frame processing (acquisition, normalization, threshold, detection)
pub mod pipeline;
/// The serial frame protocol (sentinel scan, hex fields, payload decode)
pub mod protocol;

pub use calibration::{CalibrationState, CalibrationStore, ThresholdSettings};
pub use models::{DisplayFrame, FrameFormat, FrameHeader, Mask, RawFrame, Rect};
pub use pipeline::{Detection, FrameAnalysis, FrameReceiver, Telemetry, analyze, spawn_frame_reader};
pub use protocol::{DecodeError, StreamEvent};
