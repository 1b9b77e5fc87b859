//! Core data structures shared across the protocol and pipeline stages:
//! - Frame headers, raw and display frames
//! - Binary masks produced by thresholding
//! - Axis-aligned bounding boxes for detected regions

pub mod frame;
pub mod mask;
pub mod rect;

pub use frame::{DisplayFrame, FrameFormat, FrameHeader, RawFrame};
pub use mask::Mask;
pub use rect::Rect;
