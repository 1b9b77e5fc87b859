//! Cropping and HSV windowing: turn a color frame plus one channel's
//! calibration into a binary mask.

use rayon::prelude::*;

use crate::calibration::{ColorRange, HsvColor, ThresholdSettings};
use crate::models::{DisplayFrame, Mask};

/// Convert one RGB pixel to HSV in the 8-bit convention: hue 0-179
/// (degrees halved), saturation and value 0-255.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> HsvColor {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let value = max as u8;
    let saturation = if max == 0 {
        0
    } else {
        (255 * delta / max) as u8
    };
    let hue = if delta == 0 {
        0
    } else {
        let degrees = if max == r {
            60 * (g - b) / delta
        } else if max == g {
            120 + 60 * (b - r) / delta
        } else {
            240 + 60 * (r - g) / delta
        };
        (degrees.rem_euclid(360) / 2) as u8
    };

    HsvColor {
        hue,
        saturation,
        value,
    }
}

#[inline]
fn in_range(color: HsvColor, range: &ColorRange) -> bool {
    range.min.hue <= color.hue
        && color.hue <= range.max.hue
        && range.min.saturation <= color.saturation
        && color.saturation <= range.max.saturation
        && range.min.value <= color.value
        && color.value <= range.max.value
}

/// Build the binary mask for one detection channel.
///
/// Crop margins blank pixels outright; the remaining pixels are set when
/// their HSV value falls inside the window, bounds inclusive on every
/// component. Margins larger than the frame clamp to an empty region.
/// Single-channel frames threshold as `(hue 0, saturation 0, value)`.
pub fn threshold_mask(frame: &DisplayFrame, settings: &ThresholdSettings) -> Mask {
    let width = frame.cols;
    let height = frame.rows;
    let mut mask = Mask::new(width, height);

    let channels = frame.channels;
    if width == 0 || height == 0 || channels == 0 {
        return mask;
    }

    let crop = settings.cropping;
    let x_lo = (crop.left as usize).min(width);
    let x_hi = width.saturating_sub(crop.right as usize);
    let y_lo = (crop.top as usize).min(height);
    let y_hi = height.saturating_sub(crop.bottom as usize);
    let range = settings.color;
    let data = &frame.data;

    mask.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            if y < y_lo || y >= y_hi {
                return;
            }
            let base = y * width * channels;
            for x in x_lo..x_hi {
                let index = base + x * channels;
                let hsv = if channels >= 3 {
                    rgb_to_hsv(data[index], data[index + 1], data[index + 2])
                } else {
                    HsvColor {
                        hue: 0,
                        saturation: 0,
                        value: data[index],
                    }
                };
                if in_range(hsv, &range) {
                    row[x] = Mask::FOREGROUND;
                }
            }
        });

    mask
}
