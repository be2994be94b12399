//! YUV→RGB color transform and aspect-fit computation.
//!
//! Computed once per stream, at first-frame initialization, and baked into
//! the uniform every cached command list references.

use crate::frame::{ColorRange, ColorSpace};
use glam::{Mat3, Vec3, Vec4};

/// Color conversion coefficients plus the UV sampling rectangle.
///
/// `uv_rect` is `(x, y, x_divisor, y_divisor)`: the shader samples
/// `rect.xy + uv / rect.zw`, which center-crops the video to the display
/// aspect without distortion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTransform {
    pub yuv_matrix: Mat3,
    pub offset: Vec3,
    pub uv_rect: Vec4,
}

const BT601_LIM: Mat3 = Mat3::from_cols(
    Vec3::new(1.1644, 1.1644, 1.1644),
    Vec3::new(0.0, -0.3917, 2.0172),
    Vec3::new(1.5960, -0.8129, 0.0),
);
const BT601_FULL: Mat3 = Mat3::from_cols(
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.0, -0.3441, 1.7720),
    Vec3::new(1.4020, -0.7141, 0.0),
);
const BT709_LIM: Mat3 = Mat3::from_cols(
    Vec3::new(1.1644, 1.1644, 1.1644),
    Vec3::new(0.0, -0.2132, 2.1124),
    Vec3::new(1.7927, -0.5329, 0.0),
);
const BT709_FULL: Mat3 = Mat3::from_cols(
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.0, -0.1873, 1.8556),
    Vec3::new(1.5748, -0.4681, 0.0),
);
const BT2020_LIM: Mat3 = Mat3::from_cols(
    Vec3::new(1.1644, 1.1644, 1.1644),
    Vec3::new(0.0, -0.1874, 2.1418),
    Vec3::new(1.6781, -0.6505, 0.0),
);
const BT2020_FULL: Mat3 = Mat3::from_cols(
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.0, -0.1646, 1.8814),
    Vec3::new(1.4746, -0.5714, 0.0),
);

const LIMITED_OFFSET: Vec3 = Vec3::new(16.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0);
const FULL_OFFSET: Vec3 = Vec3::new(0.0, 128.0 / 255.0, 128.0 / 255.0);

/// Coefficient matrix for a color space / range pair.
fn yuv_matrix(space: ColorSpace, range: ColorRange) -> Mat3 {
    let full = range == ColorRange::Full;
    match space {
        ColorSpace::Bt601 => {
            if full {
                BT601_FULL
            } else {
                BT601_LIM
            }
        }
        ColorSpace::Bt709 => {
            if full {
                BT709_FULL
            } else {
                BT709_LIM
            }
        }
        ColorSpace::Bt2020 => {
            if full {
                BT2020_FULL
            } else {
                BT2020_LIM
            }
        }
    }
}

impl ColorTransform {
    /// Compute the transform for a stream.
    ///
    /// The UV rect center-crops: if the frame is taller (relative to its
    /// width) than the screen, crop horizontally; otherwise crop vertically.
    /// Zero dimensions yield the identity rect rather than a division panic.
    pub fn compute(
        space: ColorSpace,
        range: ColorRange,
        frame_width: u32,
        frame_height: u32,
        screen_width: u32,
        screen_height: u32,
    ) -> Self {
        let yuv_matrix = yuv_matrix(space, range);
        let offset = match range {
            ColorRange::Limited => LIMITED_OFFSET,
            ColorRange::Full => FULL_OFFSET,
        };

        let uv_rect = if frame_width == 0 || frame_height == 0 || screen_width == 0 || screen_height == 0 {
            Vec4::new(0.0, 0.0, 1.0, 1.0)
        } else {
            let frame_aspect = frame_height as f32 / frame_width as f32;
            let screen_aspect = screen_height as f32 / screen_width as f32;

            if frame_aspect > screen_aspect {
                let multiplier = frame_aspect / screen_aspect;
                Vec4::new(0.5 - 0.5 * (1.0 / multiplier), 0.0, multiplier, 1.0)
            } else {
                let multiplier = screen_aspect / frame_aspect;
                Vec4::new(0.0, 0.5 - 0.5 * (1.0 / multiplier), 1.0, multiplier)
            }
        };

        Self {
            yuv_matrix,
            offset,
            uv_rect,
        }
    }
}
