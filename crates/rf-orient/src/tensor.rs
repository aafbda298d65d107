//! Block-wise gradient structure tensor.
//!
//! Angle convention: the ridge runs perpendicular to the dominant gradient.
//! With the image y axis pointing down, `0` is a horizontal ridge and `π/2`
//! a vertical ridge. Angles are reported in `[0, π)`.
//!
//! Gradient images come from the clamping correlation, so both components
//! are non-negative and `gxy >= 0`. Estimated angles therefore lie in
//! `[π/2, π)` (or `0` for a purely vertical gradient). Ridges whose gradient
//! components have opposite signs, for example a ridge at `π/4`, are not
//! recovered and collapse toward the nearest axis.

use core::f64::consts::{FRAC_PI_2, PI};

use rf_core::{ImageView, Rgb8};

/// Tensor traces at or below this value are treated as flat.
pub const TRACE_EPSILON: f64 = 1e-6;

/// Local ridge direction and its reliability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ridge {
    pub angle: f32,
    pub coherence: f32,
}

impl Ridge {
    /// Returned for flat blocks and blocks outside the gradient images.
    pub const SENTINEL: Self = Self {
        angle: 0.0,
        coherence: 0.0,
    };
}

impl Default for Ridge {
    fn default() -> Self {
        Self::SENTINEL
    }
}

/// Second-moment sums of a set of gradient samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StructureTensor {
    pub gxx: f64,
    pub gxy: f64,
    pub gyy: f64,
}

impl StructureTensor {
    #[inline]
    pub fn accumulate(&mut self, gx: f64, gy: f64) {
        self.gxx += gx * gx;
        self.gxy += gx * gy;
        self.gyy += gy * gy;
    }

    pub fn from_samples(samples: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut t = Self::default();
        for (gx, gy) in samples {
            t.accumulate(gx, gy);
        }
        t
    }

    pub fn trace(&self) -> f64 {
        self.gxx + self.gyy
    }

    pub fn is_flat(&self) -> bool {
        self.trace() <= TRACE_EPSILON
    }

    /// Ridge angle in `[0, π)`, or `0` for a flat tensor.
    pub fn orientation(&self) -> f32 {
        if self.is_flat() {
            return Ridge::SENTINEL.angle;
        }
        let gradient = 0.5 * (2.0 * self.gxy).atan2(self.gxx - self.gyy);
        wrap_pi(gradient + FRAC_PI_2) as f32
    }

    /// Anisotropy in `[0, 1]`: `1` for a single gradient direction, `0` for
    /// isotropic or flat blocks.
    pub fn coherence(&self) -> f32 {
        if self.is_flat() {
            return 0.0;
        }
        let diff = self.gxx - self.gyy;
        let c = (diff * diff + 4.0 * self.gxy * self.gxy).sqrt() / self.trace();
        c.clamp(0.0, 1.0) as f32
    }

    pub fn ridge(&self) -> Ridge {
        if self.is_flat() {
            return Ridge::SENTINEL;
        }
        Ridge {
            angle: self.orientation(),
            coherence: self.coherence(),
        }
    }
}

/// Estimates the ridge of the `block_size` square whose top-left corner is
/// `(x, y)`, reading the red channel of both gradient images.
///
/// Blocks that do not fit inside both images yield [`Ridge::SENTINEL`].
pub fn estimate(
    grad_x: &ImageView<'_, Rgb8>,
    grad_y: &ImageView<'_, Rgb8>,
    block_size: usize,
    x: usize,
    y: usize,
) -> Ridge {
    if block_size == 0 {
        return Ridge::SENTINEL;
    }
    let (bx, by) = match (
        grad_x.subview(x, y, block_size, block_size),
        grad_y.subview(x, y, block_size, block_size),
    ) {
        (Ok(bx), Ok(by)) => (bx, by),
        _ => return Ridge::SENTINEL,
    };

    let mut t = StructureTensor::default();
    for (row_x, row_y) in bx.rows().zip(by.rows()) {
        for (px, py) in row_x.iter().zip(row_y) {
            t.accumulate(f64::from(px.r), f64::from(py.r));
        }
    }
    t.ridge()
}

/// Maps an angle into `[0, π)`.
pub fn wrap_pi(angle: f64) -> f64 {
    let a = angle.rem_euclid(PI);
    if a >= PI { 0.0 } else { a }
}
