use core::f32::consts::PI;

use rf_core::Error;

use crate::kernel::Kernel;

/// Weight sums at or below this magnitude are left unnormalized.
pub const GABOR_SUM_EPSILON: f32 = 1e-6;

/// Parameters of an oriented Gabor kernel.
///
/// The cosine carrier varies along the direction `angle` (radians from +x),
/// so a kernel tuned to ridges running at angle `a` uses `angle = a + π/2`.
/// `frequency` is in cycles per pixel; `sigma_x` spreads the envelope along
/// the carrier and `sigma_y` across it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaborParams {
    pub size: usize,
    pub angle: f32,
    pub frequency: f32,
    pub sigma_x: f32,
    pub sigma_y: f32,
}

impl Default for GaborParams {
    fn default() -> Self {
        Self {
            size: 11,
            angle: 0.0,
            frequency: 0.1,
            sigma_x: 4.0,
            sigma_y: 4.0,
        }
    }
}

impl GaborParams {
    pub fn kernel(&self) -> Result<Kernel<f32>, Error> {
        gabor(
            self.size,
            self.angle,
            self.frequency,
            self.sigma_x,
            self.sigma_y,
        )
    }
}

pub fn gabor(
    size: usize,
    angle: f32,
    frequency: f32,
    sigma_x: f32,
    sigma_y: f32,
) -> Result<Kernel<f32>, Error> {
    if size == 0 || size % 2 == 0 {
        return Err(Error::KernelShape { size });
    }
    for (name, sigma) in [("sigma_x", sigma_x), ("sigma_y", sigma_y)] {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidParameter { name });
        }
    }

    let half = (size / 2) as isize;
    let (sin_a, cos_a) = angle.sin_cos();
    let inv_sx2 = 1.0 / (sigma_x * sigma_x);
    let inv_sy2 = 1.0 / (sigma_y * sigma_y);

    let mut weights = Vec::with_capacity(size * size);
    for y in -half..=half {
        for x in -half..=half {
            let (xf, yf) = (x as f32, y as f32);
            let x_theta = xf * cos_a + yf * sin_a;
            let y_theta = -xf * sin_a + yf * cos_a;

            let envelope =
                (-0.5 * (x_theta * x_theta * inv_sx2 + y_theta * y_theta * inv_sy2)).exp();
            let carrier = (2.0 * PI * frequency * x_theta).cos();
            weights.push(envelope * carrier);
        }
    }

    normalize_by_sum(&mut weights);
    Kernel::new(size, weights)
}

/// Divides by the weight sum unless it is within [`GABOR_SUM_EPSILON`] of
/// zero. Returns whether the weights were scaled.
fn normalize_by_sum(weights: &mut [f32]) -> bool {
    let sum: f32 = weights.iter().sum();
    if sum.abs() <= GABOR_SUM_EPSILON {
        return false;
    }
    for w in weights.iter_mut() {
        *w /= sum;
    }
    true
}
