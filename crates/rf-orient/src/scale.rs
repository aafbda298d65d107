//! Ridge-width driven choice of block and kernel size.
//!
//! A coarse grid of points is probed for strongly oriented texture. At each
//! retained point the image is projected onto the axis across the ridges and
//! the spacing of projection peaks gives a local ridge frequency. The mean
//! frequency is turned into a ridge width and bucketed into one of the
//! supported Sobel sizes.

use core::f32::consts::FRAC_PI_2;

use rf_core::{Error, ImageView, Rgb8};

use crate::field::sobel_gradients;
use crate::tensor::estimate;

/// Heuristic thresholds of the scale selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleConfig {
    /// Samples per axis of the probe grid.
    pub grid_points: usize,
    /// Side of the block used to estimate orientation at a sample.
    pub probe_block: usize,
    /// Samples at or below this coherence are discarded.
    pub min_coherence: f32,
    /// Projection window side, rounded up to odd.
    pub window_size: usize,
    /// Normalized projection value a peak must exceed.
    pub peak_threshold: f32,
    /// Mean peak spacing must exceed this to count as a ridge period.
    pub min_peak_distance: f32,
    /// Mean frequencies below this fall back to the narrow class.
    pub min_frequency: f32,
    /// Ridge widths above this are wide.
    pub wide_width: f32,
    /// Ridge widths above this (and up to `wide_width`) are medium.
    pub medium_width: f32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            grid_points: 16,
            probe_block: 8,
            min_coherence: 0.5,
            window_size: 24,
            peak_threshold: 0.7,
            min_peak_distance: 2.0,
            min_frequency: 0.05,
            wide_width: 12.0,
            medium_width: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RidgeWidth {
    Narrow,
    Medium,
    Wide,
}

impl RidgeWidth {
    pub fn block_size(self) -> usize {
        match self {
            RidgeWidth::Narrow => 3,
            RidgeWidth::Medium => 5,
            RidgeWidth::Wide => 7,
        }
    }

    fn classify(width: f32, cfg: &ScaleConfig) -> Self {
        if width > cfg.wide_width {
            RidgeWidth::Wide
        } else if width > cfg.medium_width {
            RidgeWidth::Medium
        } else {
            RidgeWidth::Narrow
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleEstimate {
    pub class: RidgeWidth,
    pub block_size: usize,
    /// Mean ridge width in pixels, when at least one sample was valid.
    pub mean_width: Option<f32>,
    pub valid_samples: usize,
}

impl ScaleEstimate {
    fn narrow(mean_width: Option<f32>, valid_samples: usize) -> Self {
        Self {
            class: RidgeWidth::Narrow,
            block_size: RidgeWidth::Narrow.block_size(),
            mean_width,
            valid_samples,
        }
    }

    /// Mean ridge frequency in cycles per pixel.
    pub fn frequency(&self) -> Option<f32> {
        self.mean_width.map(|w| 1.0 / w)
    }
}

pub fn estimate_block_size(image: &ImageView<'_, Rgb8>, cfg: &ScaleConfig) -> Result<usize, Error> {
    Ok(select_scale(image, cfg)?.block_size)
}

pub fn select_scale(image: &ImageView<'_, Rgb8>, cfg: &ScaleConfig) -> Result<ScaleEstimate, Error> {
    let grads = sobel_gradients(image, 3)?;
    let (gx, gy) = (grads.gx.as_view(), grads.gy.as_view());

    let n = cfg.grid_points;
    let half_probe = cfg.probe_block / 2;
    let mut freq_sum = 0.0f64;
    let mut valid = 0usize;
    let mut coherent = 0usize;

    for j in 0..n {
        let y = (j + 1) * image.height() / (n + 1);
        for i in 0..n {
            let x = (i + 1) * image.width() / (n + 1);
            let (Some(px), Some(py)) = (x.checked_sub(half_probe), y.checked_sub(half_probe))
            else {
                continue;
            };

            let ridge = estimate(&gx, &gy, cfg.probe_block, px, py);
            if ridge.coherence <= cfg.min_coherence {
                continue;
            }
            coherent += 1;

            if let Some(f) = local_ridge_frequency(image, x, y, ridge.angle, cfg) {
                freq_sum += f64::from(f);
                valid += 1;
            }
        }
    }

    log::debug!("scale probe: {coherent} coherent samples, {valid} with a ridge period");
    if valid == 0 {
        return Ok(ScaleEstimate::narrow(None, 0));
    }

    let avg_frequency = (freq_sum / valid as f64) as f32;
    let width = 1.0 / avg_frequency;
    if avg_frequency < cfg.min_frequency {
        return Ok(ScaleEstimate::narrow(Some(width), valid));
    }

    let class = RidgeWidth::classify(width, cfg);
    log::debug!("mean ridge width {width:.2}px -> {class:?}");
    Ok(ScaleEstimate {
        class,
        block_size: class.block_size(),
        mean_width: Some(width),
        valid_samples: valid,
    })
}

/// Ridge frequency (cycles per pixel) around `(x, y)` for ridges running at
/// `angle`, from the peaks of the red channel projected across the ridges.
///
/// `None` when the window leaves the image, the projection is flat, fewer
/// than two peaks are found or their spacing is too small.
pub fn local_ridge_frequency(
    image: &ImageView<'_, Rgb8>,
    x: usize,
    y: usize,
    angle: f32,
    cfg: &ScaleConfig,
) -> Option<f32> {
    let window = cfg.window_size | 1;
    let half = window / 2;
    if x < half || y < half || x + half >= image.width() || y + half >= image.height() {
        return None;
    }

    let (sin_p, cos_p) = (angle + FRAC_PI_2).sin_cos();
    let mut sums = vec![0.0f32; window];
    let mut counts = vec![0u32; window];
    for (dy, row) in image.rows().skip(y - half).take(window).enumerate() {
        let dy = dy as f32 - half as f32;
        for (dx, px) in row[x - half..=x + half].iter().enumerate() {
            let dx = dx as f32 - half as f32;
            let bin = (dx * cos_p + dy * sin_p).round() + half as f32;
            if bin >= 0.0 && (bin as usize) < window {
                sums[bin as usize] += f32::from(px.r);
                counts[bin as usize] += 1;
            }
        }
    }

    let projection: Vec<f32> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| s / c.max(1) as f32)
        .collect();
    let (min, max) = projection
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if max - min < 1e-6 {
        return None;
    }

    let norm: Vec<f32> = projection.iter().map(|v| (v - min) / (max - min)).collect();
    let peaks: Vec<usize> = (1..window - 1)
        .filter(|&i| norm[i] > norm[i - 1] && norm[i] > norm[i + 1] && norm[i] > cfg.peak_threshold)
        .collect();
    if peaks.len() < 2 {
        return None;
    }

    let avg_distance = (peaks[peaks.len() - 1] - peaks[0]) as f32 / (peaks.len() - 1) as f32;
    (avg_distance > cfg.min_peak_distance).then(|| 1.0 / avg_distance)
}

#[cfg(test)]
mod tests {
    use core::f32::consts::{FRAC_PI_2, PI};

    use rf_core::{Image, Rgb8};

    use super::{RidgeWidth, ScaleConfig, estimate_block_size, local_ridge_frequency, select_scale};

    fn vertical_stripes(size: usize, period: f32) -> Image<Rgb8> {
        Image::from_fn(size, size, |x, _| {
            let v = 127.5 + 127.5 * (2.0 * PI * x as f32 / period).cos();
            Rgb8::gray(v.round() as u8)
        })
    }

    #[test]
    fn wide_stripes_select_the_largest_block() {
        let img = vertical_stripes(128, 14.0);
        let cfg = ScaleConfig::default();

        let est = select_scale(&img.as_view(), &cfg).expect("image fits sobel");
        assert_eq!(est.class, RidgeWidth::Wide);
        assert_eq!(est.block_size, 7);
        assert!(est.valid_samples > 0);
        let width = est.mean_width.expect("valid samples");
        assert!((width - 14.0).abs() < 0.5, "{width}");

        assert_eq!(estimate_block_size(&img.as_view(), &cfg), Ok(7));
    }

    #[test]
    fn medium_stripes_select_the_middle_block() {
        // Period 8 fits three peaks in the projection window.
        let img = vertical_stripes(128, 8.0);
        let est = select_scale(&img.as_view(), &ScaleConfig::default()).expect("image fits sobel");
        assert_eq!(est.class, RidgeWidth::Medium);
        assert_eq!(est.block_size, 5);
    }

    #[test]
    fn flat_image_defaults_to_narrow() {
        let img = Image::new_fill(64, 64, Rgb8::gray(80));
        let est = select_scale(&img.as_view(), &ScaleConfig::default()).expect("image fits sobel");
        assert_eq!(est.class, RidgeWidth::Narrow);
        assert_eq!(est.block_size, 3);
        assert_eq!(est.valid_samples, 0);
        assert_eq!(est.mean_width, None);
    }

    #[test]
    fn thresholds_are_configurable() {
        let img = vertical_stripes(128, 14.0);
        let cfg = ScaleConfig {
            wide_width: 20.0,
            ..ScaleConfig::default()
        };
        assert_eq!(estimate_block_size(&img.as_view(), &cfg), Ok(5));

        let strict = ScaleConfig {
            min_coherence: 1.0,
            ..ScaleConfig::default()
        };
        let est = select_scale(&img.as_view(), &strict).expect("image fits sobel");
        assert_eq!(est.valid_samples, 0);
        assert_eq!(est.block_size, 3);
    }

    #[test]
    fn low_mean_frequency_falls_back_to_narrow() {
        // Period 14 is measured (1/14 ~ 0.071 cycles/px) but sits below 0.1.
        let img = vertical_stripes(128, 14.0);
        let cfg = ScaleConfig {
            min_frequency: 0.1,
            ..ScaleConfig::default()
        };
        let est = select_scale(&img.as_view(), &cfg).expect("image fits sobel");
        assert_eq!(est.class, RidgeWidth::Narrow);
        assert_eq!(est.block_size, 3);
        assert!(est.valid_samples > 0);
        let width = est.mean_width.expect("samples were valid");
        assert!((width - 14.0).abs() < 0.5, "{width}");
    }

    #[test]
    fn local_frequency_matches_stripe_period() {
        let img = vertical_stripes(64, 14.0);
        let cfg = ScaleConfig::default();
        // Peaks at x = 14 and 28 both lie inside the window around x = 25.
        let f = local_ridge_frequency(&img.as_view(), 25, 30, FRAC_PI_2, &cfg)
            .expect("two peaks in window");
        assert!((f - 1.0 / 14.0).abs() < 1e-6);
    }

    #[test]
    fn local_frequency_rejects_edges_and_flat_windows() {
        let img = vertical_stripes(64, 14.0);
        let cfg = ScaleConfig::default();
        assert_eq!(local_ridge_frequency(&img.as_view(), 5, 30, FRAC_PI_2, &cfg), None);
        assert_eq!(local_ridge_frequency(&img.as_view(), 30, 52, FRAC_PI_2, &cfg), None);

        let flat = Image::new_fill(64, 64, Rgb8::gray(7));
        assert_eq!(local_ridge_frequency(&flat.as_view(), 30, 30, 0.0, &cfg), None);

        // Projecting along the stripes instead of across them is flat too.
        assert_eq!(local_ridge_frequency(&img.as_view(), 30, 30, 0.0, &cfg), None);
    }
}
