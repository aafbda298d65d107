use rf_core::{Error, Image, ImageView, Point2f, Rgb8};
use rf_filter::{SUPPORTED_SOBEL_SIZES, convolve, sobel};

use crate::tensor::{Ridge, TRACE_EPSILON, estimate, wrap_pi};

/// Sobel size used when the block size has no matching table.
pub const FALLBACK_SOBEL_SIZE: usize = 3;

/// Clamped horizontal and vertical Sobel responses of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub gx: Image<Rgb8>,
    pub gy: Image<Rgb8>,
}

pub fn sobel_gradients(image: &ImageView<'_, Rgb8>, size: usize) -> Result<Gradients, Error> {
    let pair = sobel(size)?;
    Ok(Gradients {
        gx: convolve(image, &pair.x)?,
        gy: convolve(image, &pair.y)?,
    })
}

/// Block orientation field of one image.
///
/// `ridges` holds one [`Ridge`] per block, row-major, `width x height`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    pub width: usize,
    pub height: usize,
    pub block_size: usize,
    pub ridges: Image<Ridge>,
}

impl Fingerprint {
    pub fn ridge(&self, bx: usize, by: usize) -> Option<Ridge> {
        self.ridges.get(bx, by).copied()
    }

    /// Blocks in row-major order as `(bx, by, ridge)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Ridge)> + '_ {
        let w = self.width;
        self.ridges
            .data()
            .iter()
            .enumerate()
            .map(move |(i, &r)| (i % w, i / w, r))
    }

    /// Center of block `(bx, by)` in gradient-image pixel coordinates.
    pub fn block_center(&self, bx: usize, by: usize) -> Point2f {
        let b = self.block_size as f32;
        Point2f {
            x: bx as f32 * b + 0.5 * b,
            y: by as f32 * b + 0.5 * b,
        }
    }

    pub fn mean_coherence(&self) -> f32 {
        let n = self.ridges.data().len();
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .ridges
            .data()
            .iter()
            .map(|r| f64::from(r.coherence))
            .sum();
        (sum / n as f64) as f32
    }

    /// Rescales coherence so the strongest block is `1.0`.
    ///
    /// Returns `false` and leaves the field untouched when every block is at
    /// or below [`TRACE_EPSILON`].
    pub fn normalize_coherence(&mut self) -> bool {
        let max = self
            .ridges
            .data()
            .iter()
            .map(|r| r.coherence)
            .fold(0.0f32, f32::max);
        if f64::from(max) <= TRACE_EPSILON {
            return false;
        }
        for r in self.ridges.data_mut() {
            r.coherence = (r.coherence / max).clamp(0.0, 1.0);
        }
        true
    }

    /// Coherence-weighted mean orientation, averaged on doubled angles so
    /// that `θ` and `θ + π` agree. `None` when no block carries weight.
    pub fn dominant_orientation(&self) -> Option<f32> {
        let (mut s, mut c) = (0.0f64, 0.0f64);
        for r in self.ridges.data() {
            let w = f64::from(r.coherence);
            let a = 2.0 * f64::from(r.angle);
            s += w * a.sin();
            c += w * a.cos();
        }
        if s.hypot(c) <= TRACE_EPSILON {
            return None;
        }
        Some(wrap_pi(0.5 * s.atan2(c)) as f32)
    }
}

/// Sobel size for `block_size`, or [`FALLBACK_SOBEL_SIZE`] when no table
/// exists.
pub fn sobel_size_for(block_size: usize) -> usize {
    if SUPPORTED_SOBEL_SIZES.contains(&block_size) {
        block_size
    } else {
        FALLBACK_SOBEL_SIZE
    }
}

/// Builds the normalized block orientation field of a grayscale image.
pub fn build_fingerprint(
    image: &ImageView<'_, Rgb8>,
    block_size: usize,
) -> Result<Fingerprint, Error> {
    if block_size == 0 {
        return Err(Error::InvalidBlockSize { block_size });
    }
    let k = sobel_size_for(block_size);
    if k != block_size {
        log::warn!("no Sobel table for block size {block_size}, using {k}");
    }

    let grads = sobel_gradients(image, k)?;
    let (gw, gh) = (grads.gx.width(), grads.gx.height());
    let width = (gw / block_size).max(1);
    let height = (gh / block_size).max(1);
    log::debug!(
        "fingerprint grid {width}x{height} (block {block_size}, sobel {k}, gradients {gw}x{gh})"
    );

    let (gx, gy) = (grads.gx.as_view(), grads.gy.as_view());
    let ridges = Image::from_fn(width, height, |bx, by| {
        estimate(&gx, &gy, block_size, bx * block_size, by * block_size)
    });
    drop(grads);

    let mut fp = Fingerprint {
        width,
        height,
        block_size,
        ridges,
    };
    if !fp.normalize_coherence() {
        log::debug!("orientation field has no coherent block");
    }
    Ok(fp)
}

#[cfg(test)]
mod tests {
    use core::f32::consts::{FRAC_PI_2, PI};

    use rf_core::{Error, Image, Rgb8};

    use super::{Fingerprint, build_fingerprint, sobel_gradients, sobel_size_for};
    use crate::tensor::Ridge;

    fn stripes(width: usize, height: usize, period: f32, vertical: bool) -> Image<Rgb8> {
        Image::from_fn(width, height, |x, y| {
            let t = (if vertical { x } else { y }) as f32;
            let v = 127.5 + 127.5 * (2.0 * PI * t / period).cos();
            Rgb8::gray(v.round() as u8)
        })
    }

    fn field_from(ridges: Vec<Ridge>, width: usize, height: usize) -> Fingerprint {
        Fingerprint {
            width,
            height,
            block_size: 4,
            ridges: Image::from_vec(width, height, ridges).expect("matching size"),
        }
    }

    #[test]
    fn grid_dimensions_follow_the_gradient_image() {
        let img = Image::new_fill(50, 37, Rgb8::gray(90));
        let fp = build_fingerprint(&img.as_view(), 5).expect("valid block");
        assert_eq!((fp.width, fp.height), (46 / 5, 33 / 5));
        assert_eq!(fp.ridges.width(), fp.width);

        // Block size 8 has no Sobel table and falls back to 3.
        let fp = build_fingerprint(&img.as_view(), 8).expect("valid block");
        assert_eq!(sobel_size_for(8), 3);
        assert_eq!((fp.width, fp.height), (48 / 8, 35 / 8));
    }

    #[test]
    fn tiny_image_still_has_one_block() {
        let img = Image::new_fill(8, 8, Rgb8::gray(10));
        let fp = build_fingerprint(&img.as_view(), 7).expect("valid block");
        assert_eq!((fp.width, fp.height), (1, 1));
        assert_eq!(fp.ridge(0, 0), Some(Ridge::SENTINEL));
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let img = Image::new_fill(8, 8, Rgb8::BLACK);
        assert_eq!(
            build_fingerprint(&img.as_view(), 0).unwrap_err(),
            Error::InvalidBlockSize { block_size: 0 }
        );
    }

    #[test]
    fn constant_image_has_zero_coherence_everywhere() {
        let img = Image::new_fill(40, 40, Rgb8::gray(200));
        let fp = build_fingerprint(&img.as_view(), 3).expect("valid block");
        assert!(fp.iter().all(|(_, _, r)| r == Ridge::SENTINEL));
        assert_eq!(fp.mean_coherence(), 0.0);
        assert_eq!(fp.dominant_orientation(), None);
    }

    #[test]
    fn vertical_stripes_give_vertical_ridges() {
        let img = stripes(64, 64, 10.0, true);
        let fp = build_fingerprint(&img.as_view(), 5).expect("valid block");

        let max = fp.iter().map(|(_, _, r)| r.coherence).fold(0.0f32, f32::max);
        assert!((max - 1.0).abs() < 1e-6);
        for (bx, by, r) in fp.iter() {
            assert!((0.0..=1.0).contains(&r.coherence));
            if r.coherence > 0.0 {
                assert!((r.angle - FRAC_PI_2).abs() < 1e-5, "block ({bx}, {by})");
            }
        }
        let dominant = fp.dominant_orientation().expect("coherent field");
        assert!((dominant - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn horizontal_stripes_give_horizontal_ridges() {
        let img = stripes(64, 64, 10.0, false);
        let fp = build_fingerprint(&img.as_view(), 3).expect("valid block");
        for (_, _, r) in fp.iter() {
            if r.coherence > 0.0 {
                assert!(r.angle.abs() < 1e-5 || (PI - r.angle) < 1e-5);
            }
        }
    }

    #[test]
    fn half_turn_keeps_the_field() {
        // Low contrast keeps the 3x3 responses below saturation.
        let img = Image::from_fn(42, 42, |x, y| {
            let d = 0.8 * x as f32 + 0.6 * y as f32;
            Rgb8::gray((128.0 + 60.0 * (2.0 * PI * d / 12.0).cos()).round() as u8)
        });
        let rotated = Image::from_fn(42, 42, |x, y| *img.get(41 - x, 41 - y).expect("inside"));

        let a = build_fingerprint(&img.as_view(), 3).expect("valid block");
        let b = build_fingerprint(&rotated.as_view(), 3).expect("valid block");
        let da = a.dominant_orientation().expect("coherent field");
        let db = b.dominant_orientation().expect("coherent field");

        let expected = 0.6f32.atan2(0.8) + FRAC_PI_2;
        assert!((da - expected).abs() < 0.05, "{da}");
        let d = (da - db).rem_euclid(PI);
        assert!(d.min(PI - d) < 0.05, "{da} vs {db}");
    }

    #[test]
    fn clamped_gradients_keep_angles_in_upper_half() {
        // Gradient along (0.8, -0.6): the components disagree in sign, so one
        // of them is always clamped away.
        let img = Image::from_fn(42, 42, |x, y| {
            let d = 0.8 * x as f32 - 0.6 * y as f32;
            Rgb8::gray((128.0 + 60.0 * (2.0 * PI * d / 12.0).cos()).round() as u8)
        });
        let fp = build_fingerprint(&img.as_view(), 3).expect("valid block");

        let mut coherent = 0;
        for (_, _, r) in fp.iter() {
            if r.coherence > 0.0 {
                coherent += 1;
                assert!(r.angle == 0.0 || r.angle >= FRAC_PI_2 - 1e-6, "{}", r.angle);
            }
        }
        assert!(coherent > 0);
    }

    #[test]
    fn normalization_keeps_unit_range_and_skips_flat_fields() {
        let mut fp = field_from(
            vec![
                Ridge { angle: 0.3, coherence: 0.2 },
                Ridge { angle: 1.0, coherence: 0.5 },
                Ridge { angle: 2.0, coherence: 0.0 },
                Ridge { angle: 0.1, coherence: 0.4 },
            ],
            2,
            2,
        );
        assert!(fp.normalize_coherence());
        let c: Vec<f32> = fp.iter().map(|(_, _, r)| r.coherence).collect();
        assert_eq!(c, vec![0.4, 1.0, 0.0, 0.8]);

        let mut flat = field_from(vec![Ridge::SENTINEL; 6], 3, 2);
        assert!(!flat.normalize_coherence());
        assert!(flat.iter().all(|(_, _, r)| r == Ridge::SENTINEL));
    }

    #[test]
    fn block_center_and_iteration_order() {
        let fp = field_from(vec![Ridge::SENTINEL; 6], 3, 2);
        let coords: Vec<(usize, usize)> = fp.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
        let c = fp.block_center(2, 1);
        assert_eq!((c.x, c.y), (10.0, 6.0));
        assert_eq!(fp.ridge(3, 0), None);
    }

    #[test]
    fn gradients_shrink_with_kernel_size() {
        let img = Image::new_fill(20, 12, Rgb8::gray(5));
        let g = sobel_gradients(&img.as_view(), 7).expect("supported size");
        assert_eq!((g.gx.width(), g.gx.height()), (14, 6));
        assert!(sobel_gradients(&img.as_view(), 4).is_err());
    }
}
