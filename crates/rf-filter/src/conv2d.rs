use rf_core::{Error, Image, ImageView, Rgb8};

use crate::kernel::Kernel;

/// Valid-mode 2D correlation of an RGB image with a square kernel.
///
/// Output pixel `(x, y)` is `sum_{i,j} kernel(i, j) * src(x + i, y + j)`,
/// evaluated per channel, rounded and clamped to `[0, 255]`. The output is
/// `(W - size + 1) x (H - size + 1)`.
///
/// Integer kernels are accumulated exactly.
pub fn convolve<W: Copy + Into<f64>>(
    src: &ImageView<'_, Rgb8>,
    kernel: &Kernel<W>,
) -> Result<Image<Rgb8>, Error> {
    let size = kernel.size();
    if size == 0 || size > src.width() || size > src.height() {
        return Err(Error::InvalidKernel {
            size,
            width: src.width(),
            height: src.height(),
        });
    }

    let out_w = src.width() - size + 1;
    let out_h = src.height() - size + 1;
    let weights: Vec<f64> = kernel.weights().iter().map(|&w| w.into()).collect();
    log::trace!(
        "convolve {}x{} with {size}x{size} kernel -> {out_w}x{out_h}",
        src.width(),
        src.height()
    );

    let mut out = Image::new_fill(out_w, out_h, Rgb8::BLACK);
    let mut acc = vec![[0.0f64; 3]; out_w];
    let mut dst = out.as_view_mut();

    for y in 0..out_h {
        acc.fill([0.0; 3]);

        for j in 0..size {
            let src_row = src.row(y + j);
            let k_row = &weights[j * size..(j + 1) * size];

            for (i, &k) in k_row.iter().enumerate() {
                if k == 0.0 {
                    continue;
                }
                // Column i of the kernel sees src_row[x + i] for every output x.
                for (a, px) in acc.iter_mut().zip(&src_row[i..i + out_w]) {
                    a[0] += k * f64::from(px.r);
                    a[1] += k * f64::from(px.g);
                    a[2] += k * f64::from(px.b);
                }
            }
        }

        for (d, a) in dst.row_mut(y).iter_mut().zip(&acc) {
            *d = Rgb8::new(clamp_channel(a[0]), clamp_channel(a[1]), clamp_channel(a[2]));
        }
    }

    Ok(out)
}

#[inline]
fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
