//! 2D kernels and valid-mode correlation for gradient and ridge filtering.
//!
//! Kernels are square with an odd side length and are applied exactly as
//! authored: [`conv2d::convolve`] computes correlation, it never flips the
//! kernel. Output pixels only exist where the whole kernel footprint fits in
//! the input, so results shrink by `size - 1` in each dimension, and every
//! channel is rounded and clamped to `[0, 255]`.
//!
//! Sobel kernels come from fixed lookup tables for sizes 3, 5 and 7. Gabor
//! kernels are generated from orientation, frequency and envelope spreads.

pub mod conv2d;
pub mod gabor;
pub mod kernel;
pub mod sobel;

pub use conv2d::convolve;
pub use gabor::{GABOR_SUM_EPSILON, GaborParams, gabor};
pub use kernel::Kernel;
pub use sobel::{SUPPORTED_SOBEL_SIZES, SobelPair, sobel};
