//! Foundational primitives for ridge orientation analysis.
//!
//! ## Image Layout
//! Images are a single contiguous row-major buffer. `stride` is the distance,
//! in elements, between adjacent row starts; owned images always have
//! `stride == width`, borrowed views may be wider (subviews of a parent).
//! The same container is used for pixel data (`Image<Rgb8>`) and for any
//! other per-cell grid, such as a block orientation field.
//!
//! ## Pixels
//! [`Rgb8`] holds three 8-bit channels. Grayscale content is represented by
//! replicating luma into all three channels, so algorithms that need a
//! single channel read `r`.
//!
//! ## Files
//! [`read_ppm`] / [`write_ppm`] handle the binary `P6` raster with `maxval`
//! 255 and no comment lines.

mod error;
mod geom;
mod image;
mod pixel;
mod ppm;

pub use error::Error;
pub use geom::{Point2f, Segment2f, Vec2f};
pub use image::{Image, ImageView, ImageViewMut};
pub use pixel::{Rgb8, to_grayscale};
pub use ppm::{FormatError, PpmError, decode_ppm, encode_ppm, read_ppm, write_ppm};
