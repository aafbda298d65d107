//! Umbrella crate for the `ridgeflow` workspace.
//!
//! Re-exports image primitives and PPM I/O ([`rf_core`]), kernels and
//! correlation ([`rf_filter`]), orientation fields and scale selection
//! ([`rf_orient`]) and SVG rendering ([`rf_render`]).

pub use rf_core::*;
pub use rf_filter::*;
pub use rf_orient::*;
pub use rf_render::*;
