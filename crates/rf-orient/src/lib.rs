//! Block orientation fields from gradient structure tensors.
//!
//! [`build_fingerprint`] splits the Sobel gradient images of a grayscale
//! input into square blocks and stores one [`Ridge`] (angle and coherence)
//! per block. [`select_scale`] picks the block size from the ridge spacing
//! when the caller has no preference.
//!
//! Angles follow the convention documented in [`tensor`]: `0` is a
//! horizontal ridge, `π/2` a vertical one, values in `[0, π)`.

pub mod field;
pub mod scale;
pub mod tensor;

pub use field::{
    FALLBACK_SOBEL_SIZE, Fingerprint, Gradients, build_fingerprint, sobel_gradients,
    sobel_size_for,
};
pub use scale::{
    RidgeWidth, ScaleConfig, ScaleEstimate, estimate_block_size, local_ridge_frequency,
    select_scale,
};
pub use tensor::{Ridge, StructureTensor, TRACE_EPSILON, estimate, wrap_pi};
