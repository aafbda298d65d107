use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
    OutOfBounds,
    InvalidStride,
    /// Kernel of size zero, or larger than the image it is applied to.
    InvalidKernel {
        size: usize,
        width: usize,
        height: usize,
    },
    /// Kernel construction with an even or zero side length.
    KernelShape {
        size: usize,
    },
    /// No lookup table exists for the requested kernel size.
    UnsupportedSize {
        size: usize,
    },
    InvalidBlockSize {
        block_size: usize,
    },
    /// A generator parameter is zero, negative or not finite.
    InvalidParameter {
        name: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::InvalidStride => write!(f, "invalid stride"),
            Self::InvalidKernel {
                size,
                width,
                height,
            } => write!(
                f,
                "invalid kernel: size {size} does not fit a {width}x{height} image"
            ),
            Self::KernelShape { size } => {
                write!(f, "kernel size must be odd and positive, got {size}")
            }
            Self::UnsupportedSize { size } => {
                write!(f, "unsupported kernel size {size}")
            }
            Self::InvalidBlockSize { block_size } => {
                write!(f, "block size must be positive, got {block_size}")
            }
            Self::InvalidParameter { name } => {
                write!(f, "{name} must be positive and finite")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_names_offending_values() {
        let e = Error::InvalidKernel {
            size: 9,
            width: 4,
            height: 20,
        };
        assert_eq!(
            e.to_string(),
            "invalid kernel: size 9 does not fit a 4x20 image"
        );
        assert_eq!(
            Error::UnsupportedSize { size: 4 }.to_string(),
            "unsupported kernel size 4"
        );
        assert_eq!(
            Error::InvalidParameter { name: "sigma_x" }.to_string(),
            "sigma_x must be positive and finite"
        );
    }
}
