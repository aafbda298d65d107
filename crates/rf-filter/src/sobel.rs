//! Sobel-style gradient kernels from fixed lookup tables.
//!
//! The x kernel is positive on the left columns, so correlating it with a
//! bright-to-the-left edge gives a positive response; the y kernel is its
//! transpose (positive on the top rows). There is no generating formula:
//! sizes other than those in [`SUPPORTED_SOBEL_SIZES`] are rejected.

use rf_core::Error;

use crate::kernel::Kernel;

pub const SUPPORTED_SOBEL_SIZES: [usize; 3] = [3, 5, 7];

struct SobelTable {
    size: usize,
    x: &'static [i32],
    y: &'static [i32],
}

#[rustfmt::skip]
const SOBEL_3X: [i32; 9] = [
    1, 0, -1,
    2, 0, -2,
    1, 0, -1,
];

#[rustfmt::skip]
const SOBEL_3Y: [i32; 9] = [
     1,  2,  1,
     0,  0,  0,
    -1, -2, -1,
];

#[rustfmt::skip]
const SOBEL_5X: [i32; 25] = [
    2, 1, 0, -1, -2,
    3, 2, 0, -2, -3,
    4, 3, 0, -3, -4,
    3, 2, 0, -2, -3,
    2, 1, 0, -1, -2,
];

#[rustfmt::skip]
const SOBEL_5Y: [i32; 25] = [
     2,  3,  4,  3,  2,
     1,  2,  3,  2,  1,
     0,  0,  0,  0,  0,
    -1, -2, -3, -2, -1,
    -2, -3, -4, -3, -2,
];

#[rustfmt::skip]
const SOBEL_7X: [i32; 49] = [
    3, 2, 1, 0, -1, -2, -3,
    4, 3, 2, 0, -2, -3, -4,
    5, 4, 3, 0, -3, -4, -5,
    6, 5, 4, 0, -4, -5, -6,
    5, 4, 3, 0, -3, -4, -5,
    4, 3, 2, 0, -2, -3, -4,
    3, 2, 1, 0, -1, -2, -3,
];

#[rustfmt::skip]
const SOBEL_7Y: [i32; 49] = [
     3,  4,  5,  6,  5,  4,  3,
     2,  3,  4,  5,  4,  3,  2,
     1,  2,  3,  4,  3,  2,  1,
     0,  0,  0,  0,  0,  0,  0,
    -1, -2, -3, -4, -3, -2, -1,
    -2, -3, -4, -5, -4, -3, -2,
    -3, -4, -5, -6, -5, -4, -3,
];

const SOBEL_TABLES: [SobelTable; 3] = [
    SobelTable {
        size: 3,
        x: &SOBEL_3X,
        y: &SOBEL_3Y,
    },
    SobelTable {
        size: 5,
        x: &SOBEL_5X,
        y: &SOBEL_5Y,
    },
    SobelTable {
        size: 7,
        x: &SOBEL_7X,
        y: &SOBEL_7Y,
    },
];

/// Horizontal and vertical derivative kernels of one size.
#[derive(Debug, Clone, PartialEq)]
pub struct SobelPair {
    pub x: Kernel<i32>,
    pub y: Kernel<i32>,
}

impl SobelPair {
    pub fn size(&self) -> usize {
        self.x.size()
    }
}

pub fn sobel(size: usize) -> Result<SobelPair, Error> {
    let table = SOBEL_TABLES
        .iter()
        .find(|t| t.size == size)
        .ok_or(Error::UnsupportedSize { size })?;

    Ok(SobelPair {
        x: Kernel::new(size, table.x.to_vec())?,
        y: Kernel::new(size, table.y.to_vec())?,
    })
}
