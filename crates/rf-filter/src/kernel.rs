use rf_core::Error;

/// Square kernel with odd side `size`, weights in row-major order.
///
/// Weight `(i, j)` is column `i`, row `j`; it multiplies the source pixel at
/// offset `(i, j)` from the top-left of the footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel<T> {
    size: usize,
    weights: Vec<T>,
}

impl<T: Copy> Kernel<T> {
    pub fn new(size: usize, weights: Vec<T>) -> Result<Self, Error> {
        if size == 0 || size % 2 == 0 {
            return Err(Error::KernelShape { size });
        }
        let expected = size * size;
        if weights.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: weights.len(),
            });
        }
        Ok(Self { size, weights })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn radius(&self) -> usize {
        self.size / 2
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    pub fn row(&self, j: usize) -> &[T] {
        assert!(j < self.size, "kernel row out of bounds");
        &self.weights[j * self.size..(j + 1) * self.size]
    }

    pub fn at(&self, i: usize, j: usize) -> T {
        self.row(j)[i]
    }

    pub fn transposed(&self) -> Self {
        let n = self.size;
        let weights = (0..n * n).map(|k| self.at(k / n, k % n)).collect();
        Self { size: n, weights }
    }
}

impl<T: Copy + Into<f64>> Kernel<T> {
    pub fn sum(&self) -> f64 {
        self.weights.iter().map(|&w| w.into()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::Kernel;
    use rf_core::Error;

    #[test]
    fn rejects_even_and_mismatched_shapes() {
        assert_eq!(
            Kernel::new(4, vec![0i32; 16]).unwrap_err(),
            Error::KernelShape { size: 4 }
        );
        assert_eq!(
            Kernel::<i32>::new(0, Vec::new()).unwrap_err(),
            Error::KernelShape { size: 0 }
        );
        assert_eq!(
            Kernel::new(3, vec![1.0f32; 8]).unwrap_err(),
            Error::SizeMismatch {
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn indexing_and_transpose() {
        let k = Kernel::new(3, (1..=9).collect::<Vec<i32>>()).expect("valid kernel");
        assert_eq!(k.radius(), 1);
        assert_eq!(k.row(1), &[4, 5, 6]);
        assert_eq!(k.at(2, 0), 3);

        let t = k.transposed();
        assert_eq!(t.row(0), &[1, 4, 7]);
        assert_eq!(t.at(0, 2), 3);
        assert_eq!(k.sum(), 45.0);
    }
}
