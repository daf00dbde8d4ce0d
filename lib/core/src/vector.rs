use serde::{Deserialize, Serialize};

/// A vector of floating point numbers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Compute L2 (Euclidean) distance
    ///
    /// Vectors of different dimension are infinitely far apart.
    #[inline]
    pub fn l2_distance(&self, other: &Vector) -> f32 {
        if self.dim() != other.dim() {
            return f32::INFINITY;
        }

        l2_distance(&self.data, &other.data)
    }
}

/// L2 distance over two equally sized slices
///
/// Uses two accumulators for better pipelining. Summation order is fixed,
/// so the same pair of inputs always produces the same bits.
#[inline]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut sum1 = 0.0f32;
    let mut sum2 = 0.0f32;
    let mut chunks_a = a.chunks_exact(2);
    let mut chunks_b = b.chunks_exact(2);

    for (x, y) in (&mut chunks_a).zip(&mut chunks_b) {
        let d0 = x[0] - y[0];
        let d1 = x[1] - y[1];
        sum1 += d0 * d0;
        sum2 += d1 * d1;
    }
    for (x, y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        let d = x - y;
        sum1 += d * d;
    }

    (sum1 + sum2).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_distance() {
        let v1 = Vector::new(vec![0.0, 0.0]);
        let v2 = Vector::new(vec![3.0, 4.0]);
        assert!((v1.l2_distance(&v2) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_distance_odd_dimension() {
        let v1 = Vector::new(vec![1.0, 2.0, 3.0]);
        let v2 = Vector::new(vec![1.0, 2.0, 5.0]);
        assert_eq!(v1.l2_distance(&v2), 2.0);
        assert_eq!(v2.l2_distance(&v1), 2.0);
    }

    #[test]
    fn test_l2_distance_mismatched_dims() {
        let v1 = Vector::new(vec![1.0]);
        let v2 = Vector::new(vec![1.0, 0.0]);
        assert!(v1.l2_distance(&v2).is_infinite());
    }

    #[test]
    fn test_identical_vectors_are_zero_apart() {
        let v = Vector::new(vec![0.25, 0.0, 1.0, 0.1, 0.3]);
        assert_eq!(v.l2_distance(&v.clone()), 0.0);
    }
}
