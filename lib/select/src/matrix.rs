use fiesta_core::PartyEmbedding;
use serde::{Deserialize, Serialize};

/// Pairwise L2 distances between selected parties
///
/// Entry `[i][j]` is the distance between selection `i` and selection `j`.
/// Symmetric with a zero diagonal by construction. Stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMatrix {
    size: usize,
    distances: Vec<f32>,
}

impl ComparisonMatrix {
    pub fn from_entries(entries: &[&PartyEmbedding]) -> Self {
        let size = entries.len();
        let mut distances = vec![0.0f32; size * size];

        for i in 0..size {
            for j in (i + 1)..size {
                let d = entries[i].distance(entries[j]);
                distances[i * size + j] = d;
                distances[j * size + i] = d;
            }
        }

        Self { size, distances }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.distances[row * self.size + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.distances.chunks(self.size.max(1))
    }

    /// Smallest distance between two different selections
    pub fn min_off_diagonal(&self) -> Option<f32> {
        (0..self.size)
            .flat_map(|i| ((i + 1)..self.size).map(move |j| (i, j)))
            .map(|(i, j)| self.get(i, j))
            .reduce(f32::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiesta_core::Vector;

    fn entries() -> Vec<PartyEmbedding> {
        vec![
            PartyEmbedding::new("a", Vector::new(vec![0.0, 0.0])),
            PartyEmbedding::new("b", Vector::new(vec![3.0, 4.0])),
            PartyEmbedding::new("c", Vector::new(vec![0.0, 1.0])),
        ]
    }

    #[test]
    fn test_symmetric_with_zero_diagonal() {
        let pool = entries();
        let refs: Vec<_> = pool.iter().collect();
        let matrix = ComparisonMatrix::from_entries(&refs);

        assert_eq!(matrix.size(), 3);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert_eq!(matrix.get(0, 1), 5.0);
        assert_eq!(matrix.get(0, 2), 1.0);
        assert_eq!(matrix.min_off_diagonal(), Some(1.0));
        assert_eq!(matrix.rows().count(), 3);
    }

    #[test]
    fn test_empty_and_single() {
        let empty = ComparisonMatrix::from_entries(&[]);
        assert_eq!(empty.size(), 0);
        assert_eq!(empty.rows().count(), 0);
        assert_eq!(empty.min_off_diagonal(), None);

        let pool = entries();
        let single = ComparisonMatrix::from_entries(&[&pool[0]]);
        assert_eq!(single.get(0, 0), 0.0);
        assert_eq!(single.min_off_diagonal(), None);
    }

    #[test]
    fn test_serializes_row_major() {
        let pool = entries();
        let matrix = ComparisonMatrix::from_entries(&[&pool[0], &pool[1]]);
        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["size"], 2);
        assert_eq!(json["distances"], serde_json::json!([0.0, 5.0, 5.0, 0.0]));
    }
}
