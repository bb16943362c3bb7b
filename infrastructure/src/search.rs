use domain::errors::RetrievalError;

/// Squared Euclidean distance between two equal-length vectors.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Exhaustive nearest-neighbour index over fixed-dimension vectors.
/// Row `i` is the `i`-th vector added.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    /// Build an index from rows, taking the dimension from the first row.
    pub fn from_vectors(vectors: &[Vec<f32>]) -> Result<Self, RetrievalError> {
        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        let mut index = Self::new(dim);
        index.add(vectors)?;
        Ok(index)
    }

    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), RetrievalError> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dim,
                got: bad.len(),
            });
        }
        self.data.reserve(vectors.len() * self.dim);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k` nearest rows, closest first; ties go to the lower position.
    /// Returns fewer than `k` when the index holds fewer rows.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, RetrievalError> {
        if query.len() != self.dim {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dim,
                got: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let mut scored: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2(row, query),
            })
            .collect();
        scored.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        scored.truncate(k);
        Ok(scored)
    }
}
