//! Pooling of token vectors into one term vector.

/// Distinct vectors collected while composing a term.
///
/// Identical vectors are kept once, so a piece reached through several
/// decompositions (tokenizer, subword, n-gram) is not over-weighted.
#[derive(Debug, Clone, Default)]
pub struct VectorPool {
    vectors: Vec<Vec<f32>>,
}

impl VectorPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `vector` unless an identical one is already pooled.
    pub fn insert(&mut self, vector: &[f32]) -> bool {
        if self.vectors.iter().any(|v| v.as_slice() == vector) {
            return false;
        }
        self.vectors.push(vector.to_vec());
        true
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Element-wise mean, `None` for an empty pool.
    pub fn mean(&self) -> Option<Vec<f32>> {
        mean_pool(&self.vectors)
    }
}

/// Element-wise mean of equally sized vectors; `None` when empty.
///
/// Accumulates in f64.
pub fn mean_pool(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let mut sum = vec![0.0f64; first.len()];
    for vector in vectors {
        for (acc, x) in sum.iter_mut().zip(vector) {
            *acc += f64::from(*x);
        }
    }
    let n = vectors.len() as f64;
    Some(sum.into_iter().map(|s| (s / n) as f32).collect())
}

/// Multiply every component by -1.
pub fn negate(vector: &mut [f32]) {
    for x in vector.iter_mut() {
        *x = -*x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool() {
        let mean = mean_pool(&[vec![1.0, 2.0, 3.0, 4.0], vec![3.0, 4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(mean, vec![2.0, 3.0, 4.0, 5.0]);
        assert!(mean_pool(&[]).is_none());
    }

    #[test]
    fn test_pool_deduplicates_identical_vectors() {
        let mut pool = VectorPool::new();
        assert!(pool.insert(&[1.0, 0.0]));
        assert!(!pool.insert(&[1.0, 0.0]));
        assert!(pool.insert(&[0.0, 1.0]));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.mean(), Some(vec![0.5, 0.5]));
    }

    #[test]
    fn test_negate() {
        let mut v = vec![0.5, -1.0, 0.0];
        negate(&mut v);
        assert_eq!(v, vec![-0.5, 1.0, -0.0]);
    }
}
