/// Identity descriptor produced by a face embedder for one face crop.
///
/// Values are taken as-is from the model; no normalization is assumed,
/// which is why comparisons go through cosine similarity.
#[derive(Clone, Debug, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean length, accumulated in f64.
    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|&x| (x as f64) * (x as f64))
            .sum::<f64>()
            .sqrt()
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_norm() {
        let e = Embedding::new(vec![3.0, 4.0]);
        assert_relative_eq!(e.norm(), 5.0);
    }

    #[test]
    fn test_empty() {
        let e = Embedding::from(Vec::new());
        assert!(e.is_empty());
        assert_relative_eq!(e.norm(), 0.0);
    }
}
