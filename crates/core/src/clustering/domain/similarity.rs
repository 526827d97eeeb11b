use crate::shared::embedding::Embedding;
use crate::shared::error::ClusteringError;

/// Cosine similarity `dot(a, b) / (|a| * |b|)`, accumulated in f64.
///
/// Scale invariant, so raw (unnormalized) model outputs compare correctly.
/// A zero-length vector has no direction and scores 0.0 against anything.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> Result<f64, ClusteringError> {
    if a.len() != b.len() {
        return Err(ClusteringError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| (x as f64) * (y as f64))
        .sum();
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn emb(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec())
    }

    #[test]
    fn test_identical_vectors() {
        let a = emb(&[0.3, -1.2, 4.0, 0.5]);
        assert_relative_eq!(cosine_similarity(&a, &a).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_invariant() {
        let a = emb(&[1.0, 2.0, 3.0]);
        let b = emb(&[10.0, 20.0, 30.0]);
        assert_relative_eq!(cosine_similarity(&a, &b).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orthogonal() {
        let a = emb(&[1.0, 0.0]);
        let b = emb(&[0.0, 1.0]);
        assert_relative_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_opposite() {
        let a = emb(&[1.0, 2.0]);
        let b = emb(&[-1.0, -2.0]);
        assert_relative_eq!(cosine_similarity(&a, &b).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(&[1.0, 0.0, 0.0], &[0.6, 0.8, 0.0])]
    #[case(&[0.2, -0.7, 1.5], &[3.0, 0.1, -0.4])]
    #[case(&[5.0, 5.0], &[-1.0, 2.0])]
    fn test_symmetric(#[case] a: &[f32], #[case] b: &[f32]) {
        let (a, b) = (emb(a), emb(b));
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_known_angle() {
        // cos between (1,0) and (0.6,0.8) is 0.6
        let a = emb(&[1.0, 0.0]);
        let b = emb(&[0.6, 0.8]);
        assert_relative_eq!(cosine_similarity(&a, &b).unwrap(), 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let a = emb(&[0.0, 0.0, 0.0]);
        let b = emb(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
        assert_relative_eq!(cosine_similarity(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = emb(&[1.0, 2.0, 3.0]);
        let b = emb(&[1.0, 2.0]);
        let err = cosine_similarity(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            ClusteringError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }
}
