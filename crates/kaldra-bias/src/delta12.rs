//! Δ12 projector: embedding → 12-dimensional archetype distribution.
//!
//! The embedding is split into 12 contiguous blocks (the first `L % 12` blocks take
//! one extra element), each block is averaged, and a max-shifted softmax turns the
//! 12 means into a probability distribution.

use kaldra_core::{KaldraError, KaldraResult, ARCHETYPE_DIM};

/// Numerically stable softmax. Empty input yields an empty vector.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Block means of `embedding` over 12 near-equal contiguous blocks.
/// A block left empty (L < 12) has mean 0.0.
fn block_means(embedding: &[f32]) -> Vec<f64> {
    let len = embedding.len();
    let base = len / ARCHETYPE_DIM;
    let extra = len % ARCHETYPE_DIM;

    let mut means = Vec::with_capacity(ARCHETYPE_DIM);
    let mut start = 0;
    for block in 0..ARCHETYPE_DIM {
        let size = base + usize::from(block < extra);
        let chunk = &embedding[start..start + size];
        start += size;
        let mean = if chunk.is_empty() {
            0.0
        } else {
            chunk.iter().map(|&v| v as f64).sum::<f64>() / chunk.len() as f64
        };
        means.push(mean);
    }
    means
}

/// Project an embedding onto Δ12.
///
/// Entries are finite, lie in [0, 1] and sum to 1. They stay strictly inside
/// (0, 1) while block means differ by less than about 39; past that the peak
/// rounds to exactly 1.0, and past about 745 the other entries underflow to 0.0. Fails with `InvalidInput` when the embedding is empty or
/// holds NaN/infinite values.
pub fn project_to_delta12(embedding: &[f32]) -> KaldraResult<Vec<f64>> {
    if embedding.is_empty() {
        return Err(KaldraError::InvalidInput("embedding must not be empty".to_string()));
    }
    if let Some(pos) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(KaldraError::InvalidInput(format!(
            "embedding value at position {} is not finite",
            pos
        )));
    }
    Ok(softmax(&block_means(embedding)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_distribution(v: &[f64]) {
        assert_eq!(v.len(), ARCHETYPE_DIM);
        assert!(v.iter().all(|&x| x > 0.0 && x < 1.0), "entry outside (0,1): {:?}", v);
        let sum: f64 = v.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "sum = {}", sum);
    }

    #[test]
    fn output_is_a_distribution_for_various_lengths() {
        for len in [1usize, 5, 11, 12, 13, 100, 384, 1000] {
            let embedding: Vec<f32> = (0..len).map(|i| ((i * 37 % 101) as f32) / 50.0 - 1.0).collect();
            assert_distribution(&project_to_delta12(&embedding).unwrap());
        }
    }

    #[test]
    fn uneven_blocks_give_extra_element_to_leading_blocks() {
        // L = 14: blocks 0 and 1 hold two elements, the rest one.
        let mut embedding = vec![0.0f32; 14];
        embedding[1] = 2.0; // block 0 = [0, 2] → mean 1
        embedding[2] = 4.0; // block 1 = [4, 0] → mean 2
        embedding[4] = 3.0; // block 2 = [3] → mean 3
        let means = block_means(&embedding);
        assert_eq!(means[0], 1.0);
        assert_eq!(means[1], 2.0);
        assert_eq!(means[2], 3.0);
        assert!(means[3..].iter().all(|&m| m == 0.0));
    }

    #[test]
    fn constant_embedding_is_uniform() {
        let v = project_to_delta12(&vec![0.3f32; 384]).unwrap();
        for x in &v {
            assert!((x - 1.0 / 12.0).abs() < 1e-12);
        }
    }

    #[test]
    fn softmax_is_shift_stable() {
        let a = softmax(&[1000.0, 1001.0, 1002.0]);
        let b = softmax(&[0.0, 1.0, 2.0]);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12);
        }
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn large_spread_saturates_but_stays_a_distribution() {
        let mut moderate = vec![0.0f32; 12];
        moderate[3] = 20.0;
        assert_distribution(&project_to_delta12(&moderate).unwrap());

        let mut huge = vec![0.0f32; 12];
        huge[3] = 1e30;
        let v = project_to_delta12(&huge).unwrap();
        assert_eq!(v.len(), ARCHETYPE_DIM);
        assert_eq!(v[3], 1.0);
        assert!(v.iter().enumerate().all(|(i, &x)| i == 3 || x == 0.0));
        assert_eq!(v.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        assert!(matches!(project_to_delta12(&[]), Err(KaldraError::InvalidInput(_))));
        assert!(matches!(
            project_to_delta12(&[0.1, f32::NAN, 0.3]),
            Err(KaldraError::InvalidInput(_))
        ));
        assert!(project_to_delta12(&[f32::INFINITY]).is_err());
    }

    #[test]
    fn projection_is_deterministic() {
        let embedding: Vec<f32> = (0..384).map(|i| (i as f32).sin()).collect();
        assert_eq!(
            project_to_delta12(&embedding).unwrap(),
            project_to_delta12(&embedding).unwrap()
        );
    }
}
