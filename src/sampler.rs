use crate::error::{PhotonError, Result};
use rand::seq::SliceRandom;
use rand::RngCore;

/// Per-pixel sample generation strategy. A closed enum rather than a
/// `Sampler` trait object: exactly two strategies exist and the hot render
/// loop calls `samples` once per pixel, so a `match` avoids a vtable
/// indirection there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampler {
    /// Plain uniform random sampling within the pixel, no stratification.
    Independent,
    /// Correlated multi-jittered (N-rooks + stratified grid) sampling.
    /// Requires a perfect-square sample count.
    MultiJittered,
}

impl Sampler {
    /// Generates `n` sample offsets in `[0, 1)^2` for one pixel.
    ///
    /// `MultiJittered` rejects a non-perfect-square `n` with
    /// `PhotonError::Config`, since the coarse grid needs an exact
    /// `sqrt(n) x sqrt(n)` subdivision.
    pub fn samples(&self, n: u32, rng: &mut dyn RngCore) -> Result<Vec<(f64, f64)>> {
        match self {
            Sampler::Independent => Ok((0..n).map(|_| (next_uniform(rng), next_uniform(rng))).collect()),
            Sampler::MultiJittered => multi_jittered_samples(n, rng),
        }
    }
}

fn multi_jittered_samples(n: u32, rng: &mut dyn RngCore) -> Result<Vec<(f64, f64)>> {
    let coarse = (n as f64).sqrt().round() as u32;
    if coarse * coarse != n {
        return Err(PhotonError::Config(format!(
            "multi-jittered sampler requires a perfect-square sample count, got {n}"
        )));
    }
    let coarse = coarse as usize;
    let grid_unit = 1.0 / n as f64;
    let coarse_unit = 1.0 / coarse as f64;

    // Each row keeps a shuffled permutation of column sub-cell indices,
    // each column a shuffled permutation of row sub-cell indices; popping
    // one index per (row, col) cell reproduces the original's "pick and
    // erase a random remaining index" loop as an up-front Fisher-Yates
    // shuffle instead of repeated random removal.
    let mut row_perms: Vec<Vec<usize>> = (0..coarse)
        .map(|_| {
            let mut v: Vec<usize> = (0..coarse).collect();
            v.shuffle(rng);
            v
        })
        .collect();
    let mut col_perms: Vec<Vec<usize>> = (0..coarse)
        .map(|_| {
            let mut v: Vec<usize> = (0..coarse).collect();
            v.shuffle(rng);
            v
        })
        .collect();

    let mut out = Vec::with_capacity(n as usize);
    for i in 0..coarse {
        for j in 0..coarse {
            let row_idx = row_perms[i].pop().expect("row permutation exhausted early");
            let col_idx = col_perms[j].pop().expect("col permutation exhausted early");

            let row_min = i as f64 * coarse_unit + row_idx as f64 * grid_unit;
            let col_min = j as f64 * coarse_unit + col_idx as f64 * grid_unit;

            let x = row_min + next_uniform(rng) * grid_unit;
            let y = col_min + next_uniform(rng) * grid_unit;
            out.push((x, y));
        }
    }
    Ok(out)
}

fn next_uniform(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn non_square_count_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(Sampler::MultiJittered.samples(10, &mut rng).is_err());
    }

    #[test]
    fn perfect_square_count_is_accepted_and_sized_correctly() {
        let mut rng = SmallRng::seed_from_u64(1);
        let samples = Sampler::MultiJittered.samples(16, &mut rng).unwrap();
        assert_eq!(samples.len(), 16);
        for (x, y) in &samples {
            assert!(*x >= 0.0 && *x < 1.0);
            assert!(*y >= 0.0 && *y < 1.0);
        }
    }

    #[test]
    fn each_axis_hits_every_fine_stratum_exactly_once() {
        let mut rng = SmallRng::seed_from_u64(5);
        let n = 25u32;
        let samples = Sampler::MultiJittered.samples(n, &mut rng).unwrap();
        let mut x_strata = vec![0u32; n as usize];
        let mut y_strata = vec![0u32; n as usize];
        for (x, y) in samples {
            x_strata[((x * n as f64) as usize).min(n as usize - 1)] += 1;
            y_strata[((y * n as f64) as usize).min(n as usize - 1)] += 1;
        }
        assert!(x_strata.iter().all(|&c| c == 1));
        assert!(y_strata.iter().all(|&c| c == 1));
    }

    #[test]
    fn independent_sampler_accepts_any_count() {
        let mut rng = SmallRng::seed_from_u64(2);
        let samples = Sampler::Independent.samples(7, &mut rng).unwrap();
        assert_eq!(samples.len(), 7);
    }
}
