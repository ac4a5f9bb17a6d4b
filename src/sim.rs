use crate::error::SimError;
use crate::gap::gap;
use crate::strategy::Strategy;
use rand::Rng;

/// Place n balls one at a time, every placement observing the state left by
/// the previous one. Returns one gap sample per placement, in order.
pub fn run_sequential<R: Rng>(
    n: usize,
    m: usize,
    strategy: Strategy,
    rng: &mut R,
) -> Result<Vec<f64>, SimError> {
    strategy.validate_for(m)?;
    let mut bins = vec![0u64; m];
    let mut gaps = Vec::with_capacity(n);
    for i in 1..=n {
        strategy.apply(&mut bins, rng);
        gaps.push(gap(&bins, i as u64, m));
    }
    Ok(gaps)
}

/// Place n balls in blocks of b. Every placement in a block reads the
/// snapshot taken at block start; increments land on the live bins and
/// become visible only to the next block. One gap sample per block, using
/// the cumulative ball count through block end, ceil(n/b) samples total.
/// The final block shrinks to the remainder when b does not divide n.
pub fn run_batched<R: Rng>(
    n: usize,
    m: usize,
    b: usize,
    strategy: Strategy,
    rng: &mut R,
) -> Result<Vec<f64>, SimError> {
    if b == 0 {
        return Err(SimError::ZeroBatchSize);
    }
    strategy.validate_for(m)?;
    let mut bins = vec![0u64; m];
    let mut gaps = Vec::with_capacity(n.div_ceil(b));
    let mut placed = 0usize;
    while placed < n {
        let block = b.min(n - placed);
        let snapshot = bins.clone();
        for _ in 0..block {
            let choice = strategy.choose(&snapshot, rng);
            bins[choice] += 1;
        }
        placed += block;
        gaps.push(gap(&bins, placed as u64, m));
    }
    Ok(gaps)
}
