/// Instantaneous imbalance: max bin load minus the expected average load.
/// Callers keep `balls_placed` equal to the true sum of placements; the
/// metric does not verify it.
pub fn gap(bins: &[u64], balls_placed: u64, m: usize) -> f64 {
    let max_load = bins.iter().copied().max().unwrap_or(0);
    max_load as f64 - balls_placed as f64 / m as f64
}
