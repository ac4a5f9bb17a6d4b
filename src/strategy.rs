use crate::error::SimError;
use rand::prelude::*;
use smallvec::{SmallVec, smallvec};

/// Ball-placement policies over a vector of bin load counters.
///
/// Parameters (beta, query budget) travel inside the variant so a run's
/// configuration is fully self-describing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    OneChoice,                       // one uniform bin
    TwoChoice,                       // lesser-loaded of two distinct bins
    OneBetaChoice { beta: f64 },     // one-choice w.p. beta, else two-choice
    ThreeChoice,                     // least-loaded of three distinct bins
    QueryResolution { k: usize },    // two candidates, percentile queries only
}

impl Strategy {
    /// Interpolated strategy; beta = 0 recovers two-choice, beta = 1
    /// recovers one-choice.
    pub fn one_plus_beta(beta: f64) -> Result<Self, SimError> {
        if !(0.0..=1.0).contains(&beta) {
            return Err(SimError::BetaOutOfRange { beta });
        }
        Ok(Strategy::OneBetaChoice { beta })
    }

    /// Bounded-information strategy with k percentile-query levels.
    pub fn with_query_budget(k: usize) -> Result<Self, SimError> {
        if k < 1 || k > 2 {
            return Err(SimError::QueryBudgetOutOfRange { k });
        }
        Ok(Strategy::QueryResolution { k })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::OneChoice => "one_choice",
            Strategy::TwoChoice => "two_choice",
            Strategy::OneBetaChoice { .. } => "one_plus_beta_choice",
            Strategy::ThreeChoice => "three_choice",
            Strategy::QueryResolution { .. } => "query_resolution",
        }
    }

    /// How many distinct bins one placement samples.
    pub fn arity(&self) -> usize {
        match self {
            Strategy::OneChoice => 1,
            // the two-choice arm must stay viable even at beta = 1
            Strategy::TwoChoice
            | Strategy::OneBetaChoice { .. }
            | Strategy::QueryResolution { .. } => 2,
            Strategy::ThreeChoice => 3,
        }
    }

    /// Check m against the sampling arity. Drivers call this before
    /// touching any bin.
    pub fn validate_for(&self, m: usize) -> Result<(), SimError> {
        let needed = self.arity();
        if m < needed {
            return Err(SimError::NotEnoughBins {
                strategy: self.name(),
                needed,
                m,
            });
        }
        Ok(())
    }

    /// Pick the bin the next ball lands in, without placing it. Reads are
    /// against `bins` as given; the batched driver points this at a frozen
    /// snapshot.
    pub fn choose<R: Rng>(&self, bins: &[u64], rng: &mut R) -> usize {
        match self {
            Strategy::OneChoice => rng.gen_range(0..bins.len()),
            Strategy::TwoChoice => {
                let c = sample_distinct(rng, bins.len(), 2);
                // tie goes to the first-sampled; the sampled order is itself
                // uniform, so no bin index is favored
                if bins[c[0]] <= bins[c[1]] { c[0] } else { c[1] }
            }
            Strategy::OneBetaChoice { beta } => {
                // fresh draw per call, independent of the delegate's draws
                let arm = if rng.r#gen::<f64>() < *beta {
                    Strategy::OneChoice
                } else {
                    Strategy::TwoChoice
                };
                arm.choose(bins, rng)
            }
            Strategy::ThreeChoice => {
                let c = sample_distinct(rng, bins.len(), 3);
                let mut best = c[0];
                for &cand in &c[1..] {
                    if bins[cand] < bins[best] {
                        best = cand;
                    }
                }
                best
            }
            Strategy::QueryResolution { k } => {
                let c = sample_distinct(rng, bins.len(), 2);
                resolve_with_queries(bins, c[0], c[1], *k, rng)
            }
        }
    }

    /// Place one ball: choose a bin and increment it.
    pub fn apply<R: Rng>(&self, bins: &mut [u64], rng: &mut R) {
        let choice = self.choose(bins, rng);
        bins[choice] += 1;
    }
}

/// k distinct uniform indices from 0..m by rejection. Ordered tuples are
/// i.i.d. uniform, so the returned order carries no fixed bias.
fn sample_distinct<R: Rng>(rng: &mut R, m: usize, k: usize) -> SmallVec<[usize; 3]> {
    debug_assert!(k <= m && k <= 3);
    let mut picks: SmallVec<[usize; 3]> = smallvec![];
    while picks.len() < k {
        let c = rng.gen_range(0..m);
        if !picks.contains(&c) {
            picks.push(c);
        }
    }
    picks
}

/// Decide between two candidates using only percentile-threshold queries
/// against the full bin population, spending at most k levels before an
/// arbitrary pick.
fn resolve_with_queries<R: Rng>(
    bins: &[u64],
    c1: usize,
    c2: usize,
    k: usize,
    rng: &mut R,
) -> usize {
    let median = percentile(bins, 50.0);
    let above1 = (bins[c1] as f64) > median;
    let above2 = (bins[c2] as f64) > median;

    if above1 != above2 {
        // one level was enough, whatever the budget
        return if above1 { c2 } else { c1 };
    }

    if k == 1 {
        return if rng.r#gen::<bool>() { c1 } else { c2 };
    }

    // same side of the median: refine toward the tail both sit in
    let threshold = percentile(bins, if above1 { 75.0 } else { 25.0 });
    let in_top1 = bins[c1] as f64 >= threshold;
    let in_top2 = bins[c2] as f64 >= threshold;

    if in_top1 != in_top2 {
        if in_top1 { c2 } else { c1 }
    } else if rng.r#gen::<bool>() {
        c1
    } else {
        c2
    }
}

/// Linear-interpolation percentile over the full population, recomputed
/// from scratch on every call.
fn percentile(bins: &[u64], p: f64) -> f64 {
    let mut sorted: Vec<u64> = bins.to_vec();
    sorted.sort_unstable();
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] as f64 + (sorted[hi] as f64 - sorted[lo] as f64) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn percentile_interpolates_linearly() {
        let bins = vec![0, 1, 2, 3];
        assert_eq!(percentile(&bins, 50.0), 1.5);
        assert_eq!(percentile(&bins, 25.0), 0.75);
        assert_eq!(percentile(&bins, 75.0), 2.25);
        assert_eq!(percentile(&bins, 0.0), 0.0);
        assert_eq!(percentile(&bins, 100.0), 3.0);
        assert_eq!(percentile(&[5], 50.0), 5.0);
    }

    #[test]
    fn two_choice_picks_lesser_loaded() {
        // with m = 2 the sampled pair is always {0, 1}, so the lighter bin
        // must win every time regardless of sampled order
        let bins = vec![5u64, 0];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(Strategy::TwoChoice.choose(&bins, &mut rng), 1);
        }
    }

    #[test]
    fn three_choice_tie_goes_to_first_sampled() {
        // all bins equal: whichever candidate comes out first must win
        let bins = vec![2u64; 10];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let c = sample_distinct(&mut rng, bins.len(), 3);
            let mut best = c[0];
            for &cand in &c[1..] {
                if bins[cand] < bins[best] {
                    best = cand;
                }
            }
            assert_eq!(best, c[0]);
        }
    }

    #[test]
    fn sample_distinct_returns_distinct_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let c = sample_distinct(&mut rng, 5, 3);
            assert_eq!(c.len(), 3);
            assert!(c.iter().all(|&i| i < 5));
            assert!(c[0] != c[1] && c[1] != c[2] && c[0] != c[2]);
        }
    }

    #[test]
    fn query_resolution_split_median_is_deterministic() {
        // bins 0..5: median 2.0; candidate 4 is above, candidate 1 is not
        let bins = vec![0u64, 1, 2, 3, 4];
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(resolve_with_queries(&bins, 1, 4, 1, &mut rng), 1);
            assert_eq!(resolve_with_queries(&bins, 4, 1, 1, &mut rng), 1);
            // budget does not change a level-one resolution
            assert_eq!(resolve_with_queries(&bins, 1, 4, 2, &mut rng), 1);
        }
    }

    #[test]
    fn query_resolution_second_level_splits_top_quartile() {
        // median 3.5, p75 = 5.25: loads 4 and 7 are both above the median
        // but 4 < 5.25 <= 7, so the load-4 bin (index 4) must win
        let bins = vec![0u64, 1, 2, 3, 4, 5, 6, 7];
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            assert_eq!(resolve_with_queries(&bins, 4, 7, 2, &mut rng), 4);
            assert_eq!(resolve_with_queries(&bins, 7, 4, 2, &mut rng), 4);
        }
    }

    #[test]
    fn query_resolution_second_level_splits_bottom_quartile() {
        // median 3.5, p25 = 1.75: loads 1 and 3 are both at-or-below the
        // median; 1 < 1.75 <= 3, so the load-1 bin (index 1) must win
        let bins = vec![0u64, 1, 2, 3, 4, 5, 6, 7];
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_eq!(resolve_with_queries(&bins, 1, 3, 2, &mut rng), 1);
            assert_eq!(resolve_with_queries(&bins, 3, 1, 2, &mut rng), 1);
        }
    }

    #[test]
    fn query_resolution_exhausted_budget_picks_either() {
        // uniform bins: every query level agrees, fallback is a coin flip
        let bins = vec![2u64; 6];
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = [false, false];
        for _ in 0..200 {
            match resolve_with_queries(&bins, 0, 5, 2, &mut rng) {
                0 => seen[0] = true,
                5 => seen[1] = true,
                other => panic!("picked non-candidate bin {other}"),
            }
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn constructors_reject_bad_parameters() {
        assert_eq!(
            Strategy::one_plus_beta(1.5),
            Err(SimError::BetaOutOfRange { beta: 1.5 })
        );
        assert_eq!(
            Strategy::one_plus_beta(-0.1),
            Err(SimError::BetaOutOfRange { beta: -0.1 })
        );
        assert!(Strategy::one_plus_beta(0.0).is_ok());
        assert!(Strategy::one_plus_beta(1.0).is_ok());
        assert_eq!(
            Strategy::with_query_budget(0),
            Err(SimError::QueryBudgetOutOfRange { k: 0 })
        );
        assert_eq!(
            Strategy::with_query_budget(3),
            Err(SimError::QueryBudgetOutOfRange { k: 3 })
        );
        assert!(Strategy::with_query_budget(2).is_ok());
    }

    #[test]
    fn validate_for_checks_arity() {
        assert!(Strategy::OneChoice.validate_for(1).is_ok());
        assert_eq!(
            Strategy::OneChoice.validate_for(0),
            Err(SimError::NotEnoughBins {
                strategy: "one_choice",
                needed: 1,
                m: 0
            })
        );
        assert!(Strategy::TwoChoice.validate_for(1).is_err());
        assert!(Strategy::ThreeChoice.validate_for(2).is_err());
        assert!(Strategy::ThreeChoice.validate_for(3).is_ok());
        assert!(
            Strategy::one_plus_beta(1.0)
                .unwrap()
                .validate_for(1)
                .is_err()
        );
    }
}
