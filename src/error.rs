use thiserror::Error;

/// Errors raised before any bin is mutated. A failed run produces no
/// partial results; skipping or aborting a parameter combination is the
/// caller's call.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SimError {
    #[error("{strategy} needs at least {needed} bins, got {m}")]
    NotEnoughBins {
        strategy: &'static str,
        needed: usize,
        m: usize,
    },

    #[error("beta {beta} is outside [0.0, 1.0]")]
    BetaOutOfRange { beta: f64 },

    #[error("query budget {k} is not 1 or 2")]
    QueryBudgetOutOfRange { k: usize },

    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}
