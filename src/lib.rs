//! Balls-into-bins load balancing under the power of choice.
//!
//! n balls land in m bins under a placement strategy; the gap metric tracks
//! how far the fullest bin runs ahead of the average as balls accumulate.
//! Two drivers: sequential (every placement sees fresh state) and batched
//! (a whole block resolves against one stale snapshot).

pub mod error;
pub mod gap;
pub mod sim;
pub mod strategy;

pub use error::SimError;
pub use gap::gap;
pub use sim::{run_batched, run_sequential};
pub use strategy::Strategy;
