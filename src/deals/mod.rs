// Deal engine: pure functions over an in-memory offer catalog.
// No I/O, no logging, no shared state; callers run the availability filter
// first by convention, then either finder in any order.

pub mod availability;
pub mod cumulative;
pub mod individual;

pub use availability::{filter_available, filter_available_with_exemption};
pub use cumulative::find_best_cumulative_deals;
pub use individual::find_individual_best_deals;

#[cfg(test)]
pub(crate) mod engine_test;
