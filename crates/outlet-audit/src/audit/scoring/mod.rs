//! Checklist scoring: response normalization, aggregation, and status tiers.
//!
//! Everything here is pure. Callers hand in responses that were already scoped
//! by the repository and the access filter.

mod aggregate;
mod normalizer;
mod status;

pub use aggregate::{aggregate, aggregate_raw, ScoreResult, ScoreTally};
pub use normalizer::{normalize, NormalizedResponse};
pub use status::{classify, ScoreStatus, GOOD_THRESHOLD, WARNING_THRESHOLD};
