//! Query resolution by backward chaining.
//!
//! The search itself lives in [`backward`]. This module holds its tuning
//! knobs and the counters it reports.

pub mod backward;

use serde::{Deserialize, Serialize};

pub use backward::Solutions;

/// Bounds on a single resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum rule-expansion depth of a goal (default: 128). Deeper goals
    /// fail without being expanded.
    pub max_depth: usize,
    /// Maximum number of goal expansions per query (default: 250,000).
    /// When exhausted the search stops and reports no further answers.
    pub max_steps: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_steps: 250_000,
        }
    }
}

/// Counters collected while resolving one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    /// Goal expansions performed.
    pub steps: usize,
    /// Search passes run. A pass that cut goals at its depth limit is
    /// followed by a deeper one; a pass that cut goals and proved new facts
    /// is repeated with those facts available.
    pub passes: usize,
    /// Deepest goal expanded.
    pub max_depth_reached: usize,
    /// Goals not expanded by rules because an identical goal was already
    /// in progress above them.
    pub loop_prunes: usize,
    /// Goals failed for exceeding the depth limit of their pass.
    pub depth_prunes: usize,
    /// Ground facts derived along the way and reused by later passes.
    pub lemmas: usize,
    /// Whether `max_steps` cut the search short.
    pub budget_exhausted: bool,
}
