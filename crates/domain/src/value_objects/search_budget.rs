//! Cap on web-search tool invocations within one generation run

use serde::{Deserialize, Serialize};

/// Hard ceiling on searches in one run
pub const MAX_SEARCH_BUDGET: u32 = 15;

/// Number of searches the weekly newsletter may issue
pub const DEFAULT_SEARCH_BUDGET: u32 = MAX_SEARCH_BUDGET;

/// Counts searches against a fixed limit
///
/// The counter only moves forward; once `used == limit` every further
/// [`SearchBudget::try_consume`] is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBudget {
    limit: u32,
    used: u32,
}

impl SearchBudget {
    /// Limits above [`MAX_SEARCH_BUDGET`] are clamped to it
    pub const fn new(limit: u32) -> Self {
        let limit = if limit > MAX_SEARCH_BUDGET {
            MAX_SEARCH_BUDGET
        } else {
            limit
        };
        Self { limit, used: 0 }
    }

    /// A budget that never allows a search
    pub const fn none() -> Self {
        Self::new(0)
    }

    /// Reserve one search, returning its 1-based sequence index
    pub fn try_consume(&mut self) -> Option<u32> {
        if self.used >= self.limit {
            return None;
        }
        self.used += 1;
        Some(self.used)
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    pub const fn used(&self) -> u32 {
        self.used
    }

    pub const fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    pub const fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }

    /// Whether tools should be offered at all
    pub const fn allows_searching(&self) -> bool {
        self.limit > 0
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BUDGET)
    }
}
