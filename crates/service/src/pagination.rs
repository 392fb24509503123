//! Limit/offset windows for list endpoints.

use crate::errors::ServiceError;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// A validated page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

impl PageWindow {
    /// Apply defaults and reject a limit outside `1..=MAX_LIMIT`.
    pub fn from_options(limit: Option<u64>, offset: Option<u64>) -> Result<Self, ServiceError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(ServiceError::invalid("limit", "Limit must be between 1 and 100"));
        }
        Ok(Self { limit, offset: offset.unwrap_or(0) })
    }

    /// Whether rows remain beyond this window.
    pub fn has_next(&self, total: u64) -> bool {
        total > self.offset.saturating_add(self.limit)
    }
}

impl Default for PageWindow {
    fn default() -> Self { Self { limit: DEFAULT_LIMIT, offset: 0 } }
}
