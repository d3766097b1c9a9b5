//! Resource bounds applied to a single transformation.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, QueryError};

/// Default maximum query length in bytes.
pub const DEFAULT_MAX_QUERY_LEN: usize = 8 * 1024;

/// Default maximum nesting depth of groups, fields and prefixes.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Bounds on input size and nesting.
///
/// Chains of binary operators are parsed and rendered without recursion, so their length is
/// bounded only by `max_query_len`. Groups, field values and prefixes nest recursively and are
/// bounded by `max_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum query length in bytes.
    pub max_query_len: usize,
    /// Maximum nesting depth.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_query_len: DEFAULT_MAX_QUERY_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Limits {
    /// Rejects queries longer than `max_query_len`.
    pub fn check_query_len(&self, input: &str) -> Result<(), QueryError> {
        if input.len() > self.max_query_len {
            return Err(QueryError::new(
                ErrorKind::QueryTooLong,
                format!(
                    "query is {} bytes, the limit is {}",
                    input.len(),
                    self.max_query_len
                ),
                None,
            ));
        }
        Ok(())
    }
}
