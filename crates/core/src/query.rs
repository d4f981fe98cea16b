//! Query cache keys and the request lifecycle shared by every page.

use serde::{Deserialize, Serialize};

/// Key of a cached backend query.
///
/// Pages read through the cache by key, and mutations invalidate keys so that
/// every reader refetches on its next access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKey {
    Health,
    Statistics,
    Search,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Health => "health",
            QueryKey::Statistics => "statistics",
            QueryKey::Search => "search",
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys that go stale whenever terminology data is ingested, loaded or cleared.
pub const DATA_MUTATION_KEYS: [QueryKey; 2] = [QueryKey::Statistics, QueryKey::Search];

/// Lifecycle of a single request issued by a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl RequestStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading)
    }
}
