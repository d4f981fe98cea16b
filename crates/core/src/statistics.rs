//! Statistics and health payloads and the summary cards built from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheStats {
    pub keys: u64,
}

/// Data-store metrics. Missing fields read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub total_terms: u64,
    pub category_count: u64,
    pub index_size: u64,
    pub cache_stats: CacheStats,
}

/// Envelope returned by the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatisticsResponse {
    #[serde(default)]
    pub statistics: Option<Statistics>,
}

impl StatisticsResponse {
    pub fn statistics_or_default(&self) -> Statistics {
        self.statistics.unwrap_or_default()
    }
}

/// Health endpoint payload; fields other than `status` are kept for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "ok" | "healthy" | "up" | "pass"
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: u64,
}

/// The four cards shown on the dashboard and admin pages, in display order.
pub fn stat_cards(statistics: &Statistics) -> Vec<StatCard> {
    vec![
        StatCard {
            label: "Total Terms",
            value: statistics.total_terms,
        },
        StatCard {
            label: "Categories",
            value: statistics.category_count,
        },
        StatCard {
            label: "Index Size",
            value: statistics.index_size,
        },
        StatCard {
            label: "Cache Keys",
            value: statistics.cache_stats.keys,
        },
    ]
}
