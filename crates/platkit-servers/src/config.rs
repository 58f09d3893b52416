//! Query settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for a rules query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// How long to wait for each datagram.
    pub timeout: Duration,

    /// Upper bound on datagrams read for one query, challenge included.
    /// Split replies from busy servers commonly use 3 or 4.
    pub max_packets: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            max_packets: 16,
        }
    }
}
