//! Consistency check types
//!
//! Reports how the live collection compares with the persisted snapshot,
//! the map overlays and the native engine.

use fence_meta::FenceId;
use serde::{Deserialize, Serialize};

/// Status of the consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Every representation agrees
    Healthy,
    /// Something that should exist is absent (record, overlay)
    Missing,
    /// Representations exist but disagree
    Drifted,
    /// The snapshot could not be read
    Broken,
}

/// A geofence whose representations disagree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftItem {
    pub id: FenceId,
    /// Human-readable description of the drift
    pub description: String,
}

impl DriftItem {
    pub fn new(id: &FenceId, description: impl Into<String>) -> Self {
        Self {
            id: id.clone(),
            description: description.into(),
        }
    }
}

/// Report from a consistency check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub status: CheckStatus,
    pub drifted: Vec<DriftItem>,
    pub missing: Vec<DriftItem>,
    pub messages: Vec<String>,
}

impl ConsistencyReport {
    pub fn healthy() -> Self {
        Self {
            status: CheckStatus::Healthy,
            drifted: Vec::new(),
            missing: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// A report with `missing` items, or a healthy one if there are none
    pub fn with_missing(missing: Vec<DriftItem>) -> Self {
        let status = if missing.is_empty() {
            CheckStatus::Healthy
        } else {
            CheckStatus::Missing
        };
        Self {
            status,
            missing,
            ..Self::healthy()
        }
    }

    /// A report with `drifted` items, or a healthy one if there are none
    pub fn with_drifted(drifted: Vec<DriftItem>) -> Self {
        let status = if drifted.is_empty() {
            CheckStatus::Healthy
        } else {
            CheckStatus::Drifted
        };
        Self {
            status,
            drifted,
            ..Self::healthy()
        }
    }

    pub fn broken(message: String) -> Self {
        Self {
            status: CheckStatus::Broken,
            messages: vec![message],
            ..Self::healthy()
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == CheckStatus::Healthy
    }

    /// Merge two reports, keeping the worst status:
    /// Broken > Drifted > Missing > Healthy
    pub fn merge(mut self, other: ConsistencyReport) -> Self {
        self.drifted.extend(other.drifted);
        self.missing.extend(other.missing);
        self.messages.extend(other.messages);

        self.status = match (self.status, other.status) {
            (CheckStatus::Broken, _) | (_, CheckStatus::Broken) => CheckStatus::Broken,
            (CheckStatus::Drifted, _) | (_, CheckStatus::Drifted) => CheckStatus::Drifted,
            (CheckStatus::Missing, _) | (_, CheckStatus::Missing) => CheckStatus::Missing,
            (CheckStatus::Healthy, CheckStatus::Healthy) => CheckStatus::Healthy,
        };

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> DriftItem {
        DriftItem::new(&FenceId::from_raw(id), "test")
    }

    #[test]
    fn test_empty_lists_stay_healthy() {
        assert!(ConsistencyReport::with_missing(Vec::new()).is_healthy());
        assert!(ConsistencyReport::with_drifted(Vec::new()).is_healthy());
    }

    #[test]
    fn test_merge_keeps_worst_status() {
        let merged = ConsistencyReport::with_missing(vec![item("1|1")])
            .merge(ConsistencyReport::with_drifted(vec![item("2|2")]));
        assert_eq!(merged.status, CheckStatus::Drifted);
        assert_eq!(merged.missing.len(), 1);
        assert_eq!(merged.drifted.len(), 1);

        let broken = merged.merge(ConsistencyReport::broken("unreadable".to_string()));
        assert_eq!(broken.status, CheckStatus::Broken);
        assert_eq!(broken.messages, vec!["unreadable".to_string()]);
    }
}
