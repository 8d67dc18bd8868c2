//! Data quality checks
//!
//! A fixed, ordered battery of checks, each polymorphic over "evaluate a
//! dataset, report the violating rows". New checks are added by appending
//! to the registry; existing identifiers never change, since dashboards
//! and clients key on `check_name`.

use chrono::{DateTime, Utc};
use dqm_common::config::ChecksConfig;
use serde::{Deserialize, Serialize};

use crate::store::Dataset;

mod anomaly_check;
mod duplicate_check;
pub mod executor;
mod null_check;

pub use anomaly_check::AnomalyCheck;
pub use duplicate_check::DuplicateCheck;
pub use null_check::NullCheck;

/// Stable check identifiers.
///
/// The serialized snake_case forms are the wire contract; variants may be
/// appended but never renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    NullCheck,
    DuplicateCheck,
    AnomalyCheck,
}

impl CheckName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::NullCheck => "null_check",
            CheckName::DuplicateCheck => "duplicate_check",
            CheckName::AnomalyCheck => "anomaly_check",
        }
    }
}

/// Pass/fail verdict derived from the per-check tolerance policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
        }
    }
}

/// Raw evaluation output: which rows violated the check's rule
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    /// Indices into the dataset's row sequence, ascending, deduplicated
    pub failed_row_indices: Vec<usize>,
}

/// One check's verdict within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_name: CheckName,
    pub status: CheckStatus,
    pub failed_rows: u64,
}

/// The full result set of one evaluation of one dataset
#[derive(Debug, Clone, Serialize)]
pub struct CheckRun {
    pub dataset_id: i64,
    pub overall_score: u8,
    pub checks: Vec<CheckResult>,
    #[serde(skip)]
    pub completed_at: DateTime<Utc>,
}

/// A single validation rule. Implementations are stateless and
/// independent; evaluation never mutates the dataset.
pub trait Check: Send + Sync {
    fn name(&self) -> CheckName;
    fn evaluate(&self, dataset: &Dataset) -> CheckOutcome;
}

/// Ordered, fixed list of checks, built once at startup
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
    tolerance: u64,
}

impl CheckRegistry {
    /// The standard battery, in contract order
    pub fn standard(config: ChecksConfig) -> Self {
        Self {
            checks: vec![
                Box::new(NullCheck),
                Box::new(DuplicateCheck),
                Box::new(AnomalyCheck::new(config.anomaly_sigma)),
            ],
            tolerance: config.tolerance,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.iter().map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Violating rows tolerated before a check FAILs
    pub fn tolerance(&self) -> u64 {
        self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_names_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&CheckName::NullCheck).unwrap(),
            "\"null_check\""
        );
        assert_eq!(
            serde_json::to_string(&CheckName::AnomalyCheck).unwrap(),
            "\"anomaly_check\""
        );
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&CheckStatus::Pass).unwrap(), "\"PASS\"");
        assert_eq!(serde_json::to_string(&CheckStatus::Fail).unwrap(), "\"FAIL\"");
    }

    #[test]
    fn standard_registry_order_is_stable() {
        let registry = CheckRegistry::standard(ChecksConfig::default());
        let names: Vec<&str> = registry.iter().map(|c| c.name().as_str()).collect();
        assert_eq!(names, vec!["null_check", "duplicate_check", "anomaly_check"]);
    }
}
