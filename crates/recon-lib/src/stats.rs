//! Coverage statistics over a reconciliation result

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::InstanceResult;

/// Agent coverage summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total_hosts: usize,
    pub matched_hosts: usize,
    pub coverage_percent: f64,
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} hosts running an agent ({:.1}%)",
            self.matched_hosts, self.total_hosts, self.coverage_percent
        )
    }
}

/// Derive coverage from the reconciliation sets.
///
/// Total distinct hosts is the inventory side only; agents without
/// inventory do not count toward coverage.
pub fn coverage(result: &InstanceResult) -> CoverageReport {
    let matched_hosts = result.instances_with_agents.len();
    let total_hosts = matched_hosts + result.instances_without_agents.len();
    let coverage_percent = if total_hosts == 0 {
        0.0
    } else {
        matched_hosts as f64 / total_hosts as f64 * 100.0
    };
    CoverageReport {
        total_hosts,
        matched_hosts,
        coverage_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputRecord;

    fn result(matched: usize, without: usize) -> InstanceResult {
        InstanceResult {
            instances_without_agents: (0..without)
                .map(|i| OutputRecord::bare(format!("urn:test:without-{i}")))
                .collect(),
            instances_with_agents: (0..matched)
                .map(|i| OutputRecord::bare(format!("urn:test:matched-{i}")))
                .collect(),
            agents_without_inventory: Vec::new(),
        }
    }

    #[test]
    fn test_zero_hosts_is_zero_percent() {
        let report = coverage(&result(0, 0));
        assert_eq!(report.total_hosts, 0);
        assert_eq!(report.coverage_percent, 0.0);
    }

    #[test]
    fn test_full_coverage_is_one_hundred_percent() {
        let report = coverage(&result(5, 0));
        assert_eq!(report.matched_hosts, 5);
        assert_eq!(report.coverage_percent, 100.0);
    }

    #[test]
    fn test_partial_coverage() {
        let report = coverage(&result(1, 3));
        assert_eq!(report.total_hosts, 4);
        assert!((report.coverage_percent - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_format() {
        let report = coverage(&result(2, 2));
        assert_eq!(report.to_string(), "2/4 hosts running an agent (50.0%)");
    }
}
