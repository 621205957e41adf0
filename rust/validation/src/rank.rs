// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-candidate ranking.

use scenesmith_core::ValidationReport;
use std::cmp::Ordering;

/// Order candidate reports best-first: passing candidates before failing
/// ones, then by descending score. The sort is stable, so candidates
/// that tie keep their submission order.
///
/// Returns the indices into `reports` in ranked order; `ranking[0]` is
/// the winner.
pub fn rank_reports(reports: &[ValidationReport]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..reports.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = &reports[a];
        let rb = &reports[b];
        rb.passed
            .cmp(&ra.passed)
            .then_with(|| rb.score.partial_cmp(&ra.score).unwrap_or(Ordering::Equal))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(passed: bool, score: f64) -> ValidationReport {
        ValidationReport {
            passed,
            score,
            checks: vec![],
            summary: String::new(),
        }
    }

    #[test]
    fn test_passing_beats_higher_scoring_failure() {
        // A passed with lower score, B failed with higher score
        let reports = vec![report(false, 0.917), report(true, 0.833)];
        assert_eq!(rank_reports(&reports), vec![1, 0]);
    }

    #[test]
    fn test_score_breaks_ties_within_verdict() {
        let reports = vec![report(true, 0.833), report(true, 1.0), report(false, 0.5)];
        assert_eq!(rank_reports(&reports), vec![1, 0, 2]);
    }

    #[test]
    fn test_stable_for_equal_candidates() {
        let reports = vec![report(true, 0.9), report(true, 0.9), report(true, 0.9)];
        assert_eq!(rank_reports(&reports), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_reports(&[]).is_empty());
    }
}
