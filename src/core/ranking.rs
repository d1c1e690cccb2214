//! Cohort ranking.
//!
//! The candidate is tracked by its index in the unsorted cohort. Two students
//! can carry identical scores, so comparing values would find the wrong entry.

use std::cmp::Ordering;

use super::types::Student;

/// A cohort sorted by total score, highest first
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCohort {
    pub rankings: Vec<Student>,
    /// 1-based position of the candidate in `rankings`
    pub candidate_rank: usize,
}

/// Sort `cohort` by total score descending and locate the candidate.
///
/// The sort is stable: students with equal totals keep their input order.
/// `-0.0` and `0.0` count as equal.
/// Returns `None` if `candidate_index` is outside the cohort.
pub fn rank_cohort(cohort: Vec<Student>, candidate_index: usize) -> Option<RankedCohort> {
    if candidate_index >= cohort.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..cohort.len()).collect();
    order.sort_by(|&a, &b| {
        cohort[b]
            .total_score
            .partial_cmp(&cohort[a].total_score)
            .unwrap_or(Ordering::Equal)
    });

    let position = order.iter().position(|&index| index == candidate_index)?;
    let rankings = order.into_iter().map(|index| cohort[index]).collect();

    Some(RankedCohort {
        rankings,
        candidate_rank: position + 1,
    })
}
