//! Pass/fail classification and the two splitting strategies.
//!
//! [`partition`] is the default entry point: it leaves the input untouched and
//! returns graded copies split into passed and failed. [`partition_in_place`]
//! instead grades the input, keeps the passed records in it, and hands back
//! the failed ones. Both preserve input order within each group.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::record::{GradePolicy, StudentRecord};
use crate::sequence::RecordSequence;

/// Minimum final grade that counts as a pass (inclusive).
pub const DEFAULT_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Passed,
    Failed,
}

/// Passed and failed records produced by a copying split.
#[derive(Debug, Clone, Default)]
pub struct Split<S> {
    pub passed: S,
    pub failed: S,
}

impl<S: RecordSequence> Split<S> {
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }
}

/// Classifies a graded record against `threshold`.
///
/// # Errors
///
/// Returns [`GradeError::UncomputedGrade`](crate::error::GradeError::UncomputedGrade)
/// if the record has no computed grade.
pub fn classify(record: &StudentRecord, threshold: f64) -> Result<Outcome> {
    if record.final_grade()? >= threshold {
        Ok(Outcome::Passed)
    } else {
        Ok(Outcome::Failed)
    }
}

/// Computes the final grade of every record with `policy`.
pub fn grade_all<S: RecordSequence>(records: &mut S, policy: GradePolicy) {
    for record in records.iter_mut() {
        record.compute_final_grade(policy);
    }
}

/// Stable sort by `(surname, first_name)`.
pub fn sort_by_name<S: RecordSequence>(records: &mut S) {
    records.stable_sort_by(StudentRecord::cmp_by_name);
}

/// Grades copies of `records` with `policy` and splits them by `threshold`.
///
/// The input is left exactly as it was.
pub fn partition<S: RecordSequence>(
    records: &S,
    policy: GradePolicy,
    threshold: f64,
) -> Result<Split<S>> {
    let mut split = Split::<S>::default();
    for record in records.iter() {
        let mut graded = record.clone();
        graded.compute_final_grade(policy);
        match classify(&graded, threshold)? {
            Outcome::Passed => split.passed.push(graded),
            Outcome::Failed => split.failed.push(graded),
        }
    }
    debug!(
        passed = split.passed.len(),
        failed = split.failed.len(),
        "Partitioned by copy"
    );
    Ok(split)
}

/// Grades `records` in place with `policy`, leaves only passed records in it,
/// and returns the failed records.
pub fn partition_in_place<S: RecordSequence>(
    records: &mut S,
    policy: GradePolicy,
    threshold: f64,
) -> Result<S> {
    grade_all(records, policy);
    move_failed(records, threshold)
}

/// Copies already graded records into passed and failed groups.
///
/// # Errors
///
/// Fails with `UncomputedGrade` on the first ungraded record.
pub fn split_copy<S: RecordSequence>(records: &S, threshold: f64) -> Result<Split<S>> {
    let mut split = Split::<S>::default();
    for record in records.iter() {
        match classify(record, threshold)? {
            Outcome::Passed => split.passed.push(record.clone()),
            Outcome::Failed => split.failed.push(record.clone()),
        }
    }
    Ok(split)
}

/// Moves already graded failed records out of `records` and returns them.
///
/// Every record is checked before anything moves, so an error leaves
/// `records` unchanged.
pub fn move_failed<S: RecordSequence>(records: &mut S, threshold: f64) -> Result<S> {
    for record in records.iter() {
        classify(record, threshold)?;
    }

    let split = records.stable_partition(|r| matches!(classify(r, threshold), Ok(Outcome::Passed)));
    let failed = records.split_off(split);
    debug!(passed = records.len(), failed = failed.len(), "Moved failed records");
    Ok(failed)
}
