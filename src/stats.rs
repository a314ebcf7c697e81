use serde::Serialize;

use crate::error::Result;
use crate::grading::{Outcome, classify};
use crate::record::StudentRecord;
use crate::utility::{mean, stddev};

/// Summary of the final grades in a record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    pub total: usize,
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
    pub stddev: f64,
    pub passed: usize,
    pub method: String,
}

impl GradeSummary {
    /// Summarizes already graded records. Returns `None` for an empty set.
    ///
    /// `threshold` decides the `passed` count; `method` is carried through
    /// as a label for reports.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a StudentRecord>,
        threshold: f64,
        method: &str,
    ) -> Result<Option<Self>> {
        let mut grades = Vec::new();
        let mut passed = 0;
        for record in records {
            grades.push(record.final_grade()?);
            if classify(record, threshold)? == Outcome::Passed {
                passed += 1;
            }
        }

        if grades.is_empty() {
            return Ok(None);
        }

        let average = mean(&grades);
        Ok(Some(GradeSummary {
            total: grades.len(),
            average,
            highest: grades.iter().copied().fold(f64::MIN, f64::max),
            lowest: grades.iter().copied().fold(f64::MAX, f64::min),
            stddev: stddev(&grades, average),
            passed,
            method: method.to_string(),
        }))
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn pass_pct(&self) -> f64 {
        Self::pct(self.passed, self.total)
    }
}
