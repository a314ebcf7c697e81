//! The student record and its grade formulas.
//!
//! A record's final grade is derived from its homework and exam scores and
//! is only stored when one of the `compute_*` methods runs. Score setters do
//! not touch the stored grade, so callers recompute after mutating scores.

use std::cmp::Ordering;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result};
use crate::utility::{mean, median};

/// Weight of the homework component in the final grade.
pub const HOMEWORK_WEIGHT: f64 = 0.4;
/// Weight of the exam component in the final grade.
pub const EXAM_WEIGHT: f64 = 0.6;

/// How the homework scores are reduced to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GradePolicy {
    #[default]
    Average,
    Median,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StudentRecord {
    first_name: String,
    surname: String,
    homework: Vec<i32>,
    exam: i32,
    final_grade: Option<f64>,
}

impl StudentRecord {
    pub fn new(first_name: impl Into<String>, surname: impl Into<String>) -> Self {
        StudentRecord {
            first_name: first_name.into(),
            surname: surname.into(),
            ..Default::default()
        }
    }

    pub fn with_scores(
        first_name: impl Into<String>,
        surname: impl Into<String>,
        homework: Vec<i32>,
        exam: i32,
    ) -> Self {
        StudentRecord {
            homework,
            exam,
            ..Self::new(first_name, surname)
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn homework_scores(&self) -> &[i32] {
        &self.homework
    }

    pub fn exam_score(&self) -> i32 {
        self.exam
    }

    pub fn add_homework_score(&mut self, value: i32) {
        self.homework.push(value);
    }

    pub fn set_homework_scores(&mut self, scores: Vec<i32>) {
        self.homework = scores;
    }

    pub fn set_exam_score(&mut self, value: i32) {
        self.exam = value;
    }

    /// Sets the final grade to `0.4 * mean(homework) + 0.6 * exam`.
    ///
    /// With no homework scores the grade is the exam score.
    pub fn compute_final_grade_by_average(&mut self) {
        self.final_grade = Some(self.weighted(mean));
    }

    /// Sets the final grade to `0.4 * median(homework) + 0.6 * exam`.
    ///
    /// With no homework scores the grade is the exam score.
    pub fn compute_final_grade_by_median(&mut self) {
        self.final_grade = Some(self.weighted(median));
    }

    pub fn compute_final_grade(&mut self, policy: GradePolicy) {
        match policy {
            GradePolicy::Average => self.compute_final_grade_by_average(),
            GradePolicy::Median => self.compute_final_grade_by_median(),
        }
    }

    /// Returns the last computed final grade.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError::UncomputedGrade`] if no compute step has run.
    pub fn final_grade(&self) -> Result<f64> {
        self.final_grade.ok_or_else(|| GradeError::UncomputedGrade {
            first_name: self.first_name.clone(),
            surname: self.surname.clone(),
        })
    }

    pub fn is_graded(&self) -> bool {
        self.final_grade.is_some()
    }

    /// Orders records by `(surname, first_name)`, case-sensitive byte order.
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.surname
            .cmp(&other.surname)
            .then_with(|| self.first_name.cmp(&other.first_name))
    }

    fn weighted(&self, reduce: fn(&[f64]) -> f64) -> f64 {
        if self.homework.is_empty() {
            return f64::from(self.exam);
        }
        let scores: Vec<f64> = self.homework.iter().copied().map(f64::from).collect();
        HOMEWORK_WEIGHT * reduce(&scores) + EXAM_WEIGHT * f64::from(self.exam)
    }

    #[cfg(test)]
    pub(crate) fn graded(first_name: &str, surname: &str, grade: f64) -> Self {
        StudentRecord {
            final_grade: Some(grade),
            ..Self::new(first_name, surname)
        }
    }
}
