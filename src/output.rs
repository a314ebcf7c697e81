//! Output formatting and persistence for graded records.
//!
//! Supports the console grade table, space-delimited grade exports (plain or
//! gzip), JSON logging, and CSV append for benchmark rows.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::GradeError;
use crate::grading::sort_by_name;
use crate::record::{GradePolicy, StudentRecord};
use crate::sequence::RecordSequence;

const REPORT_WIDTH: usize = 80;
const NAME_WIDTH: usize = 20;
const GRADE_WIDTH: usize = 20;

/// Which final grade columns a report shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GradeColumns {
    #[default]
    Average,
    Median,
    Both,
}

impl GradeColumns {
    pub fn policies(self) -> &'static [GradePolicy] {
        match self {
            GradeColumns::Average => &[GradePolicy::Average],
            GradeColumns::Median => &[GradePolicy::Median],
            GradeColumns::Both => &[GradePolicy::Average, GradePolicy::Median],
        }
    }

    /// The policy whose grade stays on the records after a report.
    pub fn primary(self) -> GradePolicy {
        self.policies()[0]
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeColumns::Average => "Average",
            GradeColumns::Median => "Median",
            GradeColumns::Both => "Both Average & Median",
        }
    }

    fn header(policy: GradePolicy) -> &'static str {
        match policy {
            GradePolicy::Average => "Final (Avg.)",
            GradePolicy::Median => "Final (Med.)",
        }
    }
}

/// Sorts `records` by name, grades them, and renders the grade table.
///
/// Every requested column is computed per record; the records are left
/// graded with [`GradeColumns::primary`].
pub fn render_report<S: RecordSequence>(records: &mut S, columns: GradeColumns) -> Result<String> {
    let mut out = String::new();
    if records.is_empty() {
        writeln!(out, "No students to display.")?;
        return Ok(out);
    }

    sort_by_name(records);

    let rule = "=".repeat(REPORT_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "STUDENT GRADE REPORT")?;
    writeln!(out, "{rule}")?;
    write!(out, "{:<NAME_WIDTH$}{:<NAME_WIDTH$}", "First Name", "Last Name")?;
    for &policy in columns.policies() {
        write!(out, "{:>GRADE_WIDTH$}", GradeColumns::header(policy))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(REPORT_WIDTH))?;

    for record in records.iter_mut() {
        write!(
            out,
            "{:<NAME_WIDTH$}{:<NAME_WIDTH$}",
            record.first_name(),
            record.surname()
        )?;
        for &policy in columns.policies() {
            record.compute_final_grade(policy);
            write!(out, "{:>GRADE_WIDTH$.2}", record.final_grade()?)?;
        }
        record.compute_final_grade(columns.primary());
        writeln!(out)?;
    }
    writeln!(out, "{rule}")?;

    Ok(out)
}

#[derive(Serialize)]
struct GradeRow<'a> {
    first_name: &'a str,
    surname: &'a str,
    final_grade: String,
}

/// Writes graded records as space-delimited `first_name surname final_grade`
/// rows under a header line. Returns the number of rows written.
pub fn write_grades<'a, W: Write>(
    writer: W,
    records: impl IntoIterator<Item = &'a StudentRecord>,
) -> Result<usize> {
    let mut writer = WriterBuilder::new().delimiter(b' ').from_writer(writer);

    let mut rows = 0;
    for record in records {
        writer.serialize(GradeRow {
            first_name: record.first_name(),
            surname: record.surname(),
            final_grade: format!("{:.2}", record.final_grade()?),
        })?;
        rows += 1;
    }
    writer.flush()?;

    Ok(rows)
}

/// Writes graded records to `path`, gzip-compressed when `gzip` is set.
pub fn write_grades_file<'a>(
    path: impl AsRef<Path>,
    records: impl IntoIterator<Item = &'a StudentRecord>,
    gzip: bool,
) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| GradeError::io(path, e))?;

    let rows = if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        let rows = write_grades(&mut encoder, records)?;
        encoder.finish()?;
        rows
    } else {
        write_grades(file, records)?
    };

    debug!(path = %path.display(), rows, gzip, "Grades written");
    Ok(rows)
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a serializable record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: impl AsRef<Path>, record: &impl Serialize) -> Result<()> {
    let path = path.as_ref();
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| GradeError::io(path, e))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::io::Read;

    fn sample() -> Vec<StudentRecord> {
        vec![
            StudentRecord::with_scores("Grace", "Hopper", vec![4, 8], 10),
            StudentRecord::with_scores("Ada", "Lovelace", vec![10, 10, 10], 10),
            StudentRecord::with_scores("Alan", "Hopper", vec![], 3),
        ]
    }

    #[derive(Serialize)]
    struct Row {
        timestamp: u32,
        value: f64,
    }

    #[test]
    fn test_report_sorted_by_surname_then_first_name() {
        let mut records = sample();
        let report = render_report(&mut records, GradeColumns::Average).unwrap();

        let alan = report.find("Alan").unwrap();
        let grace = report.find("Grace").unwrap();
        let ada = report.find("Ada").unwrap();
        assert!(alan < grace && grace < ada);
        assert!(report.contains("Final (Avg.)"));
        assert!(!report.contains("Final (Med.)"));
        assert!(report.contains("10.00"));
        assert!(report.contains("3.00"));
    }

    #[test]
    fn test_report_both_columns() {
        let mut records = sample();
        let report = render_report(&mut records, GradeColumns::Both).unwrap();
        let grace_line = report.lines().find(|l| l.starts_with("Grace")).unwrap();

        // Mean and median of [4, 8] coincide.
        assert_eq!(grace_line.matches("8.40").count(), 2);
        assert!(report.lines().all(|l| l.len() <= REPORT_WIDTH));
        assert!(records.iter().all(|r| r.is_graded()));
    }

    #[test]
    fn test_report_leaves_primary_grade() {
        let mut records = vec![StudentRecord::with_scores("A", "B", vec![1, 1, 10], 5)];
        render_report(&mut records, GradeColumns::Both).unwrap();
        assert_eq!(records[0].final_grade().unwrap(), 0.4 * 4.0 + 0.6 * 5.0);
    }

    #[test]
    fn test_report_empty() {
        let mut records: Vec<StudentRecord> = Vec::new();
        let report = render_report(&mut records, GradeColumns::Median).unwrap();
        assert_eq!(report.trim(), "No students to display.");
    }

    #[test]
    fn test_write_grades_rows() {
        let records = vec![
            StudentRecord::graded("Ada", "Lovelace", 9.5),
            StudentRecord::graded("Alan", "Turing", 4.994),
        ];
        let mut buf = Vec::new();
        let rows = write_grades(&mut buf, &records).unwrap();

        assert_eq!(rows, 2);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, ["first_name surname final_grade", "Ada Lovelace 9.50", "Alan Turing 4.99"]);
    }

    #[test]
    fn test_write_grades_uncomputed_fails() {
        let records = vec![StudentRecord::new("Ada", "Lovelace")];
        assert!(write_grades(Vec::new(), &records).is_err());
    }

    #[test]
    fn test_write_grades_file_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passed.txt.gz");
        let records = vec![StudentRecord::graded("Ada", "Lovelace", 7.0)];

        write_grades_file(&path, &records, true).unwrap();

        let mut text = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert!(text.ends_with("Ada Lovelace 7.00\n"));
    }

    #[test]
    fn test_write_grades_file_bad_directory() {
        let records = vec![StudentRecord::graded("Ada", "Lovelace", 7.0)];
        let err = write_grades_file("no/such/dir/out.txt", &records, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GradeError>(),
            Some(GradeError::IoUnavailable { .. })
        ));
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&Row { timestamp: 1, value: 2.0 }).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.csv");

        append_record(&path, &Row { timestamp: 1, value: 2.0 }).unwrap();
        append_record(&path, &Row { timestamp: 2, value: 3.0 }).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 data rows
        assert_eq!(content.lines().count(), 3);
    }
}
