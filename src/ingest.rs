//! Parser for whitespace-delimited student files.
//!
//! The first line is a header. Every other line holds
//! `first_name surname score1 ... scoreK`, where the last score is the exam
//! and the rest are homework. Malformed lines are skipped and counted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{GradeError, Result};
use crate::record::StudentRecord;
use crate::sequence::RecordSequence;

/// Records read from an input, plus the number of lines that were rejected.
#[derive(Debug)]
pub struct Ingested<S> {
    pub records: S,
    pub skipped: usize,
}

/// Parses one data line. `line_no` is 1-based and only used in errors.
///
/// Scores are read until the first token that is not an integer.
pub fn parse_line(line_no: usize, line: &str) -> Result<StudentRecord> {
    let invalid = |reason: &str| GradeError::InvalidRecordLine {
        line: line_no,
        reason: reason.to_string(),
    };

    let mut tokens = line.split_whitespace();
    let first_name = tokens.next().ok_or_else(|| invalid("missing first name"))?;
    let surname = tokens.next().ok_or_else(|| invalid("missing surname"))?;

    let mut scores: Vec<i32> = tokens.map_while(|t| t.parse().ok()).collect();
    let exam = scores.pop().ok_or_else(|| invalid("no scores"))?;

    Ok(StudentRecord::with_scores(first_name, surname, scores, exam))
}

/// Reads records from `reader`, skipping the header line and blank lines.
///
/// `source` names the input in I/O errors. A line that is not valid UTF-8 is
/// skipped and counted like any other malformed line.
pub fn read_records<S, R>(reader: R, source: &Path) -> Result<Ingested<S>>
where
    S: RecordSequence,
    R: BufRead,
{
    let mut lines = reader.split(b'\n');
    let mut records = S::default();
    let mut skipped = 0;

    match lines.next() {
        Some(header) => {
            let header = header.map_err(|e| GradeError::io(source, e))?;
            debug!(header = %String::from_utf8_lossy(&header).trim_end(), "Skipped header");
        }
        None => {
            warn!("Input is empty");
            return Ok(Ingested { records, skipped });
        }
    }

    for (idx, bytes) in lines.enumerate() {
        let bytes = bytes.map_err(|e| GradeError::io(source, e))?;
        // Header is line 1.
        let line_no = idx + 2;
        let parsed = match std::str::from_utf8(&bytes) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => parse_line(line_no, line),
            Err(_) => Err(GradeError::InvalidRecordLine {
                line: line_no,
                reason: "not valid UTF-8".to_string(),
            }),
        };
        match parsed {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(error = %e, "Skipping line");
                skipped += 1;
            }
        }
    }

    debug!(records = records.len(), skipped, "Finished reading records");
    Ok(Ingested { records, skipped })
}

/// Opens `path` and reads records from it. `-` reads standard input.
///
/// # Errors
///
/// Returns [`GradeError::IoUnavailable`] if the file cannot be opened or a
/// read fails partway through.
pub fn load_records<S: RecordSequence>(path: impl AsRef<Path>) -> Result<Ingested<S>> {
    let path = path.as_ref();
    if path == Path::new("-") {
        return read_records(std::io::stdin().lock(), Path::new("<stdin>"));
    }
    let file = File::open(path).map_err(|e| GradeError::io(path, e))?;
    read_records(BufReader::new(file), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::LinkedList;

    #[test]
    fn test_parse_line_splits_exam_from_homework() {
        let r = parse_line(2, "Ada Lovelace 7 8 9 10").unwrap();
        assert_eq!(r.first_name(), "Ada");
        assert_eq!(r.surname(), "Lovelace");
        assert_eq!(r.homework_scores(), &[7, 8, 9]);
        assert_eq!(r.exam_score(), 10);
        assert!(!r.is_graded());
    }

    #[test]
    fn test_parse_line_exam_only() {
        let r = parse_line(2, "Ada Lovelace 6").unwrap();
        assert!(r.homework_scores().is_empty());
        assert_eq!(r.exam_score(), 6);
    }

    #[test]
    fn test_parse_line_stops_at_non_numeric_token() {
        let r = parse_line(2, "Ada Lovelace 4 5 x 9").unwrap();
        assert_eq!(r.homework_scores(), &[4]);
        assert_eq!(r.exam_score(), 5);
    }

    #[test]
    fn test_parse_line_without_scores_is_invalid() {
        let err = parse_line(5, "Ada Lovelace").unwrap_err();
        assert!(matches!(err, GradeError::InvalidRecordLine { line: 5, .. }));
    }

    #[test]
    fn test_parse_line_missing_surname_is_invalid() {
        assert!(parse_line(3, "Ada").is_err());
    }

    #[test]
    fn test_read_records_skips_header_and_bad_lines() {
        let input = "\
FirstName Surname HW1 HW2 Exam
Ada Lovelace 9 10 8

Alan Turing
Grace Hopper 7 7 7
Bad
";
        let ingested: Ingested<Vec<StudentRecord>> =
            read_records(input.as_bytes(), Path::new("students.txt")).unwrap();
        assert_eq!(ingested.records.len(), 2);
        assert_eq!(ingested.skipped, 2);
        assert_eq!(ingested.records[1].surname(), "Hopper");
    }

    #[test]
    fn test_read_records_empty_input() {
        let ingested: Ingested<Vec<StudentRecord>> =
            read_records("".as_bytes(), Path::new("students.txt")).unwrap();
        assert!(ingested.records.is_empty());
        assert_eq!(ingested.skipped, 0);
    }

    #[test]
    fn test_read_records_into_list() {
        let input = "header\nA B 1 2\nC D 3 4\n";
        let ingested: Ingested<LinkedList<StudentRecord>> =
            read_records(input.as_bytes(), Path::new("students.txt")).unwrap();
        let names: Vec<_> = ingested.records.iter().map(|r| r.first_name()).collect();
        assert_eq!(names, ["A", "C"]);
    }

    #[test]
    fn test_read_records_skips_non_utf8_line() {
        let input: &[u8] = b"hdr\nAda Lovelace 9 10\nJos\xe9 Garc\xeda 7 8\nGrace Hopper 7 7\n";
        let ingested: Ingested<Vec<StudentRecord>> =
            read_records(input, Path::new("students.txt")).unwrap();
        let names: Vec<_> = ingested.records.iter().map(|r| r.first_name()).collect();
        assert_eq!(names, ["Ada", "Grace"]);
        assert_eq!(ingested.skipped, 1);
    }

    #[test]
    fn test_read_records_accepts_crlf_lines() {
        let input = "header\r\nA B 1 2\r\n\r\nC D 3 4\r\n";
        let ingested: Ingested<Vec<StudentRecord>> =
            read_records(input.as_bytes(), Path::new("students.txt")).unwrap();
        assert_eq!(ingested.records.len(), 2);
        assert_eq!(ingested.records[1].exam_score(), 4);
        assert_eq!(ingested.skipped, 0);
    }

    struct FailingReader;

    impl std::io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk gone"))
        }
    }

    #[test]
    fn test_read_failure_names_the_source() {
        let reader = BufReader::new(FailingReader);
        let result = read_records::<Vec<StudentRecord>, _>(reader, Path::new("class.txt"));
        match result {
            Err(GradeError::IoUnavailable { path, .. }) => assert_eq!(path, Path::new("class.txt")),
            other => panic!("expected IoUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_load_records_missing_file() {
        let result = load_records::<Vec<StudentRecord>>("definitely/not/here.txt");
        assert!(matches!(result, Err(GradeError::IoUnavailable { .. })));
    }
}
