//! Random student generation.
//!
//! The random source is always supplied by the caller. [`seeded_rng`] builds a
//! reproducible one from an optional seed.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::GradeError;
use crate::record::StudentRecord;
use crate::sequence::RecordSequence;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 10;

/// Returns a generator seeded with `seed`, or from the OS when `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Builds the record at zero-based `index` with `homework_count` random
/// homework scores and a random exam score.
pub fn random_record<R: Rng>(
    index: usize,
    homework_count: usize,
    rng: &mut R,
) -> StudentRecord {
    let homework = (0..homework_count)
        .map(|_| rng.random_range(MIN_SCORE..=MAX_SCORE))
        .collect();
    let exam = rng.random_range(MIN_SCORE..=MAX_SCORE);
    StudentRecord::with_scores(
        format!("Name{}", index + 1),
        format!("Surname{}", index + 1),
        homework,
        exam,
    )
}

/// Generates `count` ungraded records into a fresh sequence.
pub fn generate_records<S, R>(count: usize, homework_count: usize, rng: &mut R) -> S
where
    S: RecordSequence,
    R: Rng,
{
    let mut records = S::default();
    records.reserve(count);
    for i in 0..count {
        records.push(random_record(i, homework_count, rng));
    }
    debug!(count, homework_count, container = %S::KIND, "Generated records");
    records
}

/// Writes `records` to `path` in the format read by [`crate::ingest`].
///
/// The header names as many homework columns as the widest record.
pub fn write_dataset<'a>(
    path: impl AsRef<Path>,
    records: impl IntoIterator<Item = &'a StudentRecord> + Clone,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| GradeError::io(path, e))?;
    let mut out = BufWriter::new(file);

    let columns = records
        .clone()
        .into_iter()
        .map(|r| r.homework_scores().len())
        .max()
        .unwrap_or(0);

    write!(out, "{:<15} {:<15} ", "FirstName", "Surname")?;
    for i in 1..=columns {
        write!(out, "{:<5} ", format!("HW{i}"))?;
    }
    writeln!(out, "Exam")?;

    let mut rows = 0usize;
    for record in records {
        write!(out, "{:<15} {:<15} ", record.first_name(), record.surname())?;
        for score in record.homework_scores() {
            write!(out, "{score:<5} ")?;
        }
        writeln!(out, "{}", record.exam_score())?;
        rows += 1;
    }
    out.flush()?;

    info!(path = %path.display(), rows, "Dataset written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{Ingested, load_records};
    use std::collections::VecDeque;

    #[test]
    fn test_random_record_names_and_ranges() {
        let mut rng = seeded_rng(Some(7));
        let r = random_record(0, 15, &mut rng);
        assert_eq!(r.first_name(), "Name1");
        assert_eq!(r.surname(), "Surname1");
        assert_eq!(r.homework_scores().len(), 15);
        assert!(
            r.homework_scores()
                .iter()
                .chain(std::iter::once(&r.exam_score()))
                .all(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
        );
        assert!(!r.is_graded());
    }

    #[test]
    fn test_same_seed_same_records() {
        let a: Vec<StudentRecord> = generate_records(50, 5, &mut seeded_rng(Some(42)));
        let b: Vec<StudentRecord> = generate_records(50, 5, &mut seeded_rng(Some(42)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a: Vec<StudentRecord> = generate_records(50, 5, &mut seeded_rng(Some(1)));
        let b: Vec<StudentRecord> = generate_records(50, 5, &mut seeded_rng(Some(2)));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_into_deque() {
        let records: VecDeque<StudentRecord> = generate_records(3, 2, &mut seeded_rng(Some(3)));
        let names: Vec<_> = records.iter().map(|r| r.first_name()).collect();
        assert_eq!(names, ["Name1", "Name2", "Name3"]);
    }

    #[test]
    fn test_dataset_round_trips_through_ingest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.txt");
        let records: Vec<StudentRecord> = generate_records(25, 4, &mut seeded_rng(Some(9)));

        write_dataset(&path, &records).unwrap();
        let Ingested { records: loaded, skipped } = load_records::<Vec<StudentRecord>>(&path).unwrap();

        assert_eq!(skipped, 0);
        assert_eq!(loaded, records);
    }
}
