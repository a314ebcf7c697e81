//! Container benchmark.
//!
//! For each size, times record generation, name sorting, both splitting
//! strategies, and optionally writing the passed and failed files, on one
//! [`RecordSequence`] type.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::generate::generate_records;
use crate::grading::{grade_all, move_failed, sort_by_name, split_copy};
use crate::output::write_grades_file;
use crate::record::GradePolicy;
use crate::sequence::{ContainerKind, RecordSequence};

pub const DEFAULT_SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Timings for one container at one size, in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct BenchTimings {
    pub timestamp: DateTime<Utc>,
    pub container: ContainerKind,
    pub size: usize,
    pub generate_ms: u64,
    pub sort_ms: u64,
    pub split_copy_ms: u64,
    pub move_failed_ms: u64,
    pub write_ms: Option<u64>,
    pub passed: usize,
    pub failed: usize,
}

/// Benchmark settings shared across containers.
#[derive(Debug, Clone)]
pub struct BenchOptions<'a> {
    pub sizes: &'a [usize],
    pub homework_count: usize,
    pub threshold: f64,
    /// Directory for `students_{N}_{passed|failed}_{container}.txt`; `None` skips writing.
    pub out_dir: Option<&'a Path>,
}

fn time<T>(f: impl FnOnce() -> T) -> (T, u64) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed().as_millis() as u64)
}

/// Runs every size in `options` on the sequence type `S`.
#[tracing::instrument(skip(options, rng), fields(container = %S::KIND))]
pub fn run_container<S, R>(options: &BenchOptions<'_>, rng: &mut R) -> Result<Vec<BenchTimings>>
where
    S: RecordSequence,
    R: Rng,
{
    let mut results = Vec::with_capacity(options.sizes.len());

    for &size in options.sizes {
        let (mut students, generate_ms) = time(|| {
            let mut students: S = generate_records(size, options.homework_count, rng);
            grade_all(&mut students, GradePolicy::Average);
            students
        });

        let ((), sort_ms) = time(|| sort_by_name(&mut students));

        let (split, split_copy_ms) = time(|| split_copy(&students, options.threshold));
        let split = split?;

        let mut kept = students.clone();
        let (failed, move_failed_ms) = time(|| move_failed(&mut kept, options.threshold));
        let failed = failed?;

        debug_assert_eq!(split.passed.len(), kept.len());
        debug_assert_eq!(split.failed.len(), failed.len());

        let write_ms = match options.out_dir {
            Some(dir) => {
                let (written, ms) = time(|| write_split(dir, size, S::KIND, &kept, &failed));
                written?;
                Some(ms)
            }
            None => None,
        };

        let timings = BenchTimings {
            timestamp: Utc::now(),
            container: S::KIND,
            size,
            generate_ms,
            sort_ms,
            split_copy_ms,
            move_failed_ms,
            write_ms,
            passed: kept.len(),
            failed: failed.len(),
        };

        info!(
            size,
            generate_ms,
            sort_ms,
            split_copy_ms,
            move_failed_ms,
            write_ms = ?write_ms,
            passed = timings.passed,
            failed = timings.failed,
            "Benchmark round finished"
        );
        results.push(timings);
    }

    Ok(results)
}

/// Runs [`run_container`] for the sequence type named by `kind`.
pub fn run_kind<R: Rng>(
    kind: ContainerKind,
    options: &BenchOptions<'_>,
    rng: &mut R,
) -> Result<Vec<BenchTimings>> {
    use crate::record::StudentRecord;
    use std::collections::{LinkedList, VecDeque};

    match kind {
        ContainerKind::Vector => run_container::<Vec<StudentRecord>, _>(options, rng),
        ContainerKind::List => run_container::<LinkedList<StudentRecord>, _>(options, rng),
        ContainerKind::Deque => run_container::<VecDeque<StudentRecord>, _>(options, rng),
    }
}

fn write_split<S: RecordSequence>(
    dir: &Path,
    size: usize,
    kind: ContainerKind,
    passed: &S,
    failed: &S,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_grades_file(
        dir.join(format!("students_{size}_passed_{kind}.txt")),
        passed.iter(),
        false,
    )?;
    write_grades_file(
        dir.join(format!("students_{size}_failed_{kind}.txt")),
        failed.iter(),
        false,
    )?;
    Ok(())
}
