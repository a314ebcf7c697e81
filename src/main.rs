//! CLI entry point for the student grader.
//!
//! Provides subcommands for printing grade reports, splitting students into
//! passed and failed files, generating random datasets, and benchmarking the
//! record containers.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::{LinkedList, VecDeque};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use student_grader::bench::{self, BenchOptions};
use student_grader::config::GraderConfig;
use student_grader::generate::{generate_records, seeded_rng, write_dataset};
use student_grader::grading::{partition, partition_in_place, sort_by_name};
use student_grader::ingest::load_records;
use student_grader::output::{GradeColumns, append_record, print_json, render_report, write_grades_file};
use student_grader::stats::GradeSummary;
use student_grader::{ContainerKind, GradePolicy, RecordSequence, StudentRecord};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "student_grader")]
#[command(about = "Grade students, split them by pass/fail, and benchmark containers", long_about = None)]
struct Cli {
    /// JSON config file (falls back to $GRADER_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SplitStrategy {
    /// Copy records into new passed and failed collections
    Copy,
    /// Move failed records out, leaving only passed ones
    MoveFailed,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a grade table and summary for a student file
    Report {
        /// Student file, or `-` for stdin
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Grade columns to show
        #[arg(short, long, value_enum, default_value_t = GradeColumns::Average)]
        columns: GradeColumns,

        /// Pass threshold used for the summary
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Also log the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Split a student file into passed.txt and failed.txt
    Split {
        /// Student file, or `-` for stdin
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Homework reduction used for the final grade
        #[arg(short, long, value_enum)]
        policy: Option<GradePolicy>,

        /// Minimum passing grade (inclusive)
        #[arg(short, long)]
        threshold: Option<f64>,

        #[arg(short, long, value_enum, default_value_t = SplitStrategy::Copy)]
        strategy: SplitStrategy,

        /// Backing container for the records
        #[arg(long, value_enum, default_value_t = ContainerKind::Vector)]
        container: ContainerKind,

        /// Directory for the output files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Gzip the output files
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Generate a random student file
    Generate {
        /// Number of students
        #[arg(short = 'n', long)]
        count: usize,

        /// Homework scores per student
        #[arg(long)]
        homework: Option<usize>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// File to write
        #[arg(short, long, default_value = "students.txt")]
        output: PathBuf,
    },
    /// Time generate, sort, split, and write for each container
    Bench {
        /// Container to test; all of them when omitted
        #[arg(short, long, value_enum)]
        container: Option<ContainerKind>,

        /// Student counts to test, e.g. `--sizes 1000,10000`
        #[arg(long, value_delimiter = ',')]
        sizes: Vec<usize>,

        /// Homework scores per student
        #[arg(long)]
        homework: Option<usize>,

        /// Minimum passing grade (inclusive)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,

        /// CSV file to append timing rows to
        #[arg(long)]
        log: Option<PathBuf>,

        /// Write passed/failed files per size into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/student_grader.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("student_grader.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = GraderConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Report {
            source,
            columns,
            threshold,
            json,
        } => {
            report(&source, columns, threshold.unwrap_or(config.threshold), json)?;
        }
        Commands::Split {
            source,
            policy,
            threshold,
            strategy,
            container,
            output_dir,
            gzip,
        } => {
            let args = SplitArgs {
                source: &source,
                policy: policy.unwrap_or(config.policy),
                threshold: threshold.unwrap_or(config.threshold),
                strategy,
                output_dir: &output_dir,
                gzip,
            };
            match container {
                ContainerKind::Vector => split::<Vec<StudentRecord>>(&args)?,
                ContainerKind::List => split::<LinkedList<StudentRecord>>(&args)?,
                ContainerKind::Deque => split::<VecDeque<StudentRecord>>(&args)?,
            }
        }
        Commands::Generate {
            count,
            homework,
            seed,
            output,
        } => {
            let mut rng = seeded_rng(seed.or(config.seed));
            let records: Vec<StudentRecord> =
                generate_records(count, homework.unwrap_or(config.homework_count), &mut rng);
            write_dataset(&output, &records)?;
        }
        Commands::Bench {
            container,
            sizes,
            homework,
            threshold,
            seed,
            log,
            out_dir,
        } => {
            let sizes = if sizes.is_empty() {
                config.bench_sizes.clone()
            } else {
                sizes
            };
            let options = BenchOptions {
                sizes: &sizes,
                homework_count: homework.unwrap_or(config.homework_count),
                threshold: threshold.unwrap_or(config.threshold),
                out_dir: out_dir.as_deref(),
            };
            let kinds = match container {
                Some(kind) => vec![kind],
                None => ContainerKind::ALL.to_vec(),
            };
            run_bench(&kinds, &options, seed.or(config.seed), log.as_deref())?;
        }
    }

    Ok(())
}

/// Prints the grade table and a statistics summary for `source`.
#[tracing::instrument(skip(source, columns, json), fields(source = %source.display()))]
fn report(source: &Path, columns: GradeColumns, threshold: f64, json: bool) -> Result<()> {
    let ingested = load_records::<Vec<StudentRecord>>(source)?;
    info!(
        records = ingested.records.len(),
        skipped = ingested.skipped,
        "Read students"
    );
    let mut students = ingested.records;

    print!("{}", render_report(&mut students, columns)?);

    if let Some(summary) = GradeSummary::from_records(&students, threshold, columns.label())? {
        println!();
        print!("{}", render_summary(&summary));

        if json {
            print_json(&summary)?;
        }
    }

    Ok(())
}

fn render_summary(summary: &GradeSummary) -> String {
    format!(
        "=== STATISTICS SUMMARY ===\n\
         Total Students: {}\n\
         Average Grade: {:.2}\n\
         Highest Grade: {:.2}\n\
         Lowest Grade: {:.2}\n\
         Std. Deviation: {:.2}\n\
         Passed: {} ({:.1}%)\n\
         Calculation Method: {}\n",
        summary.total,
        summary.average,
        summary.highest,
        summary.lowest,
        summary.stddev,
        summary.passed,
        summary.pass_pct(),
        summary.method,
    )
}

struct SplitArgs<'a> {
    source: &'a Path,
    policy: GradePolicy,
    threshold: f64,
    strategy: SplitStrategy,
    output_dir: &'a Path,
    gzip: bool,
}

/// Grades `source`, splits it by the pass threshold, and writes both groups.
#[tracing::instrument(
    skip(args),
    fields(source = %args.source.display(), container = %S::KIND, strategy = ?args.strategy)
)]
fn split<S: RecordSequence>(args: &SplitArgs<'_>) -> Result<()> {
    let ingested = load_records::<S>(args.source)?;
    if ingested.skipped > 0 {
        warn!(skipped = ingested.skipped, "Some lines were not valid records");
    }
    let mut students = ingested.records;
    sort_by_name(&mut students);

    let (passed, failed) = match args.strategy {
        SplitStrategy::Copy => {
            let split = partition(&students, args.policy, args.threshold)?;
            (split.passed, split.failed)
        }
        SplitStrategy::MoveFailed => {
            let failed = partition_in_place(&mut students, args.policy, args.threshold)?;
            (students, failed)
        }
    };

    std::fs::create_dir_all(args.output_dir)?;
    let suffix = if args.gzip { ".txt.gz" } else { ".txt" };
    write_grades_file(
        args.output_dir.join(format!("passed{suffix}")),
        passed.iter(),
        args.gzip,
    )?;
    write_grades_file(
        args.output_dir.join(format!("failed{suffix}")),
        failed.iter(),
        args.gzip,
    )?;

    info!(
        passed = passed.len(),
        failed = failed.len(),
        output_dir = %args.output_dir.display(),
        "Split written"
    );
    Ok(())
}

/// Benchmarks each container in `kinds` with the same seeded data.
#[tracing::instrument(skip(options, log), fields(sizes = ?options.sizes))]
fn run_bench(
    kinds: &[ContainerKind],
    options: &BenchOptions<'_>,
    seed: Option<u64>,
    log: Option<&Path>,
) -> Result<()> {
    // One seed for all containers so they see identical data.
    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "Benchmark seed");

    for &kind in kinds {
        let results = bench::run_kind(kind, options, &mut seeded_rng(Some(seed)))?;

        println!("\n======================================");
        println!("  {kind} (copy split vs move failed)");
        println!("======================================");
        for row in &results {
            println!("\n--- N = {} students ---", row.size);
            println!("Generate:    {} ms", row.generate_ms);
            println!("Sort:        {} ms", row.sort_ms);
            println!("Copy split:  {} ms", row.split_copy_ms);
            println!("Move failed: {} ms", row.move_failed_ms);
            if let Some(write_ms) = row.write_ms {
                println!("Write:       {write_ms} ms");
            }
            println!("Passed: {}, Failed: {}", row.passed, row.failed);

            if let Some(path) = log {
                append_record(path, row)?;
            }
        }
    }

    Ok(())
}
