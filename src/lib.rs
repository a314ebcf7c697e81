pub mod bench;
pub mod config;
pub mod error;
pub mod generate;
pub mod grading;
pub mod ingest;
pub mod output;
pub mod record;
pub mod sequence;
pub mod stats;
pub mod utility;

pub use error::GradeError;
pub use grading::{DEFAULT_THRESHOLD, Outcome, Split};
pub use record::{GradePolicy, StudentRecord};
pub use sequence::{ContainerKind, RecordSequence};
