//! Backing storage for collections of records.
//!
//! [`RecordSequence`] is the one capability the grading algorithms need:
//! append, iterate, stable sort, stable partition, and split. It is
//! implemented for `Vec`, `VecDeque`, and `LinkedList` so the storage choice
//! stays independent of the algorithms.

use std::cmp::Ordering;
use std::collections::{LinkedList, VecDeque};
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::record::StudentRecord;

pub trait RecordSequence:
    Default + Clone + FromIterator<StudentRecord> + IntoIterator<Item = StudentRecord>
{
    /// Short name used in reports and output file names.
    const KIND: ContainerKind;

    fn push(&mut self, record: StudentRecord);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> impl Iterator<Item = &StudentRecord>;

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut StudentRecord>;

    /// Sorts in place, keeping equal elements in their original order.
    fn stable_sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&StudentRecord, &StudentRecord) -> Ordering;

    /// Removes and returns everything from index `at` onwards.
    fn split_off(&mut self, at: usize) -> Self;

    /// Pre-allocates room for `additional` records where the storage supports it.
    fn reserve(&mut self, _additional: usize) {}

    /// Reorders so records matching `pred` form a prefix, keeping relative
    /// order within both groups. Returns the length of the prefix.
    fn stable_partition<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&StudentRecord) -> bool,
    {
        let (mut front, back): (Vec<_>, Vec<_>) =
            std::mem::take(self).into_iter().partition(|r| pred(r));
        let split = front.len();
        front.extend(back);
        *self = front.into_iter().collect();
        split
    }
}

macro_rules! sequence_common {
    () => {
        fn push(&mut self, record: StudentRecord) {
            self.push_back(record);
        }

        fn len(&self) -> usize {
            Self::len(self)
        }

        fn iter(&self) -> impl Iterator<Item = &StudentRecord> {
            Self::iter(self)
        }

        fn iter_mut(&mut self) -> impl Iterator<Item = &mut StudentRecord> {
            Self::iter_mut(self)
        }

        fn split_off(&mut self, at: usize) -> Self {
            Self::split_off(self, at)
        }
    };
}

impl RecordSequence for Vec<StudentRecord> {
    const KIND: ContainerKind = ContainerKind::Vector;

    fn push(&mut self, record: StudentRecord) {
        Vec::push(self, record);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn iter(&self) -> impl Iterator<Item = &StudentRecord> {
        self.as_slice().iter()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut StudentRecord> {
        self.as_mut_slice().iter_mut()
    }

    fn stable_sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&StudentRecord, &StudentRecord) -> Ordering,
    {
        self.sort_by(compare);
    }

    fn split_off(&mut self, at: usize) -> Self {
        Vec::split_off(self, at)
    }

    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional);
    }
}

impl RecordSequence for VecDeque<StudentRecord> {
    const KIND: ContainerKind = ContainerKind::Deque;

    sequence_common!();

    fn stable_sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&StudentRecord, &StudentRecord) -> Ordering,
    {
        self.make_contiguous().sort_by(compare);
    }

    fn reserve(&mut self, additional: usize) {
        VecDeque::reserve(self, additional);
    }
}

impl RecordSequence for LinkedList<StudentRecord> {
    const KIND: ContainerKind = ContainerKind::List;

    sequence_common!();

    fn stable_sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&StudentRecord, &StudentRecord) -> Ordering,
    {
        let mut nodes: Vec<_> = std::mem::take(self).into_iter().collect();
        nodes.sort_by(compare);
        self.extend(nodes);
    }
}

/// The storage backing a record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Vector,
    List,
    Deque,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [
        ContainerKind::Vector,
        ContainerKind::List,
        ContainerKind::Deque,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContainerKind::Vector => "vector",
            ContainerKind::List => "list",
            ContainerKind::Deque => "deque",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
