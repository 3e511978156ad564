//! Labeled segment datasets: a CSV manifest plus a directory of clips

pub mod manifest;
pub mod set;

pub use manifest::{SegmentRecord, parse_manifest, read_manifest};
pub use set::{Sample, Set};
