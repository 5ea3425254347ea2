//! Audit of process graphs.
//!
//! - [`hybrid`]: deterministic connectivity rules merged with the
//!   semantic analyst's findings
//! - [`projection`]: node/edge snapshot of a generated process map

pub mod hybrid;
pub mod projection;

pub use hybrid::{HybridAnalyzer, SnapshotError};
pub use projection::snapshot_of;
