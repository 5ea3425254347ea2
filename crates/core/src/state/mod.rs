//! Job state management.
//!
//! This module provides:
//! - Mutation rules applied to a single job record
//! - The concurrent `JobStore`
//! - The `JobManager` facade used by clients

pub mod error;
pub mod job;
pub mod manager;
pub mod store;

pub use error::{JobStoreError, StoreResult};
pub use manager::JobManager;
pub use store::JobStore;
