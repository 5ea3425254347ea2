//! Structural gatekeeping of generated process maps.
//!
//! - [`structural`]: reference checks on a single map
//! - [`self_correction`]: bounded generate, validate and fix loop

pub mod self_correction;
pub mod structural;

pub use self_correction::{CorrectionError, Corrected, SelfCorrectionLoop};
pub use structural::{validate, StructuralError};
