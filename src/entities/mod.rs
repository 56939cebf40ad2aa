//! Domain types
//!
//! - [`machine`] - the machine catalog and stage labels
//! - [`scope`] - per-stage feature selection of a project
//! - [`measurement`] - CMM result records and job comparison

pub mod machine;
pub mod measurement;
pub mod scope;

pub use machine::{MachineKind, MachineType, ProbeRules, StageLabel};
pub use measurement::{Comparison, Measurement, MeasurementSet};
pub use scope::{ScopeModel, ScopeShape};
