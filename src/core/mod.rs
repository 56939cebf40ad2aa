//! Core module - project files, configuration and external hosts

pub mod config;
pub mod fs;
pub mod host;
pub mod inspection;
pub mod project;

pub use config::Config;
pub use host::{CadHost, CmmHost, HostError, MacroCommand, SpoolCmm};
pub use inspection::{workspace_status, InspectionKind, InspectionStatus};
pub use project::{Phase, Project, ProjectDefinition, ProjectError};
