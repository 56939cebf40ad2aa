//! Command implementations

pub mod axial;
pub mod compare;
pub mod completions;
pub mod diameter;
pub mod doc;
pub mod init;
pub mod machines;
pub mod manual;
pub mod scope;
pub mod status;
