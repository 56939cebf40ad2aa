//! Measurement sessions - building the scope files a CMM inspection runs from
//!
//! Axial and diameter sessions are edited over several command invocations,
//! so their state is kept in a small YAML file in the project workspace
//! until it is published.

pub mod axial;
pub mod diameter;
pub mod label;
pub mod manual;

pub use axial::{AxialOption, AxialSession, AxialTarget, DimensionKind, ScopeTable};
pub use diameter::DiameterSession;
pub use label::{DimensionLabel, LabelError, Modifier};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::core::fs::write_atomic;

pub const AXIAL_SESSION_FILE: &str = "AxialSession.yaml";
pub const DIAMETER_SESSION_FILE: &str = "DiameterSession.yaml";

/// Lifecycle of an editing session
///
/// Publishing writes the scope file and returns the session to `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Accumulating,
}

/// Session persistence and publishing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("stage {0} is queued but no longer in the project scope")]
    StageNotInScope(String),

    #[error("cannot write scope file: {0}")]
    Write(String),

    #[error("cannot access session file: {0}")]
    Io(String),

    #[error("session file is corrupt: {0}")]
    Corrupt(String),
}

/// Load a saved session, or a fresh one when none was saved
pub fn load<T: DeserializeOwned + Default + 'static>(path: &Path) -> Result<T, SessionError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| SessionError::Io(e.to_string()))?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yml::from_str(&contents).map_err(|e| SessionError::Corrupt(e.to_string()))
}

pub fn save<T: Serialize>(path: &Path, session: &T) -> Result<(), SessionError> {
    let yaml = serde_yml::to_string(session).map_err(|e| SessionError::Io(e.to_string()))?;
    write_atomic(path, yaml).map_err(|e| SessionError::Io(e.to_string()))
}
