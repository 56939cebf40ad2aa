//! Project file - definition and scope of one rotor inspection job
//!
//! A project lives in a workspace directory holding a single `*.rw` file
//! (YAML) plus the scope, results and doc trail files of its inspections.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::fs::write_atomic;
use crate::entities::machine::{list_sub_types, MachineKind, MachineType};
use crate::entities::scope::{ScopeModel, ScopeShape};

/// Project file extension
pub const PROJECT_EXTENSION: &str = "rw";

/// Inspection phase of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Phase {
    #[serde(rename = "Phase 1")]
    #[value(name = "1", alias = "phase1")]
    Phase1,
    #[serde(rename = "Phase 2")]
    #[value(name = "2", alias = "phase2")]
    Phase2,
    #[serde(rename = "Final")]
    #[value(name = "final")]
    Final,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Phase1 => "Phase 1",
            Phase::Phase2 => "Phase 2",
            Phase::Final => "Final",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// High-level description of the machine being inspected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDefinition {
    pub job_number: String,
    pub phase: Phase,
    pub machine_type: MachineKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,

    #[serde(default)]
    pub nickname: String,

    #[serde(default)]
    pub is_curtis: bool,

    /// Workspace directory
    pub path: PathBuf,

    pub filename: String,

    /// Project this one was templated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl ProjectDefinition {
    /// Build and validate a definition; `path` and `filename` are filled in
    pub fn new(
        job_number: &str,
        phase: Phase,
        machine_type: MachineKind,
        sub_type: Option<&str>,
        nickname: &str,
        is_curtis: bool,
        dir: &Path,
    ) -> Result<Self, ProjectError> {
        let job_number = job_number.trim();
        if job_number.is_empty()
            || job_number.len() > 6
            || !job_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ProjectError::Invalid(format!(
                "job number '{}' must be 1 to 6 digits",
                job_number
            )));
        }
        if !nickname.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ProjectError::Invalid(format!(
                "nickname '{}' may only hold letters, digits and '_'",
                nickname
            )));
        }
        let sub_type = sub_type.map(str::trim).filter(|s| !s.is_empty());
        if let Some(sub) = sub_type {
            if !list_sub_types().contains(sub) {
                return Err(ProjectError::Invalid(format!("unknown sub type '{}'", sub)));
            }
        }

        let machine = machine_type.machine();
        let is_curtis = is_curtis && machine.supports_curtis();
        let filename = project_filename(
            job_number,
            phase,
            machine.name(),
            sub_type.unwrap_or(""),
            nickname,
        );

        Ok(Self {
            job_number: job_number.to_string(),
            phase,
            machine_type,
            sub_type: sub_type.map(str::to_string),
            nickname: nickname.to_string(),
            is_curtis,
            path: dir.to_path_buf(),
            filename,
            ref_filename: None,
            created_by: None,
        })
    }

    pub fn machine(&self) -> &'static MachineType {
        self.machine_type.machine()
    }

    pub fn scope_shape(&self) -> ScopeShape {
        ScopeShape::for_machine(self.machine(), self.is_curtis)
    }
}

/// `{job}_{phase}_{machine}_{sub}_{nick}.rw` without spaces or empty parts
pub fn project_filename(
    job_number: &str,
    phase: Phase,
    machine: &str,
    sub_type: &str,
    nickname: &str,
) -> String {
    format!(
        "{}_{}_{}_{}_{}.{}",
        job_number, phase, machine, sub_type, nickname, PROJECT_EXTENSION
    )
    .replace(' ', "")
    .replace("__", "_")
    .replace("_.", ".")
}

/// Contents of a project file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub definition: ProjectDefinition,

    #[serde(default)]
    pub scope: ScopeModel,
}

/// An open project
#[derive(Debug)]
pub struct Project {
    file: PathBuf,
    data: ProjectFile,
}

impl Project {
    /// Write a new project file into `dir`
    pub fn create(
        dir: &Path,
        definition: ProjectDefinition,
        force: bool,
    ) -> Result<Self, ProjectError> {
        std::fs::create_dir_all(dir).map_err(|e| ProjectError::Io(e.to_string()))?;
        let file = dir.join(&definition.filename);
        if file.exists() && !force {
            return Err(ProjectError::AlreadyExists(file));
        }

        let project = Self {
            file,
            data: ProjectFile {
                definition,
                scope: ScopeModel::default(),
            },
        };
        project.save()?;
        info!(file = %project.file.display(), "created project");
        Ok(project)
    }

    pub fn open(path: &Path) -> Result<Self, ProjectError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProjectError::NotFound {
                    searched_from: path.to_path_buf(),
                }
            } else {
                ProjectError::Io(e.to_string())
            }
        })?;
        let data: ProjectFile = serde_yml::from_str(&contents).map_err(|e| ProjectError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        data.scope
            .validate(data.definition.scope_shape())
            .map_err(|e| ProjectError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!(file = %path.display(), "opened project");
        Ok(Self {
            file: path.to_path_buf(),
            data,
        })
    }

    /// Find the project by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::Io(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Open a project file, or find the one project file in or above a directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        if start.is_file() {
            return Self::open(start);
        }

        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::Io(e.to_string()))?;

        loop {
            let found = project_files(&current);
            match found.len() {
                0 => {}
                1 => return Self::open(&found[0]),
                _ => return Err(ProjectError::Ambiguous(current)),
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open the one project file directly inside `dir`, without walking up
    pub fn open_in(dir: &Path) -> Result<Self, ProjectError> {
        if dir.is_file() {
            return Self::open(dir);
        }
        let found = project_files(dir);
        match found.as_slice() {
            [] => Err(ProjectError::NotFound {
                searched_from: dir.to_path_buf(),
            }),
            [file] => Self::open(file),
            _ => Err(ProjectError::Ambiguous(dir.to_path_buf())),
        }
    }

    /// Write the whole project file
    pub fn save(&self) -> Result<(), ProjectError> {
        let yaml = serde_yml::to_string(&self.data).map_err(|e| ProjectError::Io(e.to_string()))?;
        write_atomic(&self.file, yaml).map_err(|e| ProjectError::Io(e.to_string()))?;
        debug!(file = %self.file.display(), "saved project");
        Ok(())
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Directory holding the project file and its inspection files
    pub fn workspace(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn definition(&self) -> &ProjectDefinition {
        &self.data.definition
    }

    pub fn definition_mut(&mut self) -> &mut ProjectDefinition {
        &mut self.data.definition
    }

    pub fn machine(&self) -> &'static MachineType {
        self.data.definition.machine()
    }

    pub fn scope_shape(&self) -> ScopeShape {
        self.data.definition.scope_shape()
    }

    pub fn scope(&self) -> &ScopeModel {
        &self.data.scope
    }

    pub fn scope_mut(&mut self) -> &mut ScopeModel {
        &mut self.data.scope
    }

    /// Path of a file in the workspace
    pub fn workspace_file(&self, name: &str) -> PathBuf {
        self.workspace().join(name)
    }
}

fn project_files(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == PROJECT_EXTENSION))
        .collect();
    found.sort();
    found
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no RotoWorks project found (searched from {searched_from:?}). Run 'rotoworks init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("project file already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("more than one project file in {0:?}; pass --project")]
    Ambiguous(PathBuf),

    #[error("invalid project definition: {0}")]
    Invalid(String),

    #[error("cannot read project file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(String),
}
