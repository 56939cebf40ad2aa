//! External hosts - the CMM that measures and the CAD drawing that documents
//!
//! Both hosts are reached through traits so documentation and inspection
//! runs can be driven against a real host, a file export, or a test double.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// A `MACRO EXEC` command for the CMM host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCommand {
    pub macro_path: PathBuf,
    pub args: Vec<PathBuf>,
}

impl MacroCommand {
    pub fn new(macro_path: impl Into<PathBuf>) -> Self {
        Self {
            macro_path: macro_path.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<PathBuf>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Command text, e.g. `MACRO EXEC ( "axialsIn.pwmacro", "AxialScope.csv" )`
    pub fn render(&self) -> String {
        let quoted: Vec<String> = std::iter::once(&self.macro_path)
            .chain(&self.args)
            .map(|p| format!("\"{}\"", p.display()))
            .collect();
        format!("MACRO EXEC ( {} )", quoted.join(", "))
    }
}

/// Receives commands for the coordinate measuring machine
pub trait CmmHost {
    fn execute(&mut self, command: &MacroCommand) -> Result<(), HostError>;
}

/// CMM host that appends commands to a spool file, or prints them
#[derive(Debug, Clone, Default)]
pub struct SpoolCmm {
    spool: Option<PathBuf>,
}

impl SpoolCmm {
    pub fn new(spool: Option<PathBuf>) -> Self {
        Self { spool }
    }
}

impl CmmHost for SpoolCmm {
    fn execute(&mut self, command: &MacroCommand) -> Result<(), HostError> {
        let text = command.render();
        match &self.spool {
            Some(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| {
                        HostError::Unavailable(format!("CMM spool {}: {}", path.display(), e))
                    })?;
                writeln!(file, "{}", text)
                    .map_err(|e| HostError::Rejected(e.to_string()))?;
                info!(spool = %path.display(), command = %text, "sent CMM command");
            }
            None => {
                println!("{}", text);
                info!(command = %text, "printed CMM command");
            }
        }
        Ok(())
    }
}

/// A text object on a CAD layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextObject {
    pub id: String,
    pub text: String,
}

/// A table placed on a CAD layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadTable {
    pub title: String,
    /// Top-left corner
    pub origin: [f64; 2],
    pub width: f64,
    pub title_row_height: f64,
    pub row_height: f64,
    pub text_height: f64,
    pub cells: Vec<Vec<String>>,
}

/// Drawing operations needed to document an inspection
pub trait CadHost {
    fn set_active_layout(&mut self, name: &str) -> Result<(), HostError>;

    /// Text objects on the active layout
    fn text_objects(&self) -> Result<Vec<TextObject>, HostError>;

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), HostError>;

    fn insert_table(&mut self, table: CadTable) -> Result<(), HostError>;

    /// Redraw; file-backed hosts persist their changes here
    fn regen(&mut self) -> Result<(), HostError>;
}

/// Host failures; nothing is retried
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host unavailable: {0}")]
    Unavailable(String),

    #[error("layout '{0}' not found in drawing")]
    LayoutNotFound(String),

    #[error("host rejected the request: {0}")]
    Rejected(String),
}

/// Path of `file` inside the macro directory, or the bare name without one
pub fn macro_path(macros: Option<&Path>, file: &str) -> PathBuf {
    match macros {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}
