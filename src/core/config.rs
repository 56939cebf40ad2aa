//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-level config file, next to the project file
pub const PROJECT_CONFIG: &str = "rotoworks.yaml";

/// RotoWorks configuration with layered hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the PolyWorks macro files
    pub macros: Option<PathBuf>,

    /// File CMM commands are appended to; printed to stdout when unset
    pub cmm_spool: Option<PathBuf>,

    /// CAD drawing export documented by `rotoworks doc`
    pub drawing: Option<PathBuf>,

    /// Technician name recorded in new projects
    pub author: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/rotoworks/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read(&global_path) {
                config.merge(global);
            }
        }

        // 2. Project config (rotoworks.yaml in the workspace)
        if let Some(dir) = workspace {
            if let Some(project) = Self::read(&dir.join(PROJECT_CONFIG)) {
                config.merge(project.relative_to(dir));
            }
        }

        // 3. Environment variables
        config.merge(Self::from_env(|key| std::env::var(key).ok()));

        config
    }

    fn read(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                None
            }
        }
    }

    fn from_env(var: impl Fn(&str) -> Option<String>) -> Config {
        Config {
            macros: var("ROTOWORKS_MACROS").map(PathBuf::from),
            cmm_spool: var("ROTOWORKS_CMM_SPOOL").map(PathBuf::from),
            drawing: var("ROTOWORKS_DRAWING").map(PathBuf::from),
            author: var("ROTOWORKS_AUTHOR"),
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rotoworks")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Resolve relative paths against the directory the config came from
    fn relative_to(mut self, dir: &Path) -> Self {
        for path in [&mut self.macros, &mut self.cmm_spool, &mut self.drawing]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
        self
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.macros.is_some() {
            self.macros = other.macros;
        }
        if other.cmm_spool.is_some() {
            self.cmm_spool = other.cmm_spool;
        }
        if other.drawing.is_some() {
            self.drawing = other.drawing;
        }
        if other.author.is_some() {
            self.author = other.author;
        }
    }

    /// Get the author name, falling back to the login name
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}
