//! Machine catalog - rotor types, measurable features, and stage labels
//!
//! The catalog is a static registry. Each machine type belongs to one
//! [`MachineFamily`], and the family decides which probe targets apply to a
//! stage and which rows a documentation table needs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::entities::scope::ScopeModel;

/// Leading column of every feature list
pub const STAGE_COLUMN: &str = "Stage";

/// Machine type identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineKind {
    #[serde(rename = "Centrifugal Compressor")]
    CentrifugalCompressor,
    #[serde(rename = "Screw Compressor")]
    ScrewCompressor,
    #[serde(rename = "Axial Flow Compressor")]
    AxialFlowCompressor,
    #[serde(rename = "Steam Turbine")]
    SteamTurbine,
    #[serde(rename = "Expander")]
    Expander,
    #[serde(rename = "Gear")]
    Gear,
}

impl MachineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineKind::CentrifugalCompressor => "Centrifugal Compressor",
            MachineKind::ScrewCompressor => "Screw Compressor",
            MachineKind::AxialFlowCompressor => "Axial Flow Compressor",
            MachineKind::SteamTurbine => "Steam Turbine",
            MachineKind::Expander => "Expander",
            MachineKind::Gear => "Gear",
        }
    }

    /// Look up the catalog entry for this kind
    pub fn machine(&self) -> &'static MachineType {
        let index = match self {
            MachineKind::CentrifugalCompressor => 0,
            MachineKind::ScrewCompressor => 1,
            MachineKind::AxialFlowCompressor => 2,
            MachineKind::SteamTurbine => 3,
            MachineKind::Expander => 4,
            MachineKind::Gear => 5,
        };
        &CATALOG[index]
    }
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MachineKind {
    type Err = CatalogError;

    /// Accepts "Steam Turbine", "SteamTurbine" or "steam-turbine"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve(s).map(|m| m.kind)
    }
}

/// Open/close face feature sets for impeller-style machines
#[derive(Debug)]
pub struct FaceRules {
    pub close_face_features: &'static [&'static str],
    pub open_face_features: &'static [&'static str],
    pub close_face_rows: &'static [&'static str],
    pub open_face_rows: &'static [&'static str],
    pub combo_face_rows: &'static [&'static str],
}

/// How a machine's scope flags translate into probe targets and doc rows
#[derive(Debug)]
pub enum MachineFamily {
    /// A single open-face toggle per stage selects one of two fixed lists
    FaceToggle(&'static FaceRules),
    /// Every scope column is an independent option
    Independent(&'static [&'static str]),
    /// No axial features are tracked for this machine
    Unscoped,
}

/// Capability interface shared by every machine family
pub trait ProbeRules {
    /// Features to probe on a stage, given that stage's scope flags
    fn probe_targets(&self, stage_flags: &[u8]) -> Vec<&'static str>;

    /// Documentation rows needed for the whole project scope
    fn feature_rows(&self, scope: &ScopeModel) -> Vec<&'static str>;
}

impl ProbeRules for MachineFamily {
    fn probe_targets(&self, stage_flags: &[u8]) -> Vec<&'static str> {
        match self {
            MachineFamily::FaceToggle(rules) => {
                if stage_flags.first() == Some(&1) {
                    rules.open_face_features.to_vec()
                } else {
                    rules.close_face_features.to_vec()
                }
            }
            MachineFamily::Independent(options) => options
                .iter()
                .zip(stage_flags)
                .filter(|(_, flag)| **flag == 1)
                .map(|(option, _)| *option)
                .collect(),
            MachineFamily::Unscoped => Vec::new(),
        }
    }

    fn feature_rows(&self, scope: &ScopeModel) -> Vec<&'static str> {
        match self {
            MachineFamily::FaceToggle(rules) => {
                let open_faced = scope
                    .iter()
                    .filter(|(_, flags)| flags.first() == Some(&1))
                    .count();
                if open_faced == 0 {
                    rules.close_face_rows.to_vec()
                } else if open_faced == scope.len() {
                    rules.open_face_rows.to_vec()
                } else {
                    rules.combo_face_rows.to_vec()
                }
            }
            MachineFamily::Independent(options) => options
                .iter()
                .enumerate()
                .filter(|(i, _)| {
                    scope
                        .iter()
                        .any(|(_, flags)| flags.get(*i).copied() == Some(1))
                })
                .map(|(_, option)| *option)
                .collect(),
            MachineFamily::Unscoped => Vec::new(),
        }
    }
}

/// A catalog entry describing one machine type
#[derive(Debug)]
pub struct MachineType {
    pub kind: MachineKind,

    /// Scope columns, excluding the leading "Stage" column
    pub scope_columns: &'static [&'static str],

    pub sub_types: &'static [&'static str],

    pub family: MachineFamily,
}

impl MachineType {
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Full feature list, led by "Stage"
    pub fn feature_list(&self) -> Vec<&'static str> {
        std::iter::once(STAGE_COLUMN)
            .chain(self.scope_columns.iter().copied())
            .collect()
    }

    /// Number of binary flags stored per stage
    pub fn scope_width(&self) -> usize {
        self.scope_columns.len()
    }

    /// Only steam turbines may carry a Curtis stage
    pub fn supports_curtis(&self) -> bool {
        self.kind == MachineKind::SteamTurbine
    }
}

impl ProbeRules for MachineType {
    fn probe_targets(&self, stage_flags: &[u8]) -> Vec<&'static str> {
        self.family.probe_targets(stage_flags)
    }

    fn feature_rows(&self, scope: &ScopeModel) -> Vec<&'static str> {
        self.family.feature_rows(scope)
    }
}

static CENTRIFUGAL_FACES: FaceRules = FaceRules {
    close_face_features: &["Eye Face", "I.C.P.", "I.B.P."],
    open_face_features: &["Leading Edge", "Trailing Edge", "I.B.P.", "O.B.P."],
    close_face_rows: &["Eye Face", "I.B.P.", "G.P. Width"],
    open_face_rows: &["Leading Edge", "I.B.P.", "G.P. Width", "B.P. Width"],
    combo_face_rows: &[
        "Leading Edge",
        "Eye Face",
        "I.B.P.",
        "G.P. Width",
        "B.P. Width",
    ],
};

const BLADED_DISK: &[&str] = &["Disk Face", "Shroud Band", "Blade Root", "Blade Edge"];

const EXPANDER_DISK: &[&str] = &[
    "Disk Face",
    "Seal Eye Face",
    "Shroud Band",
    "Blade Root",
    "Blade Edge",
];

/// The machine catalog, in display order
pub static CATALOG: [MachineType; 6] = [
    MachineType {
        kind: MachineKind::CentrifugalCompressor,
        scope_columns: &["Open Face"],
        sub_types: &[],
        family: MachineFamily::FaceToggle(&CENTRIFUGAL_FACES),
    },
    MachineType {
        kind: MachineKind::ScrewCompressor,
        scope_columns: &[],
        sub_types: &["Male", "Female"],
        family: MachineFamily::Unscoped,
    },
    MachineType {
        kind: MachineKind::AxialFlowCompressor,
        scope_columns: BLADED_DISK,
        sub_types: &[],
        family: MachineFamily::Independent(BLADED_DISK),
    },
    MachineType {
        kind: MachineKind::SteamTurbine,
        scope_columns: BLADED_DISK,
        sub_types: &[],
        family: MachineFamily::Independent(BLADED_DISK),
    },
    MachineType {
        kind: MachineKind::Expander,
        scope_columns: EXPANDER_DISK,
        sub_types: &[],
        family: MachineFamily::Independent(EXPANDER_DISK),
    },
    MachineType {
        kind: MachineKind::Gear,
        scope_columns: &[],
        sub_types: &["Bull", "Pinion"],
        family: MachineFamily::Unscoped,
    },
];

/// Names of all machine types, in catalog order
pub fn list_types() -> Vec<&'static str> {
    CATALOG.iter().map(|m| m.name()).collect()
}

/// Every sub-type offered by any machine type
pub fn list_sub_types() -> BTreeSet<&'static str> {
    CATALOG
        .iter()
        .flat_map(|m| m.sub_types.iter().copied())
        .collect()
}

/// Resolve a machine type by name, ignoring case, spaces, dashes and underscores
pub fn resolve(name: &str) -> Result<&'static MachineType, CatalogError> {
    let wanted = squash(name);
    CATALOG
        .iter()
        .find(|m| squash(m.name()) == wanted)
        .ok_or_else(|| CatalogError::UnknownMachineType(name.to_string()))
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Key identifying one stage of a rotor ("1", "2" or "C1", "R1")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageLabel(String);

impl StageLabel {
    /// Label for the 1-based stage `index`
    ///
    /// Curtis machines number the first two stages C1, C2 and continue with
    /// R1, R2, ... from the third stage on.
    pub fn for_index(index: usize, is_curtis: bool) -> Self {
        if !is_curtis {
            Self(index.to_string())
        } else if index <= 2 {
            Self(format!("C{}", index))
        } else {
            Self(format!("R{}", index - 2))
        }
    }

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display name used in session targets and table headers ("Stage 1")
    pub fn stage_name(&self) -> String {
        format!("{} {}", STAGE_COLUMN, self.0)
    }

    /// Parse "Stage 1" or a bare "1"
    pub fn from_stage_name(name: &str) -> Self {
        let trimmed = name.trim();
        let bare = trimmed
            .strip_prefix(STAGE_COLUMN)
            .map(str::trim)
            .unwrap_or(trimmed);
        Self(bare.to_uppercase())
    }
}

impl fmt::Display for StageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered stage labels for a rotor with `stage_count` stages
pub fn stage_labels(stage_count: usize, is_curtis: bool) -> Vec<StageLabel> {
    (1..=stage_count)
        .map(|i| StageLabel::for_index(i, is_curtis))
        .collect()
}

/// Catalog lookup errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown machine type '{0}'")]
    UnknownMachineType(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::scope::ScopeShape;

    fn scope_with(machine: &MachineType, flags: &[&[u8]]) -> ScopeModel {
        let shape = ScopeShape::new(machine.scope_width(), false);
        let mut scope = ScopeModel::with_stages(shape, flags.len());
        let grid: Vec<Vec<bool>> = flags
            .iter()
            .map(|row| row.iter().map(|f| *f == 1).collect())
            .collect();
        scope.apply_editable_grid(&grid).unwrap();
        scope
    }

    #[test]
    fn test_stage_labels_ordinal() {
        let labels = stage_labels(3, false);
        let names: Vec<&str> = labels.iter().map(|l| l.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "3"]);
        assert!(stage_labels(0, true).is_empty());
    }

    #[test]
    fn test_stage_labels_curtis() {
        for n in 0..8 {
            let labels = stage_labels(n, true);
            assert_eq!(labels.len(), n);
            for (i, label) in labels.iter().enumerate() {
                let expected = if i < 2 {
                    format!("C{}", i + 1)
                } else {
                    format!("R{}", i - 1)
                };
                assert_eq!(label.as_str(), expected);
            }
        }
    }

    #[test]
    fn test_resolve_variants() {
        assert_eq!(resolve("Steam Turbine").unwrap().kind, MachineKind::SteamTurbine);
        assert_eq!(resolve("SteamTurbine").unwrap().kind, MachineKind::SteamTurbine);
        assert_eq!(
            resolve("centrifugal-compressor").unwrap().kind,
            MachineKind::CentrifugalCompressor
        );
        assert_eq!(
            resolve("Turbocharger").unwrap_err(),
            CatalogError::UnknownMachineType("Turbocharger".to_string())
        );
    }

    #[test]
    fn test_list_types_and_sub_types() {
        let types = list_types();
        assert_eq!(types.len(), 6);
        assert_eq!(types[0], "Centrifugal Compressor");

        let subs = list_sub_types();
        assert!(subs.contains("Male"));
        assert!(subs.contains("Pinion"));
        assert_eq!(subs.len(), 4);
    }

    #[test]
    fn test_kind_indexes_catalog() {
        for machine in CATALOG.iter() {
            assert_eq!(machine.kind.machine().kind, machine.kind);
        }
    }

    #[test]
    fn test_feature_list_leads_with_stage() {
        for machine in CATALOG.iter() {
            let features = machine.feature_list();
            assert_eq!(features[0], STAGE_COLUMN);
            assert_eq!(features.len(), machine.scope_width() + 1);
        }
    }

    #[test]
    fn test_compressor_probe_targets() {
        let machine = MachineKind::CentrifugalCompressor.machine();
        assert_eq!(machine.probe_targets(&[0]), vec!["Eye Face", "I.C.P.", "I.B.P."]);
        assert_eq!(
            machine.probe_targets(&[1]),
            vec!["Leading Edge", "Trailing Edge", "I.B.P.", "O.B.P."]
        );
    }

    #[test]
    fn test_compressor_feature_rows() {
        let machine = MachineKind::CentrifugalCompressor.machine();

        let closed = scope_with(machine, &[&[0], &[0]]);
        assert_eq!(machine.feature_rows(&closed), vec!["Eye Face", "I.B.P.", "G.P. Width"]);

        let open = scope_with(machine, &[&[1], &[1]]);
        assert_eq!(
            machine.feature_rows(&open),
            vec!["Leading Edge", "I.B.P.", "G.P. Width", "B.P. Width"]
        );

        let mixed = scope_with(machine, &[&[1], &[0]]);
        assert_eq!(machine.feature_rows(&mixed).len(), 5);
        assert_eq!(machine.feature_rows(&mixed)[1], "Eye Face");
    }

    #[test]
    fn test_turbine_independent_flags() {
        let machine = MachineKind::SteamTurbine.machine();
        assert_eq!(
            machine.probe_targets(&[1, 0, 0, 1]),
            vec!["Disk Face", "Blade Edge"]
        );
        assert!(machine.probe_targets(&[0, 0, 0, 0]).is_empty());

        let scope = scope_with(machine, &[&[1, 0, 0, 0], &[0, 0, 1, 0]]);
        assert_eq!(machine.feature_rows(&scope), vec!["Disk Face", "Blade Root"]);
    }

    #[test]
    fn test_unscoped_machines_have_no_targets() {
        let gear = MachineKind::Gear.machine();
        assert!(gear.probe_targets(&[]).is_empty());
        assert!(gear.feature_rows(&ScopeModel::default()).is_empty());
        assert_eq!(gear.sub_types, &["Bull", "Pinion"]);
    }

    #[test]
    fn test_stage_name_round_trip() {
        let label = StageLabel::for_index(4, true);
        assert_eq!(label.stage_name(), "Stage R2");
        assert_eq!(StageLabel::from_stage_name("Stage R2"), label);
        assert_eq!(StageLabel::from_stage_name("r2"), label);
    }
}
