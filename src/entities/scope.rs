//! Scope model - per-stage feature selection matrix
//!
//! A scope maps each stage label to one binary flag per scope column of the
//! project's machine type. It is persisted with the project file as an
//! ordered mapping and edited as a checkbox grid.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::entities::machine::{stage_labels, MachineType, StageLabel};

/// Dimensions a scope must conform to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeShape {
    /// Flags per stage (feature columns excluding "Stage")
    pub width: usize,
    pub is_curtis: bool,
}

impl ScopeShape {
    pub fn new(width: usize, is_curtis: bool) -> Self {
        Self { width, is_curtis }
    }

    pub fn for_machine(machine: &MachineType, is_curtis: bool) -> Self {
        Self::new(machine.scope_width(), is_curtis && machine.supports_curtis())
    }
}

/// Ordered mapping of stage label to binary feature flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeModel {
    stages: Vec<(StageLabel, Vec<u8>)>,
}

impl ScopeModel {
    /// Zero-filled scope with `stage_count` stages
    pub fn with_stages(shape: ScopeShape, stage_count: usize) -> Self {
        let mut scope = Self::default();
        scope.resize(shape, stage_count);
        scope
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StageLabel, &[u8])> {
        self.stages.iter().map(|(label, flags)| (label, flags.as_slice()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &StageLabel> {
        self.stages.iter().map(|(label, _)| label)
    }

    pub fn get(&self, label: &StageLabel) -> Option<&[u8]> {
        self.stages
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, flags)| flags.as_slice())
    }

    /// Regenerate the stage keys for a new stage count
    ///
    /// Flags of labels present before and after are kept, new stages are
    /// zero-filled and removed stages are dropped.
    pub fn resize(&mut self, shape: ScopeShape, stage_count: usize) {
        let stages = stage_labels(stage_count, shape.is_curtis)
            .into_iter()
            .map(|label| {
                let flags = match self.get(&label) {
                    Some(existing) => fit_width(existing, shape.width),
                    None => vec![0; shape.width],
                };
                (label, flags)
            })
            .collect();
        self.stages = stages;
    }

    /// Resize from raw text input, rejecting anything but a non-negative integer
    ///
    /// On error the scope is left untouched.
    pub fn resize_from_input(
        &mut self,
        shape: ScopeShape,
        input: &str,
    ) -> Result<usize, ScopeError> {
        let count = parse_stage_count(input)?;
        self.resize(shape, count);
        Ok(count)
    }

    /// Set or clear a single flag
    pub fn set_flag(
        &mut self,
        label: &StageLabel,
        column: usize,
        on: bool,
    ) -> Result<(), ScopeError> {
        let flags = self
            .stages
            .iter_mut()
            .find(|(l, _)| l == label)
            .map(|(_, flags)| flags)
            .ok_or_else(|| ScopeError::UnknownStage(label.to_string()))?;
        let width = flags.len();
        let flag = flags
            .get_mut(column)
            .ok_or(ScopeError::ColumnOutOfRange { column, width })?;
        *flag = u8::from(on);
        Ok(())
    }

    /// Checkbox grid for the presentation layer, one row per stage
    pub fn to_editable_grid(&self) -> Vec<Vec<bool>> {
        self.stages
            .iter()
            .map(|(_, flags)| flags.iter().map(|f| *f == 1).collect())
            .collect()
    }

    /// Write a checkbox grid back into the scope
    ///
    /// The grid must have one row per stage and the same number of columns as
    /// each stage's flags; otherwise nothing is changed.
    pub fn apply_editable_grid(&mut self, grid: &[Vec<bool>]) -> Result<(), ScopeError> {
        if grid.len() != self.stages.len() {
            return Err(ScopeError::GridShape {
                expected: self.stages.len(),
                found: grid.len(),
            });
        }
        for ((_, flags), row) in self.stages.iter().zip(grid) {
            if row.len() != flags.len() {
                return Err(ScopeError::GridShape {
                    expected: flags.len(),
                    found: row.len(),
                });
            }
        }

        for ((_, flags), row) in self.stages.iter_mut().zip(grid) {
            for (flag, checked) in flags.iter_mut().zip(row) {
                *flag = u8::from(*checked);
            }
        }
        Ok(())
    }

    /// Check the scope against the shape implied by its project
    pub fn validate(&self, shape: ScopeShape) -> Result<(), ScopeError> {
        let expected = stage_labels(self.len(), shape.is_curtis);
        for ((label, flags), wanted) in self.stages.iter().zip(&expected) {
            if label != wanted {
                return Err(ScopeError::UnexpectedStage {
                    found: label.to_string(),
                    expected: wanted.to_string(),
                });
            }
            if flags.len() != shape.width {
                return Err(ScopeError::GridShape {
                    expected: shape.width,
                    found: flags.len(),
                });
            }
        }
        Ok(())
    }
}

fn fit_width(flags: &[u8], width: usize) -> Vec<u8> {
    let mut fitted: Vec<u8> = flags.iter().take(width).copied().collect();
    fitted.resize(width, 0);
    fitted
}

/// Largest stage count a scope accepts
pub const MAX_STAGES: usize = 99;

/// Parse a stage count typed by the user
pub fn parse_stage_count(input: &str) -> Result<usize, ScopeError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ScopeError::NotANumber(trimmed.to_string()))?;
    let count = usize::try_from(value).map_err(|_| ScopeError::NegativeStageCount(value))?;
    if count > MAX_STAGES {
        return Err(ScopeError::TooManyStages(count));
    }
    Ok(count)
}

impl Serialize for ScopeModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.stages.len()))?;
        for (label, flags) in &self.stages {
            map.serialize_entry(label, flags)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScopeModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScopeVisitor;

        impl<'de> Visitor<'de> for ScopeVisitor {
            type Value = ScopeModel;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of stage label to a list of 0/1 flags")
            }

            fn visit_unit<E: de::Error>(self) -> Result<ScopeModel, E> {
                Ok(ScopeModel::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ScopeModel, A::Error> {
                let mut stages: Vec<(StageLabel, Vec<u8>)> = Vec::new();
                while let Some((label, flags)) = access.next_entry::<StageLabel, Vec<u8>>()? {
                    if flags.iter().any(|f| *f > 1) {
                        return Err(de::Error::custom(format!(
                            "stage {} has a flag other than 0 or 1",
                            label
                        )));
                    }
                    if stages.iter().any(|(l, _)| *l == label) {
                        return Err(de::Error::custom(format!("duplicate stage {}", label)));
                    }
                    stages.push((label, flags));
                }
                Ok(ScopeModel { stages })
            }
        }

        deserializer.deserialize_any(ScopeVisitor)
    }
}

/// Scope editing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("stage count '{0}' is not a number")]
    NotANumber(String),

    #[error("stage count cannot be negative ({0})")]
    NegativeStageCount(i64),

    #[error("stage count {0} exceeds the maximum of {max}", max = MAX_STAGES)]
    TooManyStages(usize),

    #[error("stage {0} is not in the project scope")]
    UnknownStage(String),

    #[error("feature column {column} is out of range (scope has {width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("grid does not match the scope: expected {expected}, found {found}")]
    GridShape { expected: usize, found: usize },

    #[error("unexpected stage {found} (expected {expected})")]
    UnexpectedStage { found: String, expected: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: ScopeShape = ScopeShape {
        width: 4,
        is_curtis: false,
    };

    fn label(s: &str) -> StageLabel {
        StageLabel::new(s)
    }

    #[test]
    fn test_with_stages_zero_filled() {
        let scope = ScopeModel::with_stages(SHAPE, 3);
        assert_eq!(scope.len(), 3);
        assert!(scope.iter().all(|(_, flags)| flags == [0, 0, 0, 0]));
    }

    #[test]
    fn test_resize_grow_preserves_flags() {
        let mut scope = ScopeModel::with_stages(SHAPE, 3);
        scope.set_flag(&label("1"), 0, true).unwrap();
        scope.set_flag(&label("3"), 2, true).unwrap();

        scope.resize(SHAPE, 5);

        assert_eq!(scope.len(), 5);
        assert_eq!(scope.get(&label("1")), Some(&[1, 0, 0, 0][..]));
        assert_eq!(scope.get(&label("2")), Some(&[0, 0, 0, 0][..]));
        assert_eq!(scope.get(&label("3")), Some(&[0, 0, 1, 0][..]));
        assert_eq!(scope.get(&label("4")), Some(&[0, 0, 0, 0][..]));
        assert_eq!(scope.get(&label("5")), Some(&[0, 0, 0, 0][..]));
    }

    #[test]
    fn test_resize_shrink_drops_stages() {
        let mut scope = ScopeModel::with_stages(SHAPE, 5);
        scope.set_flag(&label("2"), 1, true).unwrap();
        scope.set_flag(&label("4"), 1, true).unwrap();

        scope.resize(SHAPE, 2);

        let labels: Vec<&str> = scope.labels().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["1", "2"]);
        assert_eq!(scope.get(&label("2")), Some(&[0, 1, 0, 0][..]));
        assert!(scope.get(&label("4")).is_none());
    }

    #[test]
    fn test_resize_same_count_is_idempotent() {
        let mut scope = ScopeModel::with_stages(SHAPE, 3);
        scope.set_flag(&label("2"), 3, true).unwrap();
        let before = scope.clone();

        scope.resize(SHAPE, 3);
        assert_eq!(scope, before);
        scope.resize(SHAPE, 3);
        assert_eq!(scope, before);
    }

    #[test]
    fn test_resize_curtis_labels() {
        let shape = ScopeShape::new(4, true);
        let scope = ScopeModel::with_stages(shape, 4);
        let labels: Vec<&str> = scope.labels().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["C1", "C2", "R1", "R2"]);
    }

    #[test]
    fn test_resize_from_input_rejects_bad_text() {
        let mut scope = ScopeModel::with_stages(SHAPE, 2);
        scope.set_flag(&label("1"), 0, true).unwrap();
        let before = scope.clone();

        assert_eq!(
            scope.resize_from_input(SHAPE, "-3"),
            Err(ScopeError::NegativeStageCount(-3))
        );
        assert_eq!(
            scope.resize_from_input(SHAPE, "4a"),
            Err(ScopeError::NotANumber("4a".to_string()))
        );
        assert_eq!(
            scope.resize_from_input(SHAPE, ""),
            Err(ScopeError::NotANumber(String::new()))
        );
        assert_eq!(scope, before);

        assert_eq!(scope.resize_from_input(SHAPE, " 3 "), Ok(3));
        assert_eq!(scope.len(), 3);
    }

    #[test]
    fn test_resize_from_input_caps_stage_count() {
        let mut scope = ScopeModel::with_stages(SHAPE, 2);
        let before = scope.clone();

        assert_eq!(
            scope.resize_from_input(SHAPE, "1000000000000"),
            Err(ScopeError::TooManyStages(1_000_000_000_000))
        );
        assert_eq!(
            scope.resize_from_input(SHAPE, "100"),
            Err(ScopeError::TooManyStages(100))
        );
        assert_eq!(scope, before);

        assert_eq!(parse_stage_count("99"), Ok(MAX_STAGES));
    }

    #[test]
    fn test_grid_round_trip() {
        let mut scope = ScopeModel::with_stages(SHAPE, 3);
        scope.set_flag(&label("1"), 0, true).unwrap();
        scope.set_flag(&label("3"), 3, true).unwrap();

        let grid = scope.to_editable_grid();
        let mut copy = ScopeModel::with_stages(SHAPE, 3);
        copy.apply_editable_grid(&grid).unwrap();
        assert_eq!(copy, scope);

        let mut same = scope.clone();
        same.apply_editable_grid(&scope.to_editable_grid()).unwrap();
        assert_eq!(same, scope);
    }

    #[test]
    fn test_apply_grid_wrong_shape_leaves_scope() {
        let mut scope = ScopeModel::with_stages(SHAPE, 2);
        let before = scope.clone();

        let short_row = vec![vec![true; 4], vec![true; 3]];
        assert!(matches!(
            scope.apply_editable_grid(&short_row),
            Err(ScopeError::GridShape { expected: 4, found: 3 })
        ));
        assert_eq!(scope, before);

        let too_many = vec![vec![false; 4]; 3];
        assert!(scope.apply_editable_grid(&too_many).is_err());
        assert_eq!(scope, before);
    }

    #[test]
    fn test_set_flag_errors() {
        let mut scope = ScopeModel::with_stages(SHAPE, 1);
        assert_eq!(
            scope.set_flag(&label("9"), 0, true),
            Err(ScopeError::UnknownStage("9".to_string()))
        );
        assert_eq!(
            scope.set_flag(&label("1"), 4, true),
            Err(ScopeError::ColumnOutOfRange { column: 4, width: 4 })
        );
    }

    #[test]
    fn test_yaml_keeps_stage_order() {
        let mut scope = ScopeModel::with_stages(SHAPE, 11);
        scope.set_flag(&label("10"), 1, true).unwrap();

        let yaml = serde_yml::to_string(&scope).unwrap();
        let parsed: ScopeModel = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, scope);

        let labels: Vec<&str> = parsed.labels().map(|l| l.as_str()).collect();
        assert_eq!(labels[1], "2");
        assert_eq!(labels[9], "10");
    }

    #[test]
    fn test_deserialize_rejects_non_binary_flags() {
        let yaml = "'1': [0, 2]\n";
        assert!(serde_yml::from_str::<ScopeModel>(yaml).is_err());
    }

    #[test]
    fn test_validate_detects_mismatch() {
        let scope = ScopeModel::with_stages(SHAPE, 2);
        assert!(scope.validate(SHAPE).is_ok());
        assert!(scope.validate(ScopeShape::new(3, false)).is_err());
        assert!(scope.validate(ScopeShape::new(4, true)).is_err());
    }
}
