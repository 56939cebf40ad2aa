//! Axial measurement session - target queue and scope-table publishing
//!
//! An axial session collects stages, the balance drum, and labelled
//! distance/width dimensions. Publishing turns the queue into the row-wise
//! scope file the CMM macro walks through.

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use tracing::{debug, info};

use crate::entities::machine::{MachineType, ProbeRules, StageLabel};
use crate::entities::scope::ScopeModel;
use crate::session::label::{base_of, DimensionLabel, LabelError, Modifier};
use crate::session::{SessionError, SessionState};

pub const BALANCE_DRUM: &str = "Balance Drum";
pub const DISTANCE: &str = "Distance";
pub const WIDTH: &str = "Width";

/// Modifiers accepted on distance/width labels
const AXIAL_MODIFIERS: &[Modifier] = &[Modifier::Hand];

/// Labelled axial dimension kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    Distance,
    Width,
}

impl DimensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionKind::Distance => DISTANCE,
            DimensionKind::Width => WIDTH,
        }
    }
}

/// An entry offered to the user when building a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxialOption {
    Stage(StageLabel),
    BalanceDrum,
    Dimension(DimensionKind),
}

impl AxialOption {
    /// Options for a rotor: every stage, then balance drum, distance, width
    pub fn all<'a>(stages: impl IntoIterator<Item = &'a StageLabel>) -> Vec<AxialOption> {
        stages
            .into_iter()
            .cloned()
            .map(AxialOption::Stage)
            .chain([
                AxialOption::BalanceDrum,
                AxialOption::Dimension(DimensionKind::Distance),
                AxialOption::Dimension(DimensionKind::Width),
            ])
            .collect()
    }
}

impl fmt::Display for AxialOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxialOption::Stage(label) => write!(f, "{}", label.stage_name()),
            AxialOption::BalanceDrum => write!(f, "{}", BALANCE_DRUM),
            AxialOption::Dimension(kind) => write!(f, "{}", kind.as_str()),
        }
    }
}

impl FromStr for AxialOption {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(BALANCE_DRUM) {
            Ok(AxialOption::BalanceDrum)
        } else if trimmed.eq_ignore_ascii_case(DISTANCE) {
            Ok(AxialOption::Dimension(DimensionKind::Distance))
        } else if trimmed.eq_ignore_ascii_case(WIDTH) {
            Ok(AxialOption::Dimension(DimensionKind::Width))
        } else if let Some(rest) = strip_prefix_ignore_case(trimmed, "stage") {
            Ok(AxialOption::Stage(StageLabel::from_stage_name(rest)))
        } else {
            Err(LabelError::Malformed(trimmed.to_string()))
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    let rest = s[prefix.len()..].trim();
    (head.eq_ignore_ascii_case(prefix) && !rest.is_empty()).then_some(rest)
}

/// A queued session target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxialTarget {
    Stage(StageLabel),
    BalanceDrum,
    Dimension(DimensionKind, DimensionLabel),
}

impl AxialTarget {
    /// Base label held by a distance/width target
    pub fn dimension_base(&self) -> Option<&str> {
        match self {
            AxialTarget::Dimension(_, label) => Some(&label.base),
            _ => None,
        }
    }
}

impl fmt::Display for AxialTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxialTarget::Stage(label) => write!(f, "{}", label.stage_name()),
            AxialTarget::BalanceDrum => write!(f, "{}", BALANCE_DRUM),
            AxialTarget::Dimension(kind, label) => write!(f, "{} {}", kind.as_str(), label),
        }
    }
}

impl FromStr for AxialTarget {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((head, tail)) = trimmed.rsplit_once(' ') {
            let kind = if head.eq_ignore_ascii_case(DISTANCE) {
                Some(DimensionKind::Distance)
            } else if head.eq_ignore_ascii_case(WIDTH) {
                Some(DimensionKind::Width)
            } else {
                None
            };
            if let Some(kind) = kind {
                let label = DimensionLabel::parse(tail, AXIAL_MODIFIERS)?;
                return Ok(AxialTarget::Dimension(kind, label));
            }
        }
        match trimmed.parse::<AxialOption>()? {
            AxialOption::Stage(label) => Ok(AxialTarget::Stage(label)),
            AxialOption::BalanceDrum => Ok(AxialTarget::BalanceDrum),
            AxialOption::Dimension(_) => Err(LabelError::Malformed(trimmed.to_string())),
        }
    }
}

impl Serialize for AxialTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AxialTarget {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What happened to the options passed to [`AxialSession::add_targets`]
#[derive(Debug, Default)]
pub struct AddOutcome {
    pub added: Vec<AxialTarget>,
    /// Options or labels already in the session
    pub duplicates: Vec<String>,
    /// Labels that failed validation
    pub rejected: Vec<(String, LabelError)>,
}

/// Variable-width rows written to the axial scope file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeTable {
    pub rows: Vec<Vec<String>>,
}

impl ScopeTable {
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// One axial editing session, persisted between command invocations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxialSession {
    #[serde(default)]
    pub targets: Vec<AxialTarget>,

    /// Base labels held by distance/width targets
    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Utc>>,
}

impl AxialSession {
    pub fn state(&self) -> SessionState {
        if self.targets.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Accumulating
        }
    }

    /// Queue the selected options
    ///
    /// Stages and the balance drum are added once. Distance and width options
    /// ask `prompt` for their labels; it receives the base labels already in
    /// use so the caller can give feedback.
    pub fn add_targets<F>(&mut self, selected: &[AxialOption], mut prompt: F) -> AddOutcome
    where
        F: FnMut(DimensionKind, &[String]) -> Vec<String>,
    {
        let mut outcome = AddOutcome::default();

        for option in selected {
            let plain = match option {
                AxialOption::Stage(label) => Some(AxialTarget::Stage(label.clone())),
                AxialOption::BalanceDrum => Some(AxialTarget::BalanceDrum),
                AxialOption::Dimension(_) => None,
            };

            if let Some(target) = plain {
                if self.targets.contains(&target) {
                    debug!(target = %target, "already in session");
                    outcome.duplicates.push(target.to_string());
                } else {
                    self.push(target, &mut outcome);
                }
                continue;
            }

            let AxialOption::Dimension(kind) = option else {
                continue;
            };
            for raw in prompt(*kind, &self.labels) {
                match DimensionLabel::parse(&raw, AXIAL_MODIFIERS) {
                    Ok(label) if self.labels.contains(&label.base) => {
                        debug!(label = %label, "label already used");
                        outcome.duplicates.push(format!("{} {}", kind.as_str(), label));
                    }
                    Ok(label) => {
                        self.labels.push(label.base.clone());
                        self.push(AxialTarget::Dimension(*kind, label), &mut outcome);
                    }
                    Err(e) => outcome.rejected.push((raw, e)),
                }
            }
        }

        outcome
    }

    fn push(&mut self, target: AxialTarget, outcome: &mut AddOutcome) {
        if self.started.is_none() {
            self.started = Some(Utc::now());
        }
        outcome.added.push(target.clone());
        self.targets.push(target);
    }

    /// Remove targets by display name, freeing their labels
    ///
    /// Items not in the session are ignored. Returns the removed targets.
    pub fn remove_targets(&mut self, items: &[String]) -> Vec<AxialTarget> {
        let wanted: Vec<String> = items.iter().map(|i| i.trim().to_string()).collect();
        let (removed, kept): (Vec<AxialTarget>, Vec<AxialTarget>) = std::mem::take(&mut self.targets)
            .into_iter()
            .partition(|t| wanted.iter().any(|w| w.eq_ignore_ascii_case(&t.to_string())));

        let freed: Vec<&str> = removed.iter().filter_map(|t| t.dimension_base()).collect();
        self.labels.retain(|l| !freed.contains(&base_of(l)));
        self.targets = kept;
        if self.targets.is_empty() {
            self.started = None;
        }
        removed
    }

    /// Build the scope table for the current targets
    ///
    /// Stage and balance drum rows keep queue order; the distance row and
    /// then the width row follow when they hold at least one label.
    pub fn build_table(
        &self,
        machine: &MachineType,
        scope: &ScopeModel,
    ) -> Result<ScopeTable, SessionError> {
        let mut rows = Vec::new();
        let mut distance_row = vec![DISTANCE.to_string()];
        let mut width_row = vec![WIDTH.to_string()];

        for target in &self.targets {
            match target {
                AxialTarget::Stage(label) => {
                    let flags = scope
                        .get(label)
                        .ok_or_else(|| SessionError::StageNotInScope(label.to_string()))?;
                    let mut row = vec![label.stage_name()];
                    row.extend(machine.probe_targets(flags).iter().map(|f| f.to_string()));
                    rows.push(row);
                }
                AxialTarget::BalanceDrum => rows.push(vec![BALANCE_DRUM.to_string()]),
                AxialTarget::Dimension(DimensionKind::Distance, label) => {
                    distance_row.push(label.to_string())
                }
                AxialTarget::Dimension(DimensionKind::Width, label) => {
                    width_row.push(label.to_string())
                }
            }
        }

        for row in [distance_row, width_row] {
            if row.len() > 1 {
                rows.push(row);
            }
        }

        Ok(ScopeTable { rows })
    }

    /// Write the scope table and reset the queue
    ///
    /// The session is only cleared once the table was written.
    pub fn publish<W: Write>(
        &mut self,
        machine: &MachineType,
        scope: &ScopeModel,
        writer: W,
    ) -> Result<ScopeTable, SessionError> {
        let table = self.build_table(machine, scope)?;
        table
            .write_csv(writer)
            .map_err(|e| SessionError::Write(e.to_string()))?;
        info!(rows = table.rows.len(), "published axial scope");
        self.reset();
        Ok(table)
    }

    pub fn reset(&mut self) {
        self.targets.clear();
        self.labels.clear();
        self.started = None;
    }
}
