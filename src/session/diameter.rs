//! Diameter measurement session - a deduplicated label set with range entry

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, info};

use crate::session::label::{alphabet_label, base_of, DimensionLabel, LabelError, Modifier};
use crate::session::{SessionError, SessionState};

const DIAMETER_MODIFIERS: &[Modifier] = &[Modifier::Hand, Modifier::Plane];

/// Split raw input into label tokens
///
/// Input is upper-cased; a hyphen separates the ends of a range and blank
/// tokens are dropped.
pub fn parse_input(raw: &str) -> Vec<String> {
    raw.to_uppercase()
        .split('-')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand `first-last` into every label between them, inclusive
///
/// Returns `None` unless `first` comes strictly before `last`.
pub fn label_range(first: &DimensionLabel, last: &DimensionLabel) -> Option<Vec<DimensionLabel>> {
    let start = first.position()?;
    let end = last.position()?;
    if start >= end {
        return None;
    }
    Some(
        (start..=end)
            .filter_map(alphabet_label)
            .map(|base| DimensionLabel::new(base, last.modifier))
            .collect(),
    )
}

/// Result of one [`DiameterSession::enter`] call
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnterOutcome {
    pub added: Vec<String>,
    /// Labels whose base was already in the session
    pub duplicates: Vec<String>,
}

/// One diameter editing session, persisted between command invocations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiameterSession {
    /// Labels in insertion order, modifier included ("B*H")
    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Utc>>,
}

impl DiameterSession {
    pub fn state(&self) -> SessionState {
        if self.labels.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Accumulating
        }
    }

    /// Enter a single label ("B", "C*P") or a range ("A-D", "A-C*H")
    ///
    /// Invalid input leaves the session unchanged. A range whose end does not
    /// come after its start adds nothing.
    pub fn enter(&mut self, raw: &str) -> Result<EnterOutcome, LabelError> {
        let tokens = parse_input(raw);
        let labels = match tokens.as_slice() {
            [single] => vec![DimensionLabel::parse(single, DIAMETER_MODIFIERS)?],
            [first, last] => {
                let first = DimensionLabel::parse(first, DIAMETER_MODIFIERS)?;
                let last = DimensionLabel::parse(last, DIAMETER_MODIFIERS)?;
                if first.modifier.is_some() {
                    return Err(LabelError::RangeStartModifier(first.to_string()));
                }
                match label_range(&first, &last) {
                    Some(range) => range,
                    None => {
                        debug!(first = %first, last = %last, "range is not increasing");
                        Vec::new()
                    }
                }
            }
            _ => return Err(LabelError::Malformed(raw.trim().to_string())),
        };
        Ok(self.extend(labels))
    }

    fn extend(&mut self, labels: Vec<DimensionLabel>) -> EnterOutcome {
        let mut outcome = EnterOutcome::default();
        for label in labels {
            if self.labels.iter().any(|l| base_of(l) == label.base) {
                outcome.duplicates.push(label.to_string());
                continue;
            }
            if self.started.is_none() {
                self.started = Some(Utc::now());
            }
            self.labels.push(label.to_string());
            outcome.added.push(label.to_string());
        }
        if !outcome.duplicates.is_empty() {
            debug!(duplicates = ?outcome.duplicates, "skipped labels already in session");
        }
        outcome
    }

    /// Drop the given labels; labels not in the session are ignored
    pub fn remove_selected(&mut self, items: &[String]) -> usize {
        let before = self.labels.len();
        self.labels
            .retain(|l| !items.iter().any(|i| i.trim().eq_ignore_ascii_case(l)));
        if self.labels.is_empty() {
            self.started = None;
        }
        before - self.labels.len()
    }

    /// Write the single-column scope file and reset the session
    pub fn publish<W: Write>(&mut self, writer: W) -> Result<usize, SessionError> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        for label in &self.labels {
            wtr.write_record([label])
                .map_err(|e| SessionError::Write(e.to_string()))?;
        }
        wtr.flush().map_err(|e| SessionError::Write(e.to_string()))?;

        let count = self.labels.len();
        info!(labels = count, "published diameter scope");
        self.reset();
        Ok(count)
    }

    pub fn reset(&mut self) {
        self.labels.clear();
        self.started = None;
    }
}
