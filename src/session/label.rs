//! Dimension labels - alphabetic tags with optional measurement modifiers
//!
//! Labels are one or two letters drawn from the sequence A..Z, AA..ZZ and may
//! carry a modifier token: `*H` marks a hand measurement, `*P` a
//! constraining plane.

use std::fmt;
use thiserror::Error;

/// Largest position in the label alphabet (ZZ)
pub const ALPHABET_LEN: usize = 26 + 26 * 26;

/// Measurement modifier appended to a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `*H` - measured by hand
    Hand,
    /// `*P` - constraining plane
    Plane,
}

impl Modifier {
    pub fn token(&self) -> &'static str {
        match self {
            Modifier::Hand => "*H",
            Modifier::Plane => "*P",
        }
    }

    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "H" => Some(Modifier::Hand),
            "P" => Some(Modifier::Plane),
            _ => None,
        }
    }
}

/// A validated label, split into its base letters and optional modifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimensionLabel {
    pub base: String,
    pub modifier: Option<Modifier>,
}

impl DimensionLabel {
    /// Parse a label, allowing only the listed modifiers
    ///
    /// Input is upper-cased and trimmed first.
    pub fn parse(input: &str, allowed: &[Modifier]) -> Result<Self, LabelError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LabelError::Empty);
        }
        if !trimmed.is_ascii() {
            return Err(LabelError::NotAlphabetic(trimmed.to_string()));
        }
        let text = trimmed.to_ascii_uppercase();

        let (base, modifier) = match text.split_once('*') {
            Some((base, letter)) => {
                let modifier = Modifier::from_letter(letter)
                    .filter(|m| allowed.contains(m))
                    .ok_or_else(|| LabelError::UnknownModifier(format!("*{}", letter)))?;
                (base, Some(modifier))
            }
            None => (text.as_str(), None),
        };

        if base.is_empty() || !base.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(LabelError::NotAlphabetic(text.clone()));
        }
        if base.len() > 2 {
            return Err(LabelError::TooLong(text.clone()));
        }

        Ok(Self {
            base: base.to_string(),
            modifier,
        })
    }

    pub fn new(base: impl Into<String>, modifier: Option<Modifier>) -> Self {
        Self {
            base: base.into(),
            modifier,
        }
    }

    /// Position of the base letters in the A..ZZ sequence
    pub fn position(&self) -> Option<usize> {
        alphabet_position(&self.base)
    }
}

impl fmt::Display for DimensionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(modifier) = self.modifier {
            write!(f, "{}", modifier.token())?;
        }
        Ok(())
    }
}

/// Base of a stored label string ("B*H" -> "B")
pub fn base_of(label: &str) -> &str {
    label.split('*').next().unwrap_or(label)
}

/// Position of a one or two letter label in the sequence A..Z, AA..ZZ
pub fn alphabet_position(label: &str) -> Option<usize> {
    let bytes = label.as_bytes();
    if !bytes.iter().all(u8::is_ascii_uppercase) {
        return None;
    }
    match bytes {
        [a] => Some(usize::from(a - b'A')),
        [a, b] => Some(26 + usize::from(a - b'A') * 26 + usize::from(b - b'A')),
        _ => None,
    }
}

/// Label at a position in the sequence A..Z, AA..ZZ
pub fn alphabet_label(position: usize) -> Option<String> {
    let letter = |i: usize| char::from(b'A' + i as u8);
    if position < 26 {
        Some(letter(position).to_string())
    } else if position < ALPHABET_LEN {
        let p = position - 26;
        Some(format!("{}{}", letter(p / 26), letter(p % 26)))
    } else {
        None
    }
}

/// Label validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("label is empty")]
    Empty,

    #[error("'{0}' must start with one or two letters")]
    NotAlphabetic(String),

    #[error("'{0}' is longer than two letters")]
    TooLong(String),

    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("a range cannot start with a modifier ('{0}')")]
    RangeStartModifier(String),

    #[error("'{0}' is not a label or a label range")]
    Malformed(String),
}
