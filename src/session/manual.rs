//! Hand-entered inspections: thermal gaps and rotor weights

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ManualEntryError {
    #[error("no thermal gap values given")]
    NoValues,

    #[error("TG{index} = {value} is outside 0.0 - 1.0")]
    GapOutOfRange { index: usize, value: f64 },

    #[error("{name} must be a whole number, got '{value}'")]
    NotAWeight { name: &'static str, value: String },

    #[error("weight sum overflows")]
    Overflow,
}

/// Name/Meas rows for a list of thermal gaps, named TG1..TGn in entry order
pub fn thermal_gap_rows(values: &[f64]) -> Result<Vec<(String, String)>, ManualEntryError> {
    if values.is_empty() {
        return Err(ManualEntryError::NoValues);
    }
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let index = i + 1;
            if !(0.0..=1.0).contains(&value) {
                return Err(ManualEntryError::GapOutOfRange { index, value });
            }
            Ok((format!("TG{}", index), value.to_string()))
        })
        .collect()
}

/// Parse a weight field; a blank field counts as zero
pub fn parse_weight(name: &'static str, raw: &str) -> Result<i64, ManualEntryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| ManualEntryError::NotAWeight {
        name,
        value: trimmed.to_string(),
    })
}

/// TEW, NTEW and the overall weight OAW = TEW + NTEW
pub fn rotor_weight_rows(te: i64, nte: i64) -> Result<Vec<(String, String)>, ManualEntryError> {
    let total = te.checked_add(nte).ok_or(ManualEntryError::Overflow)?;
    Ok(vec![
        ("TEW".to_string(), te.to_string()),
        ("NTEW".to_string(), nte.to_string()),
        ("OAW".to_string(), total.to_string()),
    ])
}
