//! Measurement records read from CMM result files, and job-to-job comparison

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Control kinds that carry a usable measurement
const MEASURED_CONTROLS: &[&str] = &["Custom", "3D Distance", "Diameter", "Meas"];

/// Control kind used for axial distances
pub const CONTROL_3D_DISTANCE: &str = "3D Distance";

/// One `Name,Meas` pair with a validated numeric measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub name: String,

    /// PolyWorks control kind, when the file has a `Control` column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,

    pub meas: f64,
}

impl Measurement {
    pub fn new(name: impl Into<String>, meas: f64) -> Self {
        Self {
            name: name.into(),
            control: None,
            meas,
        }
    }

    pub fn with_control(mut self, control: impl Into<String>) -> Self {
        self.control = Some(control.into());
        self
    }

    /// Measurement as written into a drawing; whole values keep their `.0`
    pub fn meas_text(&self) -> String {
        format!("{:?}", self.meas)
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "Meas", default)]
    meas: Option<String>,

    #[serde(rename = "Control", default)]
    control: Option<String>,
}

/// Records loaded from one results file
#[derive(Debug, Clone, Default)]
pub struct MeasurementSet {
    /// Whether the file is a PolyWorks export (has a `Control` column)
    pub has_control: bool,
    pub records: Vec<Measurement>,
}

impl MeasurementSet {
    /// Read a `Name,Meas[,Control,...]` CSV file
    ///
    /// Rows with a blank or non-numeric measurement are dropped.
    pub fn read(path: &Path) -> Result<Self, MeasurementError> {
        let file = File::open(path).map_err(|e| MeasurementError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            MeasurementError::Csv { message, .. } => MeasurementError::Csv {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, MeasurementError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().map_err(csv_error)?.clone();
        for required in ["Name", "Meas"] {
            if !headers.iter().any(|h| h == required) {
                return Err(MeasurementError::MissingColumn(required.to_string()));
            }
        }
        let has_control = headers.iter().any(|h| h == "Control");

        let mut records = Vec::new();
        for (row_idx, result) in rdr.deserialize::<RawRecord>().enumerate() {
            let row_num = row_idx + 2;
            let raw = result.map_err(csv_error)?;

            let text = raw.meas.as_deref().unwrap_or("").trim();
            if text.is_empty() {
                debug!(row = row_num, name = %raw.name, "dropping record without measurement");
                continue;
            }
            let meas = match text.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    warn!(row = row_num, name = %raw.name, value = text, "dropping non-numeric measurement");
                    continue;
                }
            };

            records.push(Measurement {
                name: raw.name,
                control: raw.control.filter(|c| !c.is_empty()),
                meas,
            });
        }

        Ok(Self {
            has_control,
            records,
        })
    }

    /// Keep only measured controls and drop reference features
    ///
    /// Files without a `Control` column are not PolyWorks exports and pass
    /// through unchanged.
    pub fn normalized(self) -> Vec<Measurement> {
        if !self.has_control {
            return self.records;
        }
        self.records
            .into_iter()
            .filter(|m| {
                m.control
                    .as_deref()
                    .is_some_and(|c| MEASURED_CONTROLS.contains(&c))
            })
            .filter(|m| !m.name.contains("Ref"))
            .collect()
    }
}

fn csv_error(e: csv::Error) -> MeasurementError {
    MeasurementError::Csv {
        path: PathBuf::new(),
        message: e.to_string(),
    }
}

/// Write `Name,Meas` rows for manually entered values
pub fn write_name_meas<W: Write>(writer: W, rows: &[(String, String)]) -> Result<(), MeasurementError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["Name", "Meas"]).map_err(csv_error)?;
    for (name, meas) in rows {
        wtr.write_record([name, meas]).map_err(csv_error)?;
    }
    wtr.flush().map_err(|e| MeasurementError::Io {
        path: PathBuf::new(),
        message: e.to_string(),
    })
}

/// One row of a job-to-job comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    pub meas: f64,
    pub reference: Option<f64>,
    pub deviation: Option<f64>,
}

/// Measurements of one job set against a reference job
#[derive(Debug, Clone)]
pub struct Comparison {
    pub job: String,
    pub reference_job: String,
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    /// Rows follow `current`; reference values are matched by name
    pub fn build(
        job: &str,
        reference_job: &str,
        current: &[Measurement],
        reference: &[Measurement],
    ) -> Self {
        let rows = current
            .iter()
            .map(|m| {
                let reference = reference.iter().find(|r| r.name == m.name).map(|r| r.meas);
                if reference.is_none() {
                    debug!(name = %m.name, "no reference measurement");
                }
                ComparisonRow {
                    name: m.name.clone(),
                    meas: m.meas,
                    reference,
                    deviation: reference.map(|r| (m.meas - r).abs()),
                }
            })
            .collect();

        Self {
            job: job.to_string(),
            reference_job: reference_job.to_string(),
            rows,
        }
    }

    pub fn headers(&self) -> [String; 4] {
        [
            "Name".to_string(),
            format!("{} Meas", self.job),
            format!("{} Meas", self.reference_job),
            "Deviation".to_string(),
        ]
    }

    /// Rows as display strings; missing values are blank
    pub fn string_rows(&self) -> Vec<[String; 4]> {
        let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        self.rows
            .iter()
            .map(|r| {
                [
                    r.name.clone(),
                    r.meas.to_string(),
                    opt(r.reference),
                    opt(r.deviation),
                ]
            })
            .collect()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), MeasurementError> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(self.headers()).map_err(csv_error)?;
        for row in self.string_rows() {
            wtr.write_record(row).map_err(csv_error)?;
        }
        wtr.flush().map_err(|e| MeasurementError::Io {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }
}

/// Errors reading or writing measurement files
#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("cannot access {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("malformed CSV {path:?}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("results file has no '{0}' column")]
    MissingColumn(String),
}
