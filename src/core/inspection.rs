//! Inspection kinds and the workspace files each one reads and writes

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Macro that exports a finished inspection's results
pub const MACRO_OUT: &str = "measurementsOut.pwmacro";

/// Kinds of inspection a project workspace can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InspectionKind {
    Axial,
    Diameter,
    ThermalGap,
    RotorWeight,
}

impl InspectionKind {
    pub const ALL: [InspectionKind; 4] = [
        InspectionKind::Axial,
        InspectionKind::Diameter,
        InspectionKind::ThermalGap,
        InspectionKind::RotorWeight,
    ];

    /// CapWords name used for file and layout names
    pub fn name(&self) -> &'static str {
        match self {
            InspectionKind::Axial => "Axial",
            InspectionKind::Diameter => "Diameter",
            InspectionKind::ThermalGap => "ThermalGap",
            InspectionKind::RotorWeight => "RotorWeight",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            InspectionKind::Axial => "Axial",
            InspectionKind::Diameter => "Diameter",
            InspectionKind::ThermalGap => "Thermal Gap",
            InspectionKind::RotorWeight => "Rotor Weight",
        }
    }

    /// Scope file the CMM macro runs from ("AxialScope.csv")
    pub fn scope_file(&self) -> String {
        format!("{}Scope.csv", self.name())
    }

    /// Results file exported after measuring ("Axials.csv")
    pub fn output_file(&self) -> String {
        format!("{}s.csv", self.name())
    }

    /// CAD layout documenting this inspection
    pub fn layout_name(&self) -> &'static str {
        self.name()
    }

    /// Zero-byte marker left once documentation has run
    pub fn doc_trail(&self) -> String {
        format!("{}Doc.txt", self.name())
    }

    /// Macro that starts a CMM inspection, for kinds measured on the CMM
    pub fn macro_in(&self) -> Option<&'static str> {
        match self {
            InspectionKind::Axial => Some("axialsIn.pwmacro"),
            InspectionKind::Diameter => Some("diametersIn.pwmacro"),
            InspectionKind::ThermalGap | InspectionKind::RotorWeight => None,
        }
    }

    /// File whose presence shows the inspection has run at least once
    pub fn measured_marker(&self) -> String {
        match self.macro_in() {
            Some(_) => self.scope_file(),
            None => self.output_file(),
        }
    }

    /// Whether the table in the layout is filled, rather than text only
    pub fn has_doc_table(&self) -> bool {
        matches!(self, InspectionKind::Axial)
    }
}

impl fmt::Display for InspectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Progress of one inspection inside a workspace
#[derive(Debug, Clone, Serialize)]
pub struct InspectionStatus {
    pub kind: InspectionKind,
    /// Scope file exists (results file for manually entered kinds)
    pub measured: bool,
    /// Doc trail exists
    pub documented: bool,
}

/// Progress of every inspection kind in `workspace`
pub fn workspace_status(workspace: &Path) -> Vec<InspectionStatus> {
    InspectionKind::ALL
        .iter()
        .map(|kind| InspectionStatus {
            kind: *kind,
            measured: workspace.join(kind.measured_marker()).is_file(),
            documented: workspace.join(kind.doc_trail()).is_file(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_names() {
        assert_eq!(InspectionKind::Axial.scope_file(), "AxialScope.csv");
        assert_eq!(InspectionKind::Diameter.output_file(), "Diameters.csv");
        assert_eq!(InspectionKind::ThermalGap.output_file(), "ThermalGaps.csv");
        assert_eq!(InspectionKind::RotorWeight.output_file(), "RotorWeights.csv");
        assert_eq!(InspectionKind::Axial.doc_trail(), "AxialDoc.txt");
        assert_eq!(InspectionKind::Diameter.layout_name(), "Diameter");
    }

    #[test]
    fn test_macros() {
        assert_eq!(InspectionKind::Axial.macro_in(), Some("axialsIn.pwmacro"));
        assert_eq!(InspectionKind::Diameter.macro_in(), Some("diametersIn.pwmacro"));
        assert_eq!(InspectionKind::ThermalGap.macro_in(), None);
    }

    #[test]
    fn test_workspace_status() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("AxialScope.csv"), "Stage 1\n").unwrap();
        std::fs::write(tmp.path().join("AxialDoc.txt"), "").unwrap();
        std::fs::write(tmp.path().join("DiameterScope.csv"), "A\n").unwrap();
        std::fs::write(tmp.path().join("Diameters.csv"), "Name,Meas\n").unwrap();
        std::fs::write(tmp.path().join("RotorWeights.csv"), "Name,Meas\n").unwrap();

        let status = workspace_status(tmp.path());
        assert_eq!(status.len(), 4);
        assert!(status[0].measured && status[0].documented);
        assert!(status[1].measured && !status[1].documented);
        assert!(!status[2].measured);
        assert!(status[3].measured && !status[3].documented);
    }
}
