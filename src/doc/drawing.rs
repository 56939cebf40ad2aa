//! File-backed CAD host working on a YAML export of a drawing

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::fs::write_atomic;
use crate::core::host::{CadHost, CadTable, HostError, TextObject};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    #[serde(default)]
    pub layouts: Vec<Layout>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,

    #[serde(default)]
    pub texts: Vec<TextObject>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<CadTable>,
}

/// A drawing loaded from disk, mutated in memory, and saved on regen
#[derive(Debug)]
pub struct DrawingSnapshot {
    path: PathBuf,
    drawing: Drawing,
    active: Option<usize>,
}

impl DrawingSnapshot {
    pub fn open(path: &Path) -> Result<Self, HostError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HostError::Unavailable(format!("drawing {}: {}", path.display(), e))
        })?;
        let drawing: Drawing = serde_yml::from_str(&contents).map_err(|e| {
            HostError::Rejected(format!("drawing {} is malformed: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), layouts = drawing.layouts.len(), "opened drawing");
        Ok(Self {
            path: path.to_path_buf(),
            drawing,
            active: None,
        })
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    fn layout(&self) -> Result<&Layout, HostError> {
        self.active
            .and_then(|i| self.drawing.layouts.get(i))
            .ok_or_else(|| HostError::Rejected("no active layout".to_string()))
    }

    fn layout_mut(&mut self) -> Result<&mut Layout, HostError> {
        self.active
            .and_then(|i| self.drawing.layouts.get_mut(i))
            .ok_or_else(|| HostError::Rejected("no active layout".to_string()))
    }
}

impl CadHost for DrawingSnapshot {
    fn set_active_layout(&mut self, name: &str) -> Result<(), HostError> {
        let index = self
            .drawing
            .layouts
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| HostError::LayoutNotFound(name.to_string()))?;
        self.active = Some(index);
        Ok(())
    }

    fn text_objects(&self) -> Result<Vec<TextObject>, HostError> {
        Ok(self.layout()?.texts.clone())
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), HostError> {
        let layout = self.layout_mut()?;
        let object = layout
            .texts
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| HostError::Rejected(format!("no text object '{}'", id)))?;
        object.text = text.to_string();
        Ok(())
    }

    fn insert_table(&mut self, table: CadTable) -> Result<(), HostError> {
        let layout = self.layout_mut()?;
        // Re-documenting replaces the earlier table
        layout.tables.retain(|t| t.title != table.title);
        layout.tables.push(table);
        Ok(())
    }

    fn regen(&mut self) -> Result<(), HostError> {
        let yaml = serde_yml::to_string(&self.drawing)
            .map_err(|e| HostError::Rejected(e.to_string()))?;
        write_atomic(&self.path, yaml).map_err(|e| {
            HostError::Unavailable(format!("drawing {}: {}", self.path.display(), e))
        })?;
        info!(path = %self.path.display(), "saved drawing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DRAWING: &str = "\
layouts:
  - name: Axial
    texts:
      - id: T1
        text: A
  - name: Diameter
    texts:
      - id: D1
        text: B
";

    fn snapshot() -> (tempfile::TempDir, DrawingSnapshot) {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("drawing.yaml");
        std::fs::write(&path, DRAWING).unwrap();
        let snap = DrawingSnapshot::open(&path).unwrap();
        (tmp, snap)
    }

    #[test]
    fn test_missing_drawing_is_unavailable() {
        let tmp = tempdir().unwrap();
        let err = DrawingSnapshot::open(&tmp.path().join("none.yaml")).unwrap_err();
        assert!(matches!(err, HostError::Unavailable(_)));
    }

    #[test]
    fn test_unknown_layout() {
        let (_tmp, mut snap) = snapshot();
        let err = snap.set_active_layout("ThermalGap").unwrap_err();
        assert!(matches!(err, HostError::LayoutNotFound(name) if name == "ThermalGap"));
        assert!(snap.text_objects().is_err());
    }

    #[test]
    fn test_edit_and_regen_persists() {
        let (tmp, mut snap) = snapshot();
        snap.set_active_layout("Diameter").unwrap();
        assert_eq!(snap.text_objects().unwrap()[0].text, "B");
        snap.set_text("D1", "10.5").unwrap();
        snap.regen().unwrap();

        let reopened = DrawingSnapshot::open(&tmp.path().join("drawing.yaml")).unwrap();
        assert_eq!(reopened.drawing().layouts[1].texts[0].text, "10.5");
        assert_eq!(reopened.drawing().layouts[0].texts[0].text, "A");
    }

    #[test]
    fn test_insert_table_replaces_previous() {
        let (_tmp, mut snap) = snapshot();
        snap.set_active_layout("Axial").unwrap();
        let table = CadTable {
            title: "T".to_string(),
            origin: [0.0, 1.0],
            width: 1.0,
            title_row_height: 0.1,
            row_height: 0.1,
            text_height: 0.05,
            cells: vec![vec!["x".to_string()]],
        };
        snap.insert_table(table.clone()).unwrap();
        snap.insert_table(table).unwrap();
        assert_eq!(snap.drawing().layouts[0].tables.len(), 1);
    }
}
