//! Axial documentation table - a fixed grid of feature rows by stage columns
//!
//! Layout, top to bottom: the title row, a header row holding "Feature" and
//! the stage names, then one row per feature. Values are addressed by
//! composite record names of the form `"<stage>-<feature>"`.

use thiserror::Error;

use crate::core::host::CadTable;

pub const TABLE_TITLE: &str = "Axial Measurements From Active Face";
pub const FEATURE_HEADER: &str = "Feature";

/// Extra row and column added when the balance drum was measured
pub const BALANCE_DRUM_ROW: &str = "B.D. Face";
pub const BALANCE_DRUM_COLUMN: &str = "B.D.";

/// Record name of a balance drum face measurement
pub const BALANCE_DRUM_RECORD: &str = "B.D.-B.D. Face";

const ROW_OFFSET: usize = 1;
const COL_OFFSET: usize = 1;
const TABLE_POS: f64 = 0.061;
const TITLE_ROW_HEIGHT: f64 = 0.2533;
const DATA_ROW_HEIGHT: f64 = 0.2133;
const DATA_TEXT_HEIGHT: f64 = 0.07;
const TABLE_WIDTH: f64 = 10.375;

/// Failure to place a record in the table
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("'{0}' is not a '<stage>-<feature>' name")]
    NoSeparator(String),

    #[error("'{name}': no column '{column}'")]
    UnknownColumn { name: String, column: String },

    #[error("'{name}': no row '{row}'")]
    UnknownRow { name: String, row: String },
}

#[derive(Debug, Clone)]
pub struct DocTable {
    /// "Feature" followed by the feature rows
    row_headers: Vec<String>,
    /// Stage names ("Stage 1", ...)
    col_headers: Vec<String>,
    cells: Vec<Vec<String>>,
}

impl DocTable {
    pub fn new<R, C>(feature_rows: R, stage_names: C, balance_drum: bool) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut row_headers: Vec<String> = std::iter::once(FEATURE_HEADER.to_string())
            .chain(feature_rows.into_iter().map(Into::into))
            .collect();
        let mut col_headers: Vec<String> = stage_names.into_iter().map(Into::into).collect();
        if balance_drum {
            row_headers.push(BALANCE_DRUM_ROW.to_string());
            col_headers.push(BALANCE_DRUM_COLUMN.to_string());
        }

        let rows = row_headers.len() + ROW_OFFSET;
        let columns = col_headers.len() + COL_OFFSET;
        let mut cells = vec![vec![String::new(); columns]; rows];
        cells[0][0] = TABLE_TITLE.to_string();
        for (i, header) in row_headers.iter().enumerate() {
            cells[i + ROW_OFFSET][0] = header.clone();
        }
        for (i, header) in col_headers.iter().enumerate() {
            cells[ROW_OFFSET][i + COL_OFFSET] = header.clone();
        }

        Self {
            row_headers,
            col_headers,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.col_headers.len() + COL_OFFSET
    }

    /// Top-left corner, placed so the bottom edge sits at a fixed offset
    pub fn origin(&self) -> (f64, f64) {
        let data_height = self.row_headers.len() as f64 * DATA_ROW_HEIGHT;
        (TABLE_POS, data_height + TITLE_ROW_HEIGHT + TABLE_POS)
    }

    /// Cell addressed by a `"<stage>-<feature>"` record name
    pub fn position(&self, name: &str) -> Result<(usize, usize), LookupError> {
        let mut parts = name.split('-');
        let (column, row) = match (parts.next(), parts.next()) {
            (Some(column), Some(row)) => (column, row),
            _ => return Err(LookupError::NoSeparator(name.to_string())),
        };

        let col = self
            .col_headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| LookupError::UnknownColumn {
                name: name.to_string(),
                column: column.to_string(),
            })?;
        // The "Feature" header row is not addressable
        let row_idx = self
            .row_headers
            .iter()
            .skip(1)
            .position(|h| h == row)
            .ok_or_else(|| LookupError::UnknownRow {
                name: name.to_string(),
                row: row.to_string(),
            })?;

        Ok((row_idx + 1 + ROW_OFFSET, col + COL_OFFSET))
    }

    pub fn set(&mut self, row: usize, col: usize, text: impl Into<String>) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = text.into();
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    pub fn to_grid(&self) -> &[Vec<String>] {
        &self.cells
    }

    pub fn to_cad_table(&self) -> CadTable {
        let (x, y) = self.origin();
        CadTable {
            title: TABLE_TITLE.to_string(),
            origin: [x, y],
            width: TABLE_WIDTH,
            title_row_height: TITLE_ROW_HEIGHT,
            row_height: DATA_ROW_HEIGHT,
            text_height: DATA_TEXT_HEIGHT,
            cells: self.cells.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(balance_drum: bool) -> DocTable {
        DocTable::new(
            ["Eye Face", "I.B.P.", "G.P. Width"],
            ["Stage 1", "Stage 2", "Stage 3"],
            balance_drum,
        )
    }

    #[test]
    fn test_layout() {
        let t = table(false);
        assert_eq!(t.rows(), 5);
        assert_eq!(t.columns(), 4);
        assert_eq!(t.cell(0, 0), Some(TABLE_TITLE));
        assert_eq!(t.cell(1, 0), Some("Feature"));
        assert_eq!(t.cell(1, 1), Some("Stage 1"));
        assert_eq!(t.cell(2, 0), Some("Eye Face"));
        assert_eq!(t.cell(4, 0), Some("G.P. Width"));
    }

    #[test]
    fn test_balance_drum_adds_row_and_column() {
        let t = table(true);
        assert_eq!(t.rows(), 6);
        assert_eq!(t.columns(), 5);
        assert_eq!(t.cell(5, 0), Some(BALANCE_DRUM_ROW));
        assert_eq!(t.cell(1, 4), Some(BALANCE_DRUM_COLUMN));
        assert_eq!(t.position(BALANCE_DRUM_RECORD), Ok((5, 4)));
    }

    #[test]
    fn test_position() {
        let t = table(false);
        assert_eq!(t.position("Stage 1-Eye Face"), Ok((2, 1)));
        assert_eq!(t.position("Stage 3-G.P. Width"), Ok((4, 3)));
        assert_eq!(
            t.position("Distance A"),
            Err(LookupError::NoSeparator("Distance A".to_string()))
        );
        assert!(matches!(
            t.position("Stage 9-Eye Face"),
            Err(LookupError::UnknownColumn { .. })
        ));
        assert!(matches!(
            t.position("Stage 1-Feature"),
            Err(LookupError::UnknownRow { .. })
        ));
    }

    #[test]
    fn test_origin_anchors_bottom_edge() {
        let small = table(false);
        let large = table(true);
        let bottom = |t: &DocTable| {
            let (_, y) = t.origin();
            y - (t.rows() - 1) as f64 * DATA_ROW_HEIGHT - TITLE_ROW_HEIGHT
        };
        assert!((bottom(&small) - TABLE_POS).abs() < 1e-9);
        assert!((bottom(&large) - TABLE_POS).abs() < 1e-9);
        assert!((small.origin().1 - (4.0 * DATA_ROW_HEIGHT + TITLE_ROW_HEIGHT + TABLE_POS)).abs() < 1e-9);
    }

    #[test]
    fn test_cad_table() {
        let mut t = table(false);
        t.set(2, 1, "12.6255");
        let cad = t.to_cad_table();
        assert_eq!(cad.cells[2][1], "12.6255");
        assert_eq!(cad.width, TABLE_WIDTH);
        assert_eq!(cad.origin[0], TABLE_POS);
    }
}
