//! One sheet: a sparse grid of cells plus column widths, merges and links

use std::collections::BTreeMap;

use crate::cell::{CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::hyperlink::Hyperlink;
use crate::style::{Style, StylePool};
use crate::{MAX_COLS, MAX_ROWS};

/// Column width used when none is set, in characters
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// A named sheet
///
/// Rows and columns are 0-based. Writes outside the largest grid either
/// format supports are refused; the narrower `.xls` grid is enforced when
/// the sheet is written.
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    links: BTreeMap<(u32, u16), Hyperlink>,
}

impl Worksheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Worksheet {
            name: name.into(),
            cells: CellStorage::default(),
            links: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Value at a position, [`CellValue::Empty`] where nothing is stored
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cell_at(row, col)
            .map(|cell| cell.value.clone())
            .unwrap_or_default()
    }

    /// Style at a position, the pool's default where nothing is stored
    pub fn cell_style_at(&self, row: u32, col: u16) -> &Style {
        let pool = self.cells.style_pool();
        self.cell_at(row, col)
            .and_then(|cell| pool.get(cell.style_index))
            .unwrap_or_else(|| pool.default_style())
    }

    /// Replace a value; the cell keeps its style
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        check_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Replace a style; the cell keeps its value
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        check_position(row, col)?;
        let index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.set_style(row, col, index);
        Ok(())
    }

    /// Drop a cell together with its link. Its row stays present.
    pub fn remove_cell_at(&mut self, row: u32, col: u16) -> Option<CellData> {
        self.links.remove(&(row, col));
        self.cells.remove(row, col)
    }

    /// Mark a row present even if it holds no cells
    pub fn ensure_row(&mut self, row: u32) -> Result<()> {
        check_position(row, 0)?;
        self.cells.ensure_row(row);
        Ok(())
    }

    pub fn has_row(&self, row: u32) -> bool {
        self.cells.has_row(row)
    }

    /// Highest present row, counting rows without cells
    pub fn last_row(&self) -> Option<u32> {
        self.cells.last_row()
    }

    pub fn last_col_in_row(&self, row: u32) -> Option<u16> {
        self.cells.last_col_in_row(row)
    }

    /// Present rows, top to bottom
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.row_indices()
    }

    /// Cells of `row`, left to right
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    /// Smallest range covering every stored cell
    pub fn used_range(&self) -> Option<CellRange> {
        let (top, left, bottom, right) = self.cells.used_bounds()?;
        Some(CellRange::from_indices(top, left, bottom, right))
    }

    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col).unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    /// Columns whose width was set explicitly
    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        self.cells.custom_column_widths()
    }

    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merged_regions()
    }

    /// Add a merged range; overlapping an existing one is an error
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        let overlapping = self.merged_regions().iter().any(|m| m.overlaps(range));
        if overlapping {
            return Err(Error::MergedCellConflict(range.to_string()));
        }
        self.cells.add_merged_region(*range);
        Ok(())
    }

    /// Attach a link, replacing the one already there
    pub fn set_hyperlink_at(&mut self, row: u32, col: u16, link: Hyperlink) -> Result<()> {
        check_position(row, col)?;
        self.links.insert((row, col), link);
        Ok(())
    }

    pub fn hyperlink_at(&self, row: u32, col: u16) -> Option<&Hyperlink> {
        self.links.get(&(row, col))
    }

    /// Links in row-major order
    pub fn hyperlinks(&self) -> impl Iterator<Item = ((u32, u16), &Hyperlink)> {
        self.links.iter().map(|(pos, link)| (*pos, link))
    }

    pub fn style_pool(&self) -> &StylePool {
        self.cells.style_pool()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// True when no row is present
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn check_position(row: u32, col: u16) -> Result<()> {
    match (row < MAX_ROWS, col < MAX_COLS) {
        (false, _) => Err(Error::RowOutOfBounds(row, MAX_ROWS - 1)),
        (_, false) => Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1)),
        _ => Ok(()),
    }
}
