//! Sparse cell grid behind a worksheet
//!
//! Rows live in ordered maps, so every walk over the grid is row-major.
//! A row can be present with no cells at all; a header row whose cells
//! were all removed still counts toward the sheet's extent.

use std::collections::BTreeMap;

use super::CellValue;
use crate::style::StylePool;
use crate::CellRange;

/// A stored cell: its value and an index into the sheet's style pool
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    pub value: CellValue,
    /// 0 is the pool's default style
    pub style_index: u32,
}

impl CellData {
    pub fn new(value: CellValue) -> Self {
        CellData::with_style(value, 0)
    }

    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        CellData { value, style_index }
    }

    /// Nothing worth storing: no value and the default style
    pub fn is_empty(&self) -> bool {
        self.style_index == 0 && self.value.is_empty()
    }
}

type Row = BTreeMap<u16, CellData>;

#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, Row>,
    pub(crate) style_pool: StylePool,
    column_widths: BTreeMap<u16, f64>,
    merged_regions: Vec<CellRange>,
}

impl CellStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row)?.get(&col)
    }

    /// Store `data`, or drop the cell when `data` is empty. Either way the
    /// row ends up present.
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        let cells = self.rows.entry(row).or_default();
        if data.is_empty() {
            cells.remove(&col);
        } else {
            cells.insert(col, data);
        }
    }

    /// Replace the value and keep the style
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map_or(0, |cell| cell.style_index);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Replace the style and keep the value
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        let value = self.remove(row, col).map(|cell| cell.value).unwrap_or_default();
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Take a cell out, leaving its row in place
    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellData> {
        self.rows.get_mut(&row)?.remove(&col)
    }

    pub fn ensure_row(&mut self, row: u32) {
        self.rows.entry(row).or_default();
    }

    pub fn has_row(&self, row: u32) -> bool {
        self.rows.contains_key(&row)
    }

    pub fn last_row(&self) -> Option<u32> {
        self.rows.last_key_value().map(|(row, _)| *row)
    }

    pub fn last_col_in_row(&self, row: u32) -> Option<u16> {
        self.rows.get(&row)?.last_key_value().map(|(col, _)| *col)
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(Row::len).sum()
    }

    /// No rows at all, not even empty ones
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(top, left, bottom, right)` over rows that hold cells
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let mut filled = self.rows.iter().filter_map(|(row, cells)| {
            let (first, _) = cells.first_key_value()?;
            let (last, _) = cells.last_key_value()?;
            Some((*row, *first, *last))
        });
        let (top, left, right) = filled.next()?;
        let init = (top, left, top, right);
        Some(filled.fold(init, |(top, left, _, right), (row, first, last)| {
            (top, left.min(first), row, right.max(last))
        }))
    }

    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cells| cells.iter().map(|(col, cell)| (*col, cell)))
    }

    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }

    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    pub fn add_merged_region(&mut self, range: CellRange) {
        self.merged_regions.push(range);
    }

    pub fn style_pool(&self) -> &StylePool {
        &self.style_pool
    }

    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        &mut self.style_pool
    }
}
