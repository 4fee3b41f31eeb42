//! Spreadsheet-backed tabular data store
//!
//! A [`TabularDataStore`] owns one decoded workbook. Row 0 of every sheet is
//! the header row holding the column names; data rows are addressed by
//! 1-based row numbers that equal their physical row index. Reads never
//! fail loudly: every lookup that misses answers with an empty value
//! (`""`, `0`, `-1`, `false`) and logs why.
//!
//! Writes that do not fit the file format (too many rows or columns, text
//! too long) return `false` and change nothing. `remove_sheet` refuses to
//! remove a workbook's only sheet, since neither format can store a
//! workbook without one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tabstore_core::date::date_to_serial;
use tabstore_core::{
    CellValue, Color, Hyperlink, NumberFormat, Style, Underline, Workbook, Worksheet,
};

use crate::error::{StoreError, StoreResult};
use crate::format::FileFormat;
use crate::options::{PersistMode, StoreOptions};
use crate::render::render_value;

/// Column selector: a header name or a 1-based index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRef<'a> {
    /// Header text, matched trimmed and case-insensitively
    Name(&'a str),
    /// 1-based column index
    Index(i32),
}

impl<'a> From<&'a str> for ColumnRef<'a> {
    fn from(name: &'a str) -> Self {
        ColumnRef::Name(name)
    }
}

impl<'a> From<&'a String> for ColumnRef<'a> {
    fn from(name: &'a String) -> Self {
        ColumnRef::Name(name.as_str())
    }
}

impl From<i32> for ColumnRef<'_> {
    fn from(index: i32) -> Self {
        ColumnRef::Index(index)
    }
}

/// Style applied to cells carrying a URL
pub fn link_style() -> Style {
    Style::new()
        .font_color(Color::INDEXED_BLUE)
        .underline(Underline::Single)
}

/// Style applied to header cells created by `add_column`
pub fn header_style() -> Style {
    Style::new().fill_color(Color::INDEXED_GREY_40)
}

/// How a write treats the target cell's style
#[derive(Debug)]
enum StyleChange {
    Keep,
    Replace(Style),
    NumberFormat(NumberFormat),
}

/// A pending single-cell write
#[derive(Debug)]
struct CellWrite {
    value: CellValue,
    style: StyleChange,
    link: Option<Hyperlink>,
}

#[derive(Debug)]
struct Loaded {
    format: FileFormat,
    workbook: Workbook,
    default_sheet: Option<String>,
}

#[derive(Debug)]
enum State {
    Ready(Loaded),
    Unusable(StoreError),
}

/// Spreadsheet file exposed as named tables of strings
#[derive(Debug)]
pub struct TabularDataStore {
    path: PathBuf,
    options: StoreOptions,
    state: State,
    dirty: bool,
}

impl TabularDataStore {
    /// Open a spreadsheet with default options
    ///
    /// A file that cannot be opened yields an unusable store rather than
    /// an error; see [`is_usable`](Self::is_usable).
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open a spreadsheet with explicit options
    pub fn open_with<P: AsRef<Path>>(path: P, options: StoreOptions) -> Self {
        let path = options.resolve(path.as_ref());
        log::info!("opening tabular data store at {}", path.display());

        let state = match Self::load(&path) {
            Ok((format, workbook)) => {
                let default_sheet = workbook.worksheet(0).map(|ws| ws.name().to_string());
                log::info!(
                    "opened {} with {} sheet(s), default sheet {:?}",
                    path.display(),
                    workbook.sheet_count(),
                    default_sheet
                );
                State::Ready(Loaded {
                    format,
                    workbook,
                    default_sheet,
                })
            }
            Err(e) => {
                log::error!("cannot open {}: {}", path.display(), e);
                State::Unusable(e)
            }
        };

        Self {
            path,
            options,
            state,
            dirty: false,
        }
    }

    fn load(path: &Path) -> StoreResult<(FileFormat, Workbook)> {
        let format = FileFormat::from_path(path)?;
        let workbook = format.read(path)?;
        Ok((format, workbook))
    }

    /// Create a new file holding one empty sheet named `Sheet1`, and open it
    pub fn create<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::create_with(path, StoreOptions::default())
    }

    /// Create a new file with explicit options
    pub fn create_with<P: AsRef<Path>>(path: P, options: StoreOptions) -> StoreResult<Self> {
        let path = options.resolve(path.as_ref());
        let format = FileFormat::from_path(&path)?;
        let workbook = Workbook::new();
        format.write(&workbook, &path)?;
        log::info!("created {}", path.display());

        let default_sheet = workbook.worksheet(0).map(|ws| ws.name().to_string());
        Ok(Self {
            path,
            options,
            state: State::Ready(Loaded {
                format,
                workbook,
                default_sheet,
            }),
            dirty: false,
        })
    }

    // === State ===

    /// Whether the file opened successfully
    pub fn is_usable(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Why the store is unusable, if it is
    pub fn open_error(&self) -> Option<&StoreError> {
        match &self.state {
            State::Unusable(e) => Some(e),
            State::Ready(_) => None,
        }
    }

    /// Resolved file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File format chosen at open
    pub fn format(&self) -> Option<FileFormat> {
        self.loaded().map(|l| l.format)
    }

    /// Options the store was opened with
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Name of the first sheet at open time
    pub fn default_sheet(&self) -> Option<&str> {
        self.loaded().and_then(|l| l.default_sheet.as_deref())
    }

    /// The in-memory workbook
    pub fn workbook(&self) -> Option<&Workbook> {
        self.loaded().map(|l| &l.workbook)
    }

    /// Take the workbook out of the store, without persisting pending changes
    pub fn into_workbook(mut self) -> StoreResult<Workbook> {
        self.dirty = false;
        match std::mem::replace(
            &mut self.state,
            State::Unusable(StoreError::Unusable("workbook taken".into())),
        ) {
            State::Ready(loaded) => Ok(loaded.workbook),
            State::Unusable(e) => Err(StoreError::Unusable(e.to_string())),
        }
    }

    /// Whether deferred changes are waiting for `flush()`
    pub fn has_pending_changes(&self) -> bool {
        self.dirty
    }

    fn loaded(&self) -> Option<&Loaded> {
        match &self.state {
            State::Ready(loaded) => Some(loaded),
            State::Unusable(_) => None,
        }
    }

    fn loaded_mut(&mut self) -> Option<&mut Loaded> {
        match &mut self.state {
            State::Ready(loaded) => Some(loaded),
            State::Unusable(_) => None,
        }
    }

    /// Look a sheet up by exact name, then by its upper-cased name
    fn sheet(&self, name: &str) -> Option<&Worksheet> {
        let workbook = &self.loaded()?.workbook;
        sheet_position(workbook, name).and_then(|i| workbook.worksheet(i))
    }

    fn sheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        let workbook = &mut self.loaded_mut()?.workbook;
        sheet_position(workbook, name).and_then(move |i| workbook.worksheet_mut(i))
    }

    fn date_1904(&self) -> bool {
        self.loaded()
            .map(|l| l.workbook.settings().date_1904)
            .unwrap_or(false)
    }

    // === Reads ===

    /// Sheet names in file order
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook().map(Workbook::sheet_names).unwrap_or_default()
    }

    /// Whether a sheet exists (exact name, then upper-cased)
    pub fn sheet_exists(&self, name: &str) -> bool {
        log::info!("sheet_exists(sheet={name})");
        let exists = self.sheet(name).is_some();
        log::info!("sheet_exists(sheet={name}) -> {exists}");
        exists
    }

    /// Index of the last present row (header = 0); 0 for a missing or empty sheet
    pub fn row_count(&self, sheet: &str) -> i32 {
        log::info!("row_count(sheet={sheet})");
        let Some(ws) = self.sheet(sheet) else {
            log::warn!("sheet '{sheet}' not found, row count is 0");
            return 0;
        };
        let count = row_count_of(ws);
        log::info!("row_count(sheet={sheet}) -> {count}");
        count
    }

    /// Number of header cells; -1 without a sheet or header row
    pub fn column_count(&self, sheet: &str) -> i32 {
        log::info!("column_count(sheet={sheet})");
        let Some(ws) = self.sheet(sheet) else {
            log::warn!("sheet '{sheet}' not found, column count is -1");
            return -1;
        };
        if !ws.has_row(0) {
            log::warn!("sheet '{sheet}' has no header row, column count is -1");
            return -1;
        }
        let count = ws.last_col_in_row(0).map_or(0, |c| i32::from(c) + 1);
        log::info!("column_count(sheet={sheet}) -> {count}");
        count
    }

    /// Rendered content of a cell, `""` when anything is missing
    ///
    /// `column` is a header name or a 1-based index; `row` is 1-based.
    pub fn cell<'a, C: Into<ColumnRef<'a>>>(&self, sheet: &str, column: C, row: i32) -> String {
        let column = column.into();
        log::info!("cell(sheet={sheet}, column={column:?}, row={row})");
        let text = self.cell_text(sheet, column, row);
        log::info!("cell(sheet={sheet}, column={column:?}, row={row}) -> {text:?}");
        text
    }

    fn cell_text(&self, sheet: &str, column: ColumnRef<'_>, row: i32) -> String {
        if row <= 0 {
            log::warn!("invalid row {row}, rows start at 1");
            return String::new();
        }
        let Some(ws) = self.sheet(sheet) else {
            log::warn!("sheet '{sheet}' not found");
            return String::new();
        };
        let Some(col) = resolve_column(ws, column) else {
            log::warn!("column {column:?} not found in sheet '{sheet}'");
            return String::new();
        };
        render_at(ws, row as u32, col, self.date_1904())
    }

    /// First data row whose `column_name` cell renders equal to `value`
    /// (case-insensitive, whole value); -1 when none does
    pub fn find_row_by_value(&self, sheet: &str, column_name: &str, value: &str) -> i32 {
        log::info!("find_row_by_value(sheet={sheet}, column={column_name}, value={value})");
        let Some(ws) = self.sheet(sheet) else {
            log::warn!("sheet '{sheet}' not found");
            return -1;
        };
        let Some(col) = header_column(ws, column_name) else {
            log::warn!("column '{column_name}' not found in sheet '{sheet}'");
            return -1;
        };

        let date_1904 = self.date_1904();
        let found = (1..=row_count_of(ws))
            .find(|&row| same_text(&render_at(ws, row as u32, col, date_1904), value));
        match found {
            Some(row) => {
                log::info!("found '{value}' in column '{column_name}' at row {row}");
                row
            }
            None => {
                log::warn!("'{value}' not found in column '{column_name}' of sheet '{sheet}'");
                -1
            }
        }
    }

    /// Read the block of rows registered under `test_name`
    ///
    /// The block starts at the first row whose column 1 equals `test_name`.
    /// The following row names the keys; every row after it, up to the first
    /// one with an empty column 1, becomes a key -> value map.
    pub fn test_data(&self, sheet: &str, test_name: &str) -> Vec<HashMap<String, String>> {
        log::info!("test_data(sheet={sheet}, test={test_name})");
        let Some(ws) = self.sheet(sheet) else {
            log::warn!("sheet '{sheet}' not found");
            return Vec::new();
        };
        let date_1904 = self.date_1904();
        let last = row_count_of(ws) as u32;
        let text = |row: u32, col: u16| render_at(ws, row, col, date_1904);

        let Some(start) = (1..=last).find(|&row| text(row, 0) == test_name) else {
            log::warn!("test '{test_name}' not found in sheet '{sheet}'");
            return Vec::new();
        };
        let key_row = start + 1;
        let keys: Vec<String> = (0..=ws.last_col_in_row(key_row).unwrap_or(0))
            .map(|col| text(key_row, col))
            .take_while(|key| !key.is_empty())
            .collect();

        let blocks: Vec<HashMap<String, String>> = (key_row + 1..=last)
            .take_while(|&row| !text(row, 0).is_empty())
            .map(|row| {
                keys.iter()
                    .enumerate()
                    .map(|(col, key)| (key.clone(), text(row, col as u16)))
                    .collect::<HashMap<_, _>>()
            })
            .collect();

        log::info!(
            "test_data(sheet={sheet}, test={test_name}) -> {} row(s) x {} key(s)",
            blocks.len(),
            keys.len()
        );
        blocks
    }

    /// Every data row rendered across the header's width
    pub fn data_rows(&self, sheet: &str) -> Vec<Vec<String>> {
        log::info!("data_rows(sheet={sheet})");
        let Some(ws) = self.sheet(sheet) else {
            log::warn!("sheet '{sheet}' not found");
            return Vec::new();
        };
        let width = ws.last_col_in_row(0).map_or(0, |c| c + 1);
        let date_1904 = self.date_1904();
        (1..=row_count_of(ws) as u32)
            .map(|row| {
                (0..width)
                    .map(|col| render_at(ws, row, col, date_1904))
                    .collect()
            })
            .collect()
    }

    // === Writes ===

    /// Store `value` as text, creating the column header when needed
    pub fn set_cell(&mut self, sheet: &str, column_name: &str, row: i32, value: &str) -> bool {
        log::info!("set_cell(sheet={sheet}, column={column_name}, row={row}, value={value:?})");
        let ok = self.write_cell(
            sheet,
            column_name,
            row,
            CellWrite {
                value: CellValue::string(value),
                style: StyleChange::Keep,
                link: None,
            },
        );
        log::info!("set_cell(sheet={sheet}, column={column_name}, row={row}) -> {ok}");
        ok
    }

    /// Store `text` with a URL hyperlink and the link style
    pub fn set_cell_with_link(
        &mut self,
        sheet: &str,
        column_name: &str,
        row: i32,
        text: &str,
        url: &str,
    ) -> bool {
        log::info!(
            "set_cell_with_link(sheet={sheet}, column={column_name}, row={row}, text={text:?}, url={url})"
        );
        let ok = self.write_cell(
            sheet,
            column_name,
            row,
            CellWrite {
                value: CellValue::string(text),
                style: StyleChange::Replace(link_style()),
                link: Some(Hyperlink::url(url)),
            },
        );
        log::info!("set_cell_with_link(sheet={sheet}, column={column_name}, row={row}) -> {ok}");
        ok
    }

    /// Store a date so it reads back as `M/D/YY`
    pub fn set_cell_date(
        &mut self,
        sheet: &str,
        column_name: &str,
        row: i32,
        date: NaiveDate,
    ) -> bool {
        log::info!("set_cell_date(sheet={sheet}, column={column_name}, row={row}, date={date})");
        let serial = match date_to_serial(date, self.date_1904()) {
            Ok(serial) => serial,
            Err(e) => {
                log::error!("cannot store date {date}: {e}");
                return false;
            }
        };
        let ok = self.write_cell(
            sheet,
            column_name,
            row,
            CellWrite {
                value: CellValue::Number(serial),
                style: StyleChange::NumberFormat(NumberFormat::date_short()),
                link: None,
            },
        );
        log::info!("set_cell_date(sheet={sheet}, column={column_name}, row={row}) -> {ok}");
        ok
    }

    fn write_cell(&mut self, sheet: &str, column_name: &str, row: i32, write: CellWrite) -> bool {
        if !self.is_usable() {
            return false;
        }
        if row <= 0 {
            log::warn!("invalid row {row}, rows start at 1");
            return false;
        }
        let Some(format) = self.format() else {
            return false;
        };
        let Some(ws) = self.sheet_mut(sheet) else {
            log::warn!("sheet '{sheet}' not found");
            return false;
        };
        if let Err(e) = apply_write(ws, format, column_name, row as u32, write) {
            log::error!("cannot write sheet '{sheet}', column '{column_name}', row {row}: {e}");
            return false;
        }
        self.persist()
    }

    /// Add an empty sheet
    pub fn add_sheet(&mut self, name: &str) -> bool {
        log::info!("add_sheet(sheet={name})");
        let Some(loaded) = self.loaded_mut() else {
            return false;
        };
        if loaded.workbook.sheet_index(name).is_some() {
            log::warn!("sheet '{name}' already exists");
            return false;
        }
        if let Err(e) = loaded.workbook.add_worksheet_with_name(name) {
            log::warn!("cannot add sheet '{name}': {e}");
            return false;
        }
        let ok = self.persist();
        log::info!("add_sheet(sheet={name}) -> {ok}");
        ok
    }

    /// Remove a sheet; the last remaining sheet cannot be removed
    pub fn remove_sheet(&mut self, name: &str) -> bool {
        log::info!("remove_sheet(sheet={name})");
        let Some(loaded) = self.loaded_mut() else {
            return false;
        };
        let Some(index) = sheet_position(&loaded.workbook, name) else {
            log::warn!("sheet '{name}' not found");
            return false;
        };
        if loaded.workbook.sheet_count() == 1 {
            log::warn!("sheet '{name}' is the only sheet and cannot be removed");
            return false;
        }
        if let Err(e) = loaded.workbook.remove_worksheet(index) {
            log::error!("cannot remove sheet '{name}': {e}");
            return false;
        }
        let ok = self.persist();
        log::info!("remove_sheet(sheet={name}) -> {ok}");
        ok
    }

    /// Append a header cell with the header style
    pub fn add_column(&mut self, sheet: &str, name: &str) -> bool {
        log::info!("add_column(sheet={sheet}, column={name})");
        let Some(format) = self.format() else {
            return false;
        };
        let Some(ws) = self.sheet_mut(sheet) else {
            log::warn!("sheet '{sheet}' not found");
            return false;
        };
        if header_column(ws, name).is_some() {
            log::warn!("column '{name}' already exists in sheet '{sheet}'");
            return false;
        }
        let col = next_header_column(ws);
        if let Err(e) = format.check_cell(0, col, Some(name)) {
            log::error!("cannot add column '{name}' to sheet '{sheet}': {e}");
            return false;
        }
        let added = ws
            .set_cell_value_at(0, col, name)
            .and_then(|()| ws.set_cell_style_at(0, col, &header_style()));
        if let Err(e) = added {
            log::error!("cannot add column '{name}' to sheet '{sheet}': {e}");
            return false;
        }
        log::debug!("created header cell '{name}' at column {}", col + 1);
        let ok = self.persist();
        log::info!("add_column(sheet={sheet}, column={name}) -> {ok}");
        ok
    }

    /// Clear column `index` (1-based) in every row, header included
    ///
    /// Cells to the right keep their positions.
    pub fn remove_column(&mut self, sheet: &str, index: i32) -> bool {
        log::info!("remove_column(sheet={sheet}, index={index})");
        if index <= 0 {
            log::warn!("invalid column {index}, columns start at 1");
            return false;
        }
        let Some(ws) = self.sheet_mut(sheet) else {
            log::warn!("sheet '{sheet}' not found");
            return false;
        };
        if let Ok(col) = u16::try_from(index - 1) {
            let rows: Vec<u32> = ws.row_indices().collect();
            for row in rows {
                if ws.remove_cell_at(row, col).is_some() {
                    log::debug!("removed cell at row {row}, column {index}");
                }
            }
        }
        let ok = self.persist();
        log::info!("remove_column(sheet={sheet}, index={index}) -> {ok}");
        ok
    }

    /// Link the row whose column 1 equals `key` (case-insensitive)
    pub fn add_hyperlink_for_row_key(
        &mut self,
        sheet: &str,
        target_column: &str,
        key: &str,
        url: &str,
        text: &str,
    ) -> bool {
        log::info!(
            "add_hyperlink_for_row_key(sheet={sheet}, column={target_column}, key={key}, url={url}, text={text:?})"
        );
        let Some(ws) = self.sheet(sheet) else {
            log::warn!("sheet '{sheet}' not found");
            return false;
        };
        let date_1904 = self.date_1904();
        let found =
            (1..=row_count_of(ws)).find(|&row| same_text(&render_at(ws, row as u32, 0, date_1904), key));
        let Some(row) = found else {
            log::warn!("key '{key}' not found in sheet '{sheet}'");
            return false;
        };
        log::debug!("found key '{key}' at row {row}");
        self.set_cell_with_link(sheet, target_column, row, text, url)
    }

    // === Persistence ===

    /// Write pending changes to disk
    pub fn flush(&mut self) -> bool {
        log::info!("flush({})", self.path.display());
        let ok = self.write_now();
        log::info!("flush({}) -> {ok}", self.path.display());
        ok
    }

    fn persist(&mut self) -> bool {
        match self.options.persist {
            PersistMode::Immediate => self.write_now(),
            PersistMode::Deferred => {
                self.dirty = true;
                true
            }
        }
    }

    fn write_now(&mut self) -> bool {
        let State::Ready(loaded) = &self.state else {
            return false;
        };
        match loaded.format.write(&loaded.workbook, &self.path) {
            Ok(()) => {
                log::debug!("wrote {}", self.path.display());
                self.dirty = false;
                true
            }
            Err(e) => {
                log::error!("cannot write {}: {}", self.path.display(), e);
                false
            }
        }
    }
}

impl Drop for TabularDataStore {
    fn drop(&mut self) {
        if self.dirty {
            log::debug!("flushing pending changes to {}", self.path.display());
            self.write_now();
        }
    }
}

fn sheet_position(workbook: &Workbook, name: &str) -> Option<usize> {
    workbook
        .sheet_index(name)
        .or_else(|| workbook.sheet_index(&name.to_uppercase()))
}

fn row_count_of(ws: &Worksheet) -> i32 {
    ws.last_row().map_or(0, |row| row as i32)
}

fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn render_at(ws: &Worksheet, row: u32, col: u16, date_1904: bool) -> String {
    let Some(cell) = ws.cell_at(row, col) else {
        return String::new();
    };
    match render_value(&cell.value, ws.cell_style_at(row, col), date_1904) {
        Ok(text) => text,
        Err(e) => {
            log::error!("cannot render row {row}, column {}: {e}", col + 1);
            format!("Error: {e}")
        }
    }
}

/// Header column whose trimmed text matches `name` case-insensitively
fn header_column(ws: &Worksheet, name: &str) -> Option<u16> {
    let wanted = name.trim().to_lowercase();
    ws.iter_row(0)
        .filter(|(_, cell)| !cell.value.is_empty())
        .find(|(col, _)| render_at(ws, 0, *col, false).to_lowercase() == wanted)
        .map(|(col, _)| col)
}

fn resolve_column(ws: &Worksheet, column: ColumnRef<'_>) -> Option<u16> {
    match column {
        ColumnRef::Name(name) => header_column(ws, name),
        ColumnRef::Index(index) if index > 0 => u16::try_from(index - 1).ok(),
        ColumnRef::Index(_) => None,
    }
}

fn next_header_column(ws: &Worksheet) -> u16 {
    ws.last_col_in_row(0).map_or(0, |c| c + 1)
}

/// Apply one write, creating the column when missing
///
/// Nothing is touched unless the whole write fits `format`.
fn apply_write(
    ws: &mut Worksheet,
    format: FileFormat,
    column_name: &str,
    row: u32,
    write: CellWrite,
) -> StoreResult<()> {
    let existing = header_column(ws, column_name);
    let col = existing.unwrap_or_else(|| next_header_column(ws));
    let text = match &write.value {
        CellValue::String(s) => Some(s.as_str()),
        _ => None,
    };
    format.check_cell(row, col, text)?;
    if existing.is_none() {
        format.check_cell(0, col, Some(column_name))?;
    }

    let col = match existing {
        Some(col) => col,
        None => {
            log::debug!(
                "column '{column_name}' not found in sheet '{}', creating it at column {}",
                ws.name(),
                col + 1
            );
            ws.set_cell_value_at(0, col, column_name)?;
            col
        }
    };

    ws.set_cell_value_at(row, col, write.value)?;
    match write.style {
        StyleChange::Keep => {}
        StyleChange::Replace(style) => ws.set_cell_style_at(row, col, &style)?,
        StyleChange::NumberFormat(format) => {
            let style = ws.cell_style_at(row, col).clone().with_number_format(format);
            ws.set_cell_style_at(row, col, &style)?;
        }
    }
    if let Some(link) = write.link {
        ws.set_hyperlink_at(row, col, link)?;
        fit_column_width(ws, col);
    }
    log::debug!("wrote row {row}, column {} of sheet '{}'", col + 1, ws.name());
    Ok(())
}

/// Widen a column to its longest text
fn fit_column_width(ws: &mut Worksheet, col: u16) {
    let longest = ws
        .row_indices()
        .filter_map(|row| ws.cell_at(row, col))
        .map(|cell| {
            render_value(&cell.value, &Style::default(), false)
                .map(|text| text.chars().count())
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0);
    if longest > 0 {
        ws.set_column_width(col, longest as f64 + 2.0);
    }
}
