//! Workbook: the ordered list of sheets a file holds

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Characters neither file format allows in a sheet name
const FORBIDDEN_IN_SHEET_NAME: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// Name given to the only sheet of a fresh workbook
const FIRST_SHEET: &str = "Sheet1";

/// Settings stored once per file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkbookSettings {
    /// Serials count from 1904-01-01 instead of 1899-12-31
    pub date_1904: bool,
}

/// Sheets in file order plus the file-wide settings
#[derive(Debug, Default)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
    settings: WorkbookSettings,
}

impl Workbook {
    /// A workbook as a new file gets it: one empty `Sheet1`
    pub fn new() -> Self {
        let mut workbook = Self::empty();
        workbook.sheets.push(Worksheet::new(FIRST_SHEET));
        workbook
    }

    /// A workbook without sheets, for readers to fill
    pub fn empty() -> Self {
        Self {
            sheets: Vec::new(),
            settings: WorkbookSettings::default(),
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.sheets.get_mut(index)
    }

    /// Position of the sheet named exactly `name`
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|ws| ws.name() == name)
    }

    /// Sheet named exactly `name`
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheet_index(name).and_then(|i| self.worksheet(i))
    }

    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheet_index(name).and_then(move |i| self.worksheet_mut(i))
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|ws| ws.name().to_owned()).collect()
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.sheets.iter()
    }

    /// Append an empty sheet, returning its position
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append a sheet a reader has already filled
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.check_new_name(worksheet.name())?;
        self.sheets.push(worksheet);
        Ok(self.sheets.len() - 1)
    }

    /// Take the sheet at `index` out of the workbook
    pub fn remove_worksheet(&mut self, index: usize) -> Result<Worksheet> {
        if index < self.sheets.len() {
            Ok(self.sheets.remove(index))
        } else {
            Err(Error::SheetOutOfBounds(index, self.sheets.len()))
        }
    }

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    /// Names are unique ignoring case; spreadsheet applications reject
    /// files whose sheets differ only in case.
    fn check_new_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("empty name".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "'{name}' is longer than {MAX_SHEET_NAME_LEN} characters"
            )));
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_IN_SHEET_NAME.contains(c)) {
            return Err(Error::InvalidSheetName(format!("'{name}' contains '{c}'")));
        }
        let lower = name.to_lowercase();
        if self.sheets.iter().any(|ws| ws.name().to_lowercase() == lower) {
            return Err(Error::DuplicateSheetName(name.into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook_has_sheet1() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_names(), vec![FIRST_SHEET]);
        assert!(!wb.settings().date_1904);
        assert!(Workbook::empty().is_empty());
    }

    #[test]
    fn test_add_and_find_sheets() {
        let mut wb = Workbook::new();

        assert_eq!(wb.add_worksheet_with_name("Users").unwrap(), 1);
        assert_eq!(wb.sheet_index("Users"), Some(1));
        assert_eq!(wb.sheet_index("users"), None);
        assert!(wb.worksheet_by_name_mut("Users").is_some());
        assert_eq!(wb.worksheets().count(), 2);
    }

    #[test]
    fn test_sheet_names_are_unique_ignoring_case() {
        let mut wb = Workbook::new();

        assert!(matches!(
            wb.add_worksheet_with_name("Sheet1"),
            Err(Error::DuplicateSheetName(_))
        ));
        assert!(wb.add_worksheet_with_name("SHEET1").is_err());
        assert!(wb
            .add_existing_worksheet(Worksheet::new("sheet1"))
            .is_err());
    }

    #[test]
    fn test_rejected_sheet_names() {
        let mut wb = Workbook::new();

        for bad in ["", "a/b", "a:b", "[x]", "why?", "a*b", "back\\slash"] {
            assert!(
                matches!(
                    wb.add_worksheet_with_name(bad),
                    Err(Error::InvalidSheetName(_))
                ),
                "{bad}"
            );
        }
        assert!(wb
            .add_worksheet_with_name(&"A".repeat(MAX_SHEET_NAME_LEN + 1))
            .is_err());
        assert!(wb
            .add_worksheet_with_name(&"Ä".repeat(MAX_SHEET_NAME_LEN))
            .is_ok());
    }

    #[test]
    fn test_remove_worksheet() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("A").unwrap();

        assert_eq!(wb.remove_worksheet(0).unwrap().name(), FIRST_SHEET);
        assert_eq!(wb.sheet_names(), vec!["A"]);
        assert!(matches!(
            wb.remove_worksheet(1),
            Err(Error::SheetOutOfBounds(1, 1))
        ));
    }
}
