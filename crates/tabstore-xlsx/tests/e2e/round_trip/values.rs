//! Cell values and row presence.

use crate::round_trip;
use pretty_assertions::assert_eq;
use tabstore_core::{CellError, CellValue, Workbook};

#[test]
fn test_value_kinds_survive() {
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();
    ws.set_cell_value_at(0, 0, "Name").unwrap();
    ws.set_cell_value_at(0, 1, "Amount").unwrap();
    ws.set_cell_value_at(1, 0, "Tom & \"Jerry\" <co>").unwrap();
    ws.set_cell_value_at(1, 1, 3.25).unwrap();
    ws.set_cell_value_at(2, 0, true).unwrap();
    ws.set_cell_value_at(2, 1, CellError::Div0).unwrap();
    ws.set_cell_value_at(3, 0, "Unicode: \u{65e5}\u{672c}\u{8a9e}").unwrap();
    ws.set_cell_value_at(3, 1, -100_i64).unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(0).unwrap();

    assert_eq!(ws.get_value_at(1, 0), CellValue::string("Tom & \"Jerry\" <co>"));
    assert_eq!(ws.get_value_at(1, 1), CellValue::Number(3.25));
    assert_eq!(ws.get_value_at(2, 0), CellValue::Boolean(true));
    assert_eq!(ws.get_value_at(2, 1), CellValue::Error(CellError::Div0));
    assert_eq!(ws.get_value_at(3, 0), CellValue::string("Unicode: \u{65e5}\u{672c}\u{8a9e}"));
    assert_eq!(ws.get_value_at(3, 1), CellValue::Number(-100.0));
}

#[test]
fn test_formulas_keep_text_and_cache() {
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();
    ws.set_cell_value_at(0, 0, CellValue::formula_with_cache("1+1", CellValue::Number(2.0)))
        .unwrap();
    ws.set_cell_value_at(
        0,
        1,
        CellValue::formula_with_cache("A1/0", CellValue::Error(CellError::Div0)),
    )
    .unwrap();
    ws.set_cell_value_at(
        0,
        2,
        CellValue::formula_with_cache("\"a\"&\"b\"", CellValue::string("ab")),
    )
    .unwrap();
    ws.set_cell_value_at(0, 3, CellValue::formula("NOW()")).unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(0).unwrap();

    assert_eq!(
        ws.get_value_at(0, 0),
        CellValue::formula_with_cache("1+1", CellValue::Number(2.0))
    );
    assert_eq!(
        ws.get_value_at(0, 1).effective_value(),
        &CellValue::Error(CellError::Div0)
    );
    assert_eq!(ws.get_value_at(0, 2).effective_value(), &CellValue::string("ab"));
    assert_eq!(ws.get_value_at(0, 3), CellValue::formula("NOW()"));
}

#[test]
fn test_empty_rows_stay_present() {
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();
    ws.set_cell_value_at(0, 0, "Name").unwrap();
    ws.set_cell_value_at(3, 0, "x").unwrap();
    ws.remove_cell_at(3, 0);
    ws.ensure_row(5).unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(0).unwrap();

    assert!(ws.has_row(3));
    assert!(ws.has_row(5));
    assert!(!ws.has_row(4));
    assert_eq!(ws.last_row(), Some(5));
    assert_eq!(ws.cell_count(), 1);
}

#[test]
fn test_sheet_order_and_date_system() {
    let mut wb = Workbook::new();
    wb.add_worksheet_with_name("Q&A <2>").unwrap();
    wb.add_worksheet_with_name("Third").unwrap();
    wb.settings_mut().date_1904 = true;

    let back = round_trip(&wb);

    assert_eq!(back.sheet_names(), vec!["Sheet1", "Q&A <2>", "Third"]);
    assert!(back.settings().date_1904);
}
