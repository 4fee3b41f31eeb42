//! Cell values, shared strings and row presence.

use crate::{round_trip, temp_xls_path};
use pretty_assertions::assert_eq;
use tabstore_core::{CellError, CellValue, Workbook};
use tabstore_xls::{XlsError, XlsWriter};

#[test]
fn test_value_kinds_survive() {
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();
    ws.set_cell_value_at(0, 0, "Name").unwrap();
    ws.set_cell_value_at(0, 1, "Amount").unwrap();
    ws.set_cell_value_at(1, 0, "Tom & \"Jerry\"").unwrap();
    ws.set_cell_value_at(1, 1, 3.25).unwrap();
    ws.set_cell_value_at(2, 0, false).unwrap();
    ws.set_cell_value_at(2, 1, CellError::Na).unwrap();
    ws.set_cell_value_at(3, 0, "Unicode: \u{65e5}\u{672c}\u{8a9e}").unwrap();
    ws.set_cell_value_at(3, 1, -100_i64).unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(0).unwrap();

    assert_eq!(ws.get_value_at(0, 1), CellValue::string("Amount"));
    assert_eq!(ws.get_value_at(1, 0), CellValue::string("Tom & \"Jerry\""));
    assert_eq!(ws.get_value_at(1, 1), CellValue::Number(3.25));
    assert_eq!(ws.get_value_at(2, 0), CellValue::Boolean(false));
    assert_eq!(ws.get_value_at(2, 1), CellValue::Error(CellError::Na));
    assert_eq!(ws.get_value_at(3, 0), CellValue::string("Unicode: \u{65e5}\u{672c}\u{8a9e}"));
    assert_eq!(ws.get_value_at(3, 1), CellValue::Number(-100.0));
}

#[test]
fn test_formulas_are_stored_by_cached_result() {
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
    ws.set_cell_value_at(0, 2, CellValue::formula("NOW()")).unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(0).unwrap();

    assert_eq!(ws.get_value_at(0, 0).effective_value(), &CellValue::Number(2.0));
    assert_eq!(
        ws.get_value_at(0, 1).effective_value(),
        &CellValue::Error(CellError::Div0)
    );
    assert_eq!(ws.get_value_at(0, 2), CellValue::Empty);
}

#[test]
fn test_shared_strings_span_continue_records() {
    let long = "abcdefghij".repeat(1_500);
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();
    for row in 0..400 {
        ws.set_cell_value_at(row, 0, format!("label {row}")).unwrap();
        ws.set_cell_value_at(row, 1, "repeated").unwrap();
    }
    ws.set_cell_value_at(400, 0, long.as_str()).unwrap();
    ws.set_cell_value_at(401, 0, "after \u{e9}t\u{e9}").unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(0).unwrap();

    assert_eq!(ws.get_value_at(0, 0), CellValue::string("label 0"));
    assert_eq!(ws.get_value_at(399, 0), CellValue::string("label 399"));
    assert_eq!(ws.get_value_at(399, 1), CellValue::string("repeated"));
    assert_eq!(ws.get_value_at(400, 0), CellValue::string(long));
    assert_eq!(ws.get_value_at(401, 0), CellValue::string("after \u{e9}t\u{e9}"));
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
    wb.add_worksheet_with_name("Q&A").unwrap();
    wb.add_worksheet_with_name("Third").unwrap();
    wb.worksheet_mut(2)
        .unwrap()
        .set_cell_value_at(0, 0, "only here")
        .unwrap();
    wb.settings_mut().date_1904 = true;

    let back = round_trip(&wb);

    assert_eq!(back.sheet_names(), vec!["Sheet1", "Q&A", "Third"]);
    assert!(back.settings().date_1904);
    assert_eq!(
        back.worksheet(2).unwrap().get_value_at(0, 0),
        CellValue::string("only here")
    );
}

#[test]
fn test_grid_limits_are_enforced() {
    let mut wb = Workbook::new();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_value_at(0, 0, "x".repeat(32_768))
        .unwrap();

    let (_dir, path) = temp_xls_path();
    let err = XlsWriter::write_file(&wb, &path).unwrap_err();
    assert!(matches!(err, XlsError::Limit(_)), "{err}");

    let mut wb = Workbook::new();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_value_at(70_000, 0, 1.0)
        .unwrap();
    assert!(matches!(
        XlsWriter::write_file(&wb, &path),
        Err(XlsError::Limit(_))
    ));
}
