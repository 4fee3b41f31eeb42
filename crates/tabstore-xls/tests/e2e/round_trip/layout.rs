//! Column widths, merged regions and hyperlinks.

use crate::round_trip;
use pretty_assertions::assert_eq;
use tabstore_core::{CellRange, Hyperlink, Workbook};

#[test]
fn test_column_widths_and_merges() {
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();
    ws.set_cell_value_at(0, 0, "wide").unwrap();
    ws.set_column_width(0, 31.5);
    ws.set_column_width(4, 12.0);
    ws.merge_cells(&CellRange::parse("B2:C3").unwrap()).unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(0).unwrap();

    assert!((ws.column_width(0) - 31.5).abs() < 1e-9);
    assert!((ws.column_width(4) - 12.0).abs() < 1e-9);
    assert_eq!(ws.custom_column_widths().len(), 2);
    assert_eq!(ws.merged_regions(), &[CellRange::parse("B2:C3").unwrap()]);
}

#[test]
fn test_hyperlinks_survive() {
    let mut wb = Workbook::new();
    wb.add_worksheet_with_name("Other").unwrap();
    let ws = wb.worksheet_mut(1).unwrap();
    ws.set_cell_value_at(1, 0, "docs").unwrap();
    ws.set_hyperlink_at(1, 0, Hyperlink::url("https://example.com/docs?a=1&b=2"))
        .unwrap();
    ws.set_cell_value_at(2, 0, "back").unwrap();
    ws.set_hyperlink_at(2, 0, Hyperlink::location("Sheet1!A1").with_tooltip("Top"))
        .unwrap();
    ws.set_cell_value_at(3, 0, "anchor").unwrap();
    ws.set_hyperlink_at(3, 0, Hyperlink::url("https://example.com/page#part"))
        .unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(1).unwrap();

    assert_eq!(
        ws.hyperlink_at(1, 0),
        Some(&Hyperlink::url("https://example.com/docs?a=1&b=2"))
    );
    assert_eq!(
        ws.hyperlink_at(2, 0),
        Some(&Hyperlink::location("Sheet1!A1").with_tooltip("Top"))
    );
    assert_eq!(
        ws.hyperlink_at(3, 0).and_then(|l| l.as_url()),
        Some("https://example.com/page#part")
    );
    assert!(back.worksheet(0).unwrap().hyperlinks().next().is_none());
}
