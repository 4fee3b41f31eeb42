//! Cell styles.

use crate::round_trip;
use pretty_assertions::assert_eq;
use tabstore_core::{Color, FillStyle, NumberFormat, Style, Underline, Workbook};

#[test]
fn test_link_and_header_styles() {
    let link = Style::new()
        .font_color(Color::INDEXED_BLUE)
        .underline(Underline::Single);
    let header = Style::new().fill_color(Color::INDEXED_GREY_40);

    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();
    ws.set_cell_value_at(0, 0, "Site").unwrap();
    ws.set_cell_style_at(0, 0, &header).unwrap();
    ws.set_cell_value_at(1, 0, "home").unwrap();
    ws.set_cell_style_at(1, 0, &link).unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(0).unwrap();

    assert_eq!(
        ws.cell_style_at(0, 0).fill,
        FillStyle::Solid {
            color: Color::Indexed(55)
        }
    );
    assert_eq!(ws.cell_style_at(1, 0).font.color, Color::Indexed(12));
    assert_eq!(ws.cell_style_at(1, 0).font.underline, Underline::Single);
    assert_eq!(ws.cell_style_at(2, 0), &Style::default());
}

#[test]
fn test_date_formats_survive() {
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();
    ws.set_cell_value_at(1, 0, 45000.0).unwrap();
    ws.set_cell_style_at(1, 0, &Style::new().with_number_format(NumberFormat::date_short()))
        .unwrap();
    ws.set_cell_value_at(2, 0, 45000.5).unwrap();
    ws.set_cell_style_at(
        2,
        0,
        &Style::new().with_number_format(NumberFormat::Custom("dd.mm.yyyy hh:mm".into())),
    )
    .unwrap();
    ws.set_cell_value_at(3, 0, 0.25).unwrap();
    ws.set_cell_style_at(
        3,
        0,
        &Style::new().with_number_format(NumberFormat::Custom("0.00%".into())),
    )
    .unwrap();

    let back = round_trip(&wb);
    let ws = back.worksheet(0).unwrap();

    assert!(ws.cell_style_at(1, 0).is_date());
    assert!(ws.cell_style_at(2, 0).is_date());
    assert!(!ws.cell_style_at(3, 0).is_date());
    assert_eq!(
        ws.cell_style_at(2, 0).number_format,
        NumberFormat::Custom("dd.mm.yyyy hh:mm".into())
    );
}
