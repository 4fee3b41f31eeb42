//! Persistence modes, styles and links on disk, unusable stores.

use crate::{temp_book, users_book, EXTENSIONS};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tabstore::{
    header_style, link_style, Color, FillStyle, Hyperlink, PersistMode, StoreError, StoreOptions,
    TabularDataStore,
};

#[test]
fn test_links_and_styles_persist() {
    for ext in EXTENSIONS {
        let (_dir, path) = users_book(ext);
        let mut store = TabularDataStore::open(&path);
        assert!(store.add_column("Users", "Report"));
        assert!(store.add_hyperlink_for_row_key(
            "Users",
            "Report",
            "ann",
            "https://example.com/report/1",
            "report"
        ));
        drop(store);

        let store = TabularDataStore::open(&path);
        assert_eq!(store.cell("Users", "Report", 1), "report", "{ext}");

        let ws = store.workbook().unwrap().worksheet_by_name("Users").unwrap();
        assert_eq!(
            ws.hyperlink_at(1, 2),
            Some(&Hyperlink::url("https://example.com/report/1")),
            "{ext}"
        );
        let style = ws.cell_style_at(1, 2);
        assert_eq!(style.font.color, link_style().font.color, "{ext}");
        assert_eq!(style.font.underline, link_style().font.underline, "{ext}");
        assert_eq!(ws.cell_style_at(0, 2).fill, header_style().fill, "{ext}");
        assert_eq!(
            ws.cell_style_at(0, 2).fill,
            FillStyle::Solid {
                color: Color::INDEXED_GREY_40
            },
            "{ext}"
        );
    }
}

#[test]
fn test_escape_like_text_persists_verbatim() {
    let samples = [
        "code_x0041_end",
        "_x005F_ and _x000D_",
        "bell\u{7}tab\tcr\rlf\nend",
        "snake_case_x1",
    ];
    for ext in EXTENSIONS {
        let (_dir, path) = users_book(ext);
        let mut store = TabularDataStore::open(&path);
        for (i, text) in samples.iter().enumerate() {
            assert!(store.set_cell("Users", "Notes", i as i32 + 1, text), "{ext}");
        }
        drop(store);

        let store = TabularDataStore::open(&path);
        for (i, text) in samples.iter().enumerate() {
            assert_eq!(store.cell("Users", "Notes", i as i32 + 1), *text, "{ext}");
        }
    }
}

#[test]
fn test_dates_persist() {
    for ext in EXTENSIONS {
        let (_dir, path) = users_book(ext);
        let mut store = TabularDataStore::open(&path);
        let date = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        assert!(store.set_cell_date("Users", "Joined", 1, date));
        drop(store);

        let store = TabularDataStore::open(&path);
        assert_eq!(store.cell("Users", "Joined", 1), "12/25/23", "{ext}");
    }
}

#[test]
fn test_deferred_mode_writes_on_flush() {
    for ext in EXTENSIONS {
        let (_dir, path) = users_book(ext);
        let options = StoreOptions::new().with_persist(PersistMode::Deferred);

        let mut store = TabularDataStore::open_with(&path, options.clone());
        assert!(store.set_cell("Users", "Name", 1, "Anna"));
        assert!(store.has_pending_changes());
        assert_eq!(TabularDataStore::open(&path).cell("Users", "Name", 1), "Ann", "{ext}");

        assert!(store.flush());
        assert!(!store.has_pending_changes());
        assert_eq!(TabularDataStore::open(&path).cell("Users", "Name", 1), "Anna", "{ext}");

        assert!(store.set_cell("Users", "Name", 1, "Annie"));
        drop(store);
        assert_eq!(TabularDataStore::open(&path).cell("Users", "Name", 1), "Annie", "{ext}");
    }
}

#[test]
fn test_relative_paths_use_base_dir() {
    let (dir, path) = users_book("xlsx");
    let options = StoreOptions::new().with_base_dir(dir.path());
    let store = TabularDataStore::open_with(path.file_name().unwrap(), options);
    assert!(store.is_usable());
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn test_unusable_store_answers_not_found() {
    let (_dir, path) = temp_book("csv");
    std::fs::write(&path, "Name,Email\n").unwrap();

    let mut store = TabularDataStore::open(&path);
    assert!(!store.is_usable());
    assert!(matches!(
        store.open_error(),
        Some(StoreError::UnsupportedFormat(_))
    ));

    assert_eq!(store.row_count("Users"), 0);
    assert_eq!(store.column_count("Users"), -1);
    assert_eq!(store.cell("Users", "Name", 1), "");
    assert_eq!(store.cell("Users", 1, 1), "");
    assert_eq!(store.find_row_by_value("Users", "Name", "Ann"), -1);
    assert!(!store.sheet_exists("Users"));
    assert!(store.sheet_names().is_empty());
    assert!(store.test_data("Users", "T").is_empty());
    assert!(!store.set_cell("Users", "Name", 1, "x"));
    assert!(!store.set_cell_with_link("Users", "Name", 1, "x", "https://x"));
    assert!(!store.add_sheet("Users"));
    assert!(!store.remove_sheet("Users"));
    assert!(!store.add_column("Users", "Name"));
    assert!(!store.remove_column("Users", 1));
    assert!(!store.add_hyperlink_for_row_key("Users", "Name", "k", "u", "t"));
    assert!(!store.flush());
    assert!(store.into_workbook().is_err());
}

#[test]
fn test_missing_and_corrupt_files() {
    for ext in EXTENSIONS {
        let (_dir, path) = temp_book(ext);
        let store = TabularDataStore::open(&path);
        assert!(!store.is_usable(), "{ext}");

        std::fs::write(&path, b"not a spreadsheet").unwrap();
        let store = TabularDataStore::open(&path);
        assert!(!store.is_usable(), "{ext}");
        assert_eq!(store.cell("Sheet1", 1, 1), "", "{ext}");
    }
}

#[test]
fn test_create_rejects_unknown_extension() {
    let (_dir, path) = temp_book("ods");
    assert!(matches!(
        TabularDataStore::create(&path),
        Err(StoreError::UnsupportedFormat(_))
    ));
    assert!(!path.exists());
}
