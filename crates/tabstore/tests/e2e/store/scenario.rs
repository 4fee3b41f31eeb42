//! Reads and writes through a reopened store.

use crate::{temp_book, users_book, EXTENSIONS};
use pretty_assertions::assert_eq;
use tabstore::TabularDataStore;

#[test]
fn test_users_scenario() {
    for ext in EXTENSIONS {
        let (_dir, path) = users_book(ext);
        let store = TabularDataStore::open(&path);
        assert!(store.is_usable(), "{ext}: {:?}", store.open_error());

        assert_eq!(store.row_count("Users"), 1, "{ext}");
        assert_eq!(store.column_count("Users"), 2, "{ext}");
        assert_eq!(store.cell("Users", "Email", 1), "ann@x.com", "{ext}");
        assert_eq!(store.cell("Users", "Phone", 1), "", "{ext}");
        assert_eq!(store.find_row_by_value("Users", "Name", "An"), -1, "{ext}");
        assert_eq!(store.find_row_by_value("Users", "Name", "Ann"), 1, "{ext}");
        assert_eq!(store.find_row_by_value("Users", "Name", "ann"), 1, "{ext}");
        assert_eq!(store.default_sheet(), Some("Sheet1"), "{ext}");
    }
}

#[test]
fn test_fresh_sheet_counts() {
    for ext in EXTENSIONS {
        let (_dir, path) = temp_book(ext);
        let mut store = TabularDataStore::create(&path).unwrap();
        assert!(store.add_sheet("Empty"));
        drop(store);

        let store = TabularDataStore::open(&path);
        assert_eq!(store.row_count("Empty"), 0, "{ext}");
        assert_eq!(store.column_count("Empty"), -1, "{ext}");
        assert_eq!(store.sheet_names(), vec!["Sheet1", "Empty"], "{ext}");
    }
}

#[test]
fn test_duplicate_rows_find_first() {
    for ext in EXTENSIONS {
        let (_dir, path) = users_book(ext);
        let mut store = TabularDataStore::open(&path);
        assert!(store.set_cell("Users", "Name", 2, "Bob"));
        assert!(store.set_cell("Users", "Name", 3, "bob"));
        drop(store);

        let store = TabularDataStore::open(&path);
        assert_eq!(store.find_row_by_value("Users", "Name", "BOB"), 2, "{ext}");
        assert_eq!(store.find_row_by_value("Users", "Name", "Zed"), -1, "{ext}");
    }
}

#[test]
fn test_remove_column_keeps_positions() {
    for ext in EXTENSIONS {
        let (_dir, path) = users_book(ext);
        let mut store = TabularDataStore::open(&path);
        assert!(store.set_cell("Users", "Phone", 1, "555"));
        assert!(store.remove_column("Users", 2));
        drop(store);

        let store = TabularDataStore::open(&path);
        assert_eq!(store.column_count("Users"), 3, "{ext}");
        assert_eq!(store.cell("Users", 2, 1), "", "{ext}");
        assert_eq!(store.cell("Users", "Email", 1), "", "{ext}");
        assert_eq!(store.cell("Users", 3, 1), "555", "{ext}");
        assert_eq!(store.cell("Users", "Name", 1), "Ann", "{ext}");
    }
}

#[test]
fn test_add_column_twice() {
    for ext in EXTENSIONS {
        let (_dir, path) = users_book(ext);
        let mut store = TabularDataStore::open(&path);
        assert!(store.add_column("Users", "Status"), "{ext}");
        assert!(!store.add_column("Users", "status"), "{ext}");
        drop(store);

        let store = TabularDataStore::open(&path);
        assert_eq!(store.column_count("Users"), 3, "{ext}");
    }
}

#[test]
fn test_test_data_block() {
    for ext in EXTENSIONS {
        let (_dir, path) = temp_book(ext);
        let mut store = TabularDataStore::create(&path).unwrap();
        assert!(store.add_sheet("Data"));
        for (row, name) in [(1, "LoginTest"), (2, "Email"), (3, "a@x.com"), (4, "b@x.com")] {
            assert!(store.set_cell("Data", "TestCase", row, name));
        }
        assert!(store.set_cell("Data", "Second", 2, "Password"));
        assert!(store.set_cell("Data", "Second", 3, "pw1"));
        assert!(store.set_cell("Data", "Second", 4, "pw2"));
        drop(store);

        let store = TabularDataStore::open(&path);
        let data = store.test_data("Data", "LoginTest");
        assert_eq!(data.len(), 2, "{ext}");
        assert_eq!(data[0]["Email"], "a@x.com", "{ext}");
        assert_eq!(data[1]["Password"], "pw2", "{ext}");
        assert_eq!(
            store.data_rows("Data")[0],
            vec!["LoginTest".to_string(), String::new()],
            "{ext}"
        );
    }
}
