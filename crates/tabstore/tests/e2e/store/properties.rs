//! Property tests over arbitrary cell text.

use crate::{users_book, EXTENSIONS};
use proptest::prelude::*;
use tabstore::TabularDataStore;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_set_then_get(text in "([ -~\u{7}\u{e9}\u{4e2d}\u{6587}\u{1F600}]|_x00[0-9A-Fa-f]{2}_){0,40}") {
        for ext in EXTENSIONS {
            let (_dir, path) = users_book(ext);
            let mut store = TabularDataStore::open(&path);
            prop_assert!(store.set_cell("Users", "Notes", 2, &text));
            drop(store);

            let store = TabularDataStore::open(&path);
            prop_assert_eq!(store.cell("Users", "Notes", 2), text.trim());
        }
    }

    #[test]
    fn prop_name_and_index_agree(row in 1i32..4) {
        for ext in EXTENSIONS {
            let (_dir, path) = users_book(ext);
            let store = TabularDataStore::open(&path);
            prop_assert_eq!(store.cell("Users", "Email", row), store.cell("Users", 2, row));
            prop_assert_eq!(store.cell("Users", "Email", row), store.cell("Users", "EMAIL", row));
        }
    }
}
