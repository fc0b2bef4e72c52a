#![allow(missing_docs)]

pub(crate) mod fixtures;
pub(crate) mod http;

pub(crate) use fixtures::{get_test_state, get_test_state_with_export_dir, new_entry, new_expense};
pub(crate) use http::{assert_error, get_test_server};
