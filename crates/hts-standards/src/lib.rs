#![deny(unsafe_code)]

pub mod catalog;
pub mod csv_utils;
pub mod error;
pub mod rule_table;
pub mod section201;
pub mod section301;

pub use crate::catalog::RuleCatalog;
pub use crate::error::StandardsError;
pub use crate::rule_table::load_rule_table;
pub use crate::section201::{
    DEFAULT_SECTION_201_RATE, Section201Entry, Section201Table, load_section201_table,
};
pub use crate::section301::{Section301Entry, Section301Table};
