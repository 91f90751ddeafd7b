#![allow(dead_code)]

mod dbf;
mod mocks;

pub use dbf::DbfBuilder;
pub use mocks::MockFile;

/// UTF-8 byte-order mark followed by the XML declaration.
pub const XML_HEADER: &str = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>";

/// A one-column table of names.
pub fn names(values: &[&str]) -> DbfBuilder {
    values
        .iter()
        .fold(DbfBuilder::new().field("NAME", 10), |dbf, value| dbf.row(&[*value]))
}
