//! Split a monthly sales export into EU sales (summed per country, with the
//! VAT backed out of the gross total) and non-EU sales (kept row by row), and
//! lay both out as spreadsheets.

pub mod columns;
pub mod error;
pub mod extractor;
pub mod fmt;
pub mod models;
pub mod settings;
pub mod source;
pub mod splitter;
pub mod vat;
pub mod writer;
