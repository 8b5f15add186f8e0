//! Terminal interaction: warnings and interactive selection.

pub mod select;
pub mod warn;
