//! Names every console module pulls in.
//!
//! `println!`/`eprintln!` come from anstream so colors are stripped when the
//! output is not a terminal. Import them explicitly next to the glob
//! (`use crate::prelude::{println, *};`) to shadow the std macros.

pub use crate::error::Error;

pub use anstream::eprintln;
pub use anstream::println;
pub use color_eyre::eyre::{eyre, OptionExt, Result};
pub use colored::Colorize;
pub use std::format as f;

/// Borderless table used for search results and stat cards.
pub fn new_table() -> prettytable::Table {
    let mut table = prettytable::Table::new();

    let format = prettytable::format::FormatBuilder::new()
        .padding(1, 1)
        .build();

    table.set_format(format);

    table
}

/// Bold, upper-cased header row for a [`new_table`].
pub fn header_row(labels: &[&str]) -> prettytable::Row {
    prettytable::Row::new(
        labels
            .iter()
            .map(|label| prettytable::Cell::new(&label.to_uppercase().bold().to_string()))
            .collect(),
    )
}
