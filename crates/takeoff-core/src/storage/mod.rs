//! File formats: JSON template libraries and projects in, CSV out.

mod csv;
mod library;

pub use csv::{CsvColumn, generate_estimates_csv, parse_columns, write_estimates_csv};
pub use library::{find_template, load_project, load_templates, parse_project, parse_templates};
