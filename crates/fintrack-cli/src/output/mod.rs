pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use colored::Colorize;
use serde_json::Value;
use std::fmt::Display;

use crate::OutputFormat;

/// Print a command's envelope in the requested format.
///
/// CSV and minimal output carry only the result, so envelope warnings (a
/// repaid loan, a zero rate) are echoed to stderr for those formats.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => {
            csv_out::print_csv(value);
            print_warnings(value);
        }
        OutputFormat::Minimal => {
            minimal::print_minimal(value);
            print_warnings(value);
        }
    }
}

fn print_warnings(value: &Value) {
    let warnings = value.get("warnings").and_then(Value::as_array);
    for warning in warnings.into_iter().flatten().filter_map(Value::as_str) {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
}

/// `error: <message>` in red on stderr.
pub fn print_error(error: impl Display) {
    eprintln!("{}: {}", "error".red().bold(), error);
}
