pub mod investments;
pub mod loans;
pub mod planning;
pub mod summary;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use fintrack_core::types::with_metadata;

use crate::input;

pub type CommandResult = Result<Value, Box<dyn std::error::Error>>;

/// Typed input from `--input <file.json>` or piped stdin, in that order.
/// `None` means the caller should fall back to individual flags.
pub(crate) fn read_input<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(input::file::read_json(path)?));
    }
    input::stdin::read_stdin()
}

/// Wrap a result in the standard output envelope.
pub(crate) fn envelope<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    start: Instant,
    result: T,
) -> CommandResult {
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(serde_json::to_value(with_metadata(
        methodology,
        assumptions,
        warnings,
        elapsed,
        result,
    ))?)
}
