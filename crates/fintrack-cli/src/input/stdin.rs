use log::debug;
use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// A typed input piped on stdin. An interactive terminal or an empty pipe
/// yields `None` so the command can fall back to its flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    debug!("read {} bytes of input from stdin", trimmed.len());
    let input = serde_json::from_str(trimmed).map_err(|e| format!("Failed to parse stdin: {e}"))?;
    Ok(Some(input))
}
