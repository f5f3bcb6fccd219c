//! Message catalog files.
//!
//! A catalog file is a JSON object mapping identifiers to frame lengths.
//! Keys are decimal (`"15"`) or hex (`"0x0F"`):
//!
//! ```json
//! { "0x0A": 10, "15": 15 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serframe_frame::{IdentityCatalog, MessageCatalog, SizeTable};
use tracing::debug;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};

/// Load a catalog file, or fall back to the identity catalog.
pub fn load_catalog(path: Option<&Path>) -> CliResult<Box<dyn MessageCatalog>> {
    let Some(path) = path else {
        return Ok(Box::new(IdentityCatalog));
    };
    let text = std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    let table = parse_catalog(&text)
        .map_err(|msg| CliError::new(DATA_INVALID, format!("{}: {msg}", path.display())))?;
    debug!(path = %path.display(), entries = table.len(), "catalog loaded");
    Ok(Box::new(table))
}

fn parse_catalog(text: &str) -> Result<SizeTable, String> {
    let raw: BTreeMap<String, usize> =
        serde_json::from_str(text).map_err(|err| format!("invalid catalog: {err}"))?;
    raw.into_iter()
        .map(|(key, size)| parse_id(&key).map(|id| (id, size)))
        .collect()
}

fn parse_id(key: &str) -> Result<u8, String> {
    let key = key.trim();
    let parsed = match key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => key.parse(),
    };
    parsed.map_err(|_| format!("invalid message identifier: {key:?}"))
}
