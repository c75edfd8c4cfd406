//! List command implementation.

use super::open_store;
use crate::error::CliResult;
use serde::Serialize;
use stagekv_core::DecodedName;
use std::path::Path;

/// One published entry.
#[derive(Debug, Serialize)]
pub struct ListedEntry {
    /// File name in the storage directory.
    pub file_name: String,
    /// Decoded key, if the name is reversible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// SHA-256 of the key, for shortened names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Store listing.
#[derive(Debug, Serialize)]
pub struct ListResult {
    /// Store root.
    pub path: String,
    /// Published entries, sorted by file name.
    pub entries: Vec<ListedEntry>,
}

/// Runs the list command.
pub fn run(path: &Path, format: &str) -> CliResult<()> {
    let result = collect(path)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }
    Ok(())
}

/// Lists the published entries of the store at `path`.
pub fn collect(path: &Path) -> CliResult<ListResult> {
    let store = open_store(path, false)?;

    let entries = store
        .list()?
        .into_iter()
        .map(|name| match name.decoded {
            DecodedName::Key(key) => ListedEntry {
                file_name: name.file_name,
                key: Some(key),
                digest: None,
            },
            DecodedName::Digest { digest } => ListedEntry {
                file_name: name.file_name,
                key: None,
                digest: Some(digest),
            },
        })
        .collect();

    Ok(ListResult {
        path: path.display().to_string(),
        entries,
    })
}

fn print_text_output(result: &ListResult) {
    for entry in &result.entries {
        match (&entry.key, &entry.digest) {
            (Some(key), _) => println!("{key}"),
            (None, Some(digest)) => println!("<sha256:{digest}>"),
            (None, None) => println!("{}", entry.file_name),
        }
    }
    println!();
    println!("{} entries in {}", result.entries.len(), result.path);
}
