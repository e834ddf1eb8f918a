//! Turning raw input into [`Entry`] values.
//!
//! Intake only shapes input; it does not filter. Empty labels and
//! unaccepted targets are skipped later by the batch orchestrator.

use serde::Deserialize;

use crate::batch::Entry;
use crate::error::IntakeError;

#[derive(Deserialize)]
#[serde(untagged)]
enum EntriesDocument {
    List(Vec<Entry>),
    Wrapped { entries: Vec<Entry> },
}

/// Parse either `[{"label", "target"}, ...]` or `{"entries": [...]}`.
pub fn entries_from_json(json: &str) -> Result<Vec<Entry>, IntakeError> {
    let doc: EntriesDocument = serde_json::from_str(json)?;
    Ok(match doc {
        EntriesDocument::List(entries) => entries,
        EntriesDocument::Wrapped { entries } => entries,
    })
}

/// Parse `LABEL=URL`, splitting on the first `=` (URLs may contain more).
pub fn parse_pair(s: &str) -> Result<Entry, IntakeError> {
    match s.split_once('=') {
        Some((label, target)) => Ok(Entry::new(label.trim(), target.trim())),
        None => Err(IntakeError::MalformedPair(s.to_string())),
    }
}

/// Zip parallel label and target lists, as submitted by the HTML form.
pub fn entries_from_columns(
    names: Vec<String>,
    links: Vec<String>,
) -> Result<Vec<Entry>, IntakeError> {
    if names.is_empty() || links.is_empty() || names.len() != links.len() {
        return Err(IntakeError::Mismatch {
            names: names.len(),
            links: links.len(),
        });
    }
    Ok(names
        .into_iter()
        .zip(links)
        .map(|(label, target)| Entry::new(label.trim(), target.trim()))
        .collect())
}
