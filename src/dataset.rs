use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;

use crate::types::{QuestionRecord, TranscriptionRow};

/// Loads the labeled question set produced by `generate`.
pub fn load_questions(path: &Path) -> Result<Vec<QuestionRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let records: Vec<QuestionRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing question records from {}", path.display()))?;
    Ok(records)
}

/// Loads the transcription corpus. The CSV must carry a `transcription`
/// column; other columns are optional.
pub fn load_transcriptions(path: &Path) -> Result<Vec<TranscriptionRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    if !rdr.headers()?.iter().any(|h| h == "transcription") {
        bail!("{} must contain a 'transcription' column", path.display());
    }

    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
