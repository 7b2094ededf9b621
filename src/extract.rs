use std::fmt;

use anyhow::Result;
use clap::ValueEnum;

use crate::llm::Llm;
use crate::prompt;
use crate::types::{ExtractedAnswer, QuestionRecord};

/// How an answer letter is pulled out of the model's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// The answering model is told up front to reply with only the letter.
    Direct,
    /// A second model call parses the letter out of a free-form reply.
    TwoStage,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Direct => "direct",
            Strategy::TwoStage => "two-stage",
        })
    }
}

/// Strips surrounding whitespace and punctuation, uppercases, and accepts
/// the result only if it is a single letter valid for this record's options.
/// Anything else is unparseable, never a guess.
pub fn normalize_letter(raw: &str, rec: &QuestionRecord) -> ExtractedAnswer {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            let letter = c.to_ascii_uppercase();
            if rec.is_valid_letter(letter) {
                ExtractedAnswer::Letter(letter)
            } else {
                ExtractedAnswer::Unparseable
            }
        }
        _ => ExtractedAnswer::Unparseable,
    }
}

/// Turns a stage-1 reply into an ExtractedAnswer. `TwoStage` issues the
/// parsing call first; the hand-off is plain text.
pub async fn extract_answer(
    llm: &dyn Llm,
    strategy: Strategy,
    raw_response: &str,
    rec: &QuestionRecord,
) -> Result<ExtractedAnswer> {
    match strategy {
        Strategy::Direct => Ok(normalize_letter(raw_response, rec)),
        Strategy::TwoStage => {
            let parsed = llm.chat(prompt::build_parse_messages(raw_response)).await?;
            Ok(normalize_letter(&parsed, rec))
        }
    }
}
