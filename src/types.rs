use std::fmt;

use serde::{Deserialize, Serialize};

/// One labeled multiple-choice question, tied to the transcript it was
/// generated from. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub transcription: String,
    pub question: String,
    /// Option texts in label order (A, B, C, D, ...), labels embedded.
    pub options: Vec<String>,
    /// Single letter naming the correct option.
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl QuestionRecord {
    /// True when `letter` names one of this record's options.
    pub fn is_valid_letter(&self, letter: char) -> bool {
        letter.is_ascii_uppercase() && ((letter as u8 - b'A') as usize) < self.options.len()
    }
}

/// One row of the source transcription corpus. Fields are optional because
/// the corpus is ragged.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionRow {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub medical_specialty: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
}

/// One item of the generator model's schema-constrained output.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQa {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedQaList {
    pub qas: Vec<GeneratedQa>,
}

/// An answer letter pulled out of a model reply, or an explicit failure
/// marker. Never a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractedAnswer {
    Letter(char),
    Unparseable,
}

impl ExtractedAnswer {
    /// Exact, case-sensitive comparison against the ground-truth letter.
    /// Unparseable never matches.
    pub fn matches(&self, correct: &str) -> bool {
        match self {
            ExtractedAnswer::Letter(c) => {
                let mut chars = correct.trim().chars();
                chars.next() == Some(*c) && chars.next().is_none()
            }
            ExtractedAnswer::Unparseable => false,
        }
    }
}

impl fmt::Display for ExtractedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractedAnswer::Letter(c) => write!(f, "{c}"),
            ExtractedAnswer::Unparseable => write!(f, "-"),
        }
    }
}

/// Running tally over processed records. Single-writer, owned by the
/// evaluation loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    pub processed: usize,
    pub correct: usize,
}

impl RunStats {
    pub fn record(&mut self, correct: bool) {
        self.processed += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// `correct / processed`; None until at least one record was processed.
    pub fn accuracy(&self) -> Option<f64> {
        (self.processed > 0).then(|| self.correct as f64 / self.processed as f64)
    }
}
