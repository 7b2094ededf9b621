use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::extract::{self, Strategy};
use crate::llm::Llm;
use crate::prompt;
use crate::types::{ExtractedAnswer, QuestionRecord, RunStats};

pub struct EvalConfig {
    pub strategy: Strategy,
    /// Emit a progress line every this many records; 0 disables.
    pub progress_every: usize,
    /// Stop after this many records.
    pub limit: Option<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { strategy: Strategy::TwoStage, progress_every: 10, limit: None }
    }
}

pub struct EvalRun {
    pub stats: RunStats,
    pub answers: Vec<ExtractedAnswer>,
}

/// Single forward pass over the records, strictly sequential: each record's
/// model calls complete before the next record starts, and with the
/// two-stage strategy the parsing call consumes the answering call's output.
pub async fn run_eval(
    llm: &dyn Llm,
    records: &[QuestionRecord],
    cfg: &EvalConfig,
) -> Result<EvalRun> {
    let mut stats = RunStats::default();
    let mut answers = Vec::with_capacity(records.len());

    for rec in records.iter().take(cfg.limit.unwrap_or(records.len())) {
        let raw = llm
            .chat(prompt::build_question_messages(rec, cfg.strategy))
            .await?;
        let extracted = extract::extract_answer(llm, cfg.strategy, &raw, rec).await?;
        stats.record(extracted.matches(&rec.correct_answer));
        answers.push(extracted);

        if cfg.progress_every > 0 && stats.processed % cfg.progress_every == 0 {
            if let Some(acc) = stats.accuracy() {
                info!("Processed {} questions. Accuracy={acc:.2}", stats.processed);
            }
        }
    }

    Ok(EvalRun { stats, answers })
}

impl EvalRun {
    /// Final accuracy. Errors instead of reporting anything when no record
    /// was processed.
    pub fn final_accuracy(&self) -> Result<f64> {
        match self.stats.accuracy() {
            Some(acc) => Ok(acc),
            None => bail!("no records processed; accuracy is undefined"),
        }
    }

    /// Writes one answer marker per line, in processed order.
    pub fn write_answer_log(&self, path: &Path) -> Result<()> {
        let mut lines = self
            .answers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        if !lines.is_empty() {
            lines.push('\n');
        }
        fs::write(path, lines)
            .with_context(|| format!("writing answer log to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_run_has_undefined_accuracy() {
        let run = EvalRun { stats: RunStats::default(), answers: Vec::new() };
        assert!(run.final_accuracy().is_err());
    }

    #[test]
    fn answer_log_round_trips_in_order() {
        let run = EvalRun {
            stats: RunStats { processed: 3, correct: 2 },
            answers: vec![
                ExtractedAnswer::Letter('B'),
                ExtractedAnswer::Unparseable,
                ExtractedAnswer::Letter('D'),
            ],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.txt");
        run.write_answer_log(&path).unwrap();

        let lines: Vec<String> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(lines.len(), run.stats.processed);
        assert_eq!(lines, vec!["B", "-", "D"]);
    }
}
