use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_openai::types::ResponseFormatJsonSchema;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::json;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::dataset;
use crate::llm::Llm;
use crate::prompt;
use crate::types::{GeneratedQaList, QuestionRecord, TranscriptionRow};

// Fixed seed keeps the sampled transcription set stable across runs.
const SAMPLE_SEED: u64 = 42;
const MIN_TRANSCRIPTION_LEN: usize = 100;
const PACING_DELAY: Duration = Duration::from_millis(500);

pub struct GenerateConfig {
    pub medical_specialty: String,
    pub transcriptions: usize,
    pub samples_per_transcription: usize,
}

fn qa_schema() -> ResponseFormatJsonSchema {
    ResponseFormatJsonSchema {
        name: "qa_list".into(),
        description: Some("Question and Answer list".into()),
        strict: Some(true),
        schema: Some(json!({
            "type": "object",
            "properties": {
                "qas": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": {
                                "type": "string",
                                "description": "The question text"
                            },
                            "options": {
                                "type": "array",
                                "items": {
                                    "type": "string",
                                    "description": "An answer option"
                                }
                            },
                            "correct_answer": {
                                "type": "string",
                                "description": "The letter corresponding to the correct answer"
                            },
                            "explanation": {
                                "type": "string",
                                "description": "Detailed explanation of why the correct answer is right and others are wrong"
                            }
                        },
                        "required": ["question", "options", "correct_answer", "explanation"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["qas"],
            "additionalProperties": false
        })),
    }
}

/// Asks the generator model for labeled questions about one transcription.
/// Returns None when the call or its output is unusable; the caller skips
/// the transcription rather than aborting the batch.
pub async fn generate_qas(
    llm: &dyn Llm,
    transcription: &str,
    num_questions: usize,
) -> Option<GeneratedQaList> {
    let messages = prompt::build_generation_messages(transcription, num_questions);
    match llm.chat_json(messages, qa_schema()).await {
        Ok(text) => match serde_json::from_str::<GeneratedQaList>(&text) {
            Ok(list) => Some(list),
            Err(err) => {
                warn!(%err, "discarding malformed generation output");
                None
            }
        },
        Err(err) => {
            warn!(%err, "question generation failed, skipping transcription");
            None
        }
    }
}

/// Samples eligible transcriptions from the corpus and generates labeled
/// question records for each.
pub async fn generate_questions(
    llm: &dyn Llm,
    input: &Path,
    cfg: &GenerateConfig,
) -> Result<Vec<QuestionRecord>> {
    let rows = dataset::load_transcriptions(input)?;
    let mut eligible: Vec<&TranscriptionRow> = rows
        .iter()
        .filter(|r| {
            r.medical_specialty.as_deref().map(str::trim)
                == Some(cfg.medical_specialty.trim())
        })
        .filter(|r| {
            r.transcription
                .as_deref()
                .map_or(false, |t| t.len() > MIN_TRANSCRIPTION_LEN)
        })
        .collect();

    if cfg.transcriptions < eligible.len() {
        info!("Sampling {} of {} transcriptions", cfg.transcriptions, eligible.len());
        let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
        let sampled: Vec<&TranscriptionRow> = eligible
            .choose_multiple(&mut rng, cfg.transcriptions)
            .copied()
            .collect();
        eligible = sampled;
    }

    let mut questions = Vec::new();
    for row in &eligible {
        let transcription = row.transcription.as_deref().unwrap_or_default();
        let Some(list) = generate_qas(llm, transcription, cfg.samples_per_transcription).await
        else {
            continue;
        };
        for qa in list.qas {
            questions.push(QuestionRecord {
                transcription: transcription.to_string(),
                question: qa.question,
                options: qa.options,
                correct_answer: qa.correct_answer,
                explanation: Some(qa.explanation),
                medical_specialty: row.medical_specialty.clone(),
                description: row.description.clone(),
            });
        }
        // Stay under the provider's rate limits.
        sleep(PACING_DELAY).await;
    }
    Ok(questions)
}

pub fn write_questions(questions: &[QuestionRecord], path: &Path) -> Result<()> {
    let out = serde_json::to_string_pretty(questions)?;
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::FakeLlm;

    #[tokio::test]
    async fn parses_schema_constrained_output() {
        let fake = FakeLlm::scripted([
            r#"{"qas":[{"question":"q?","options":["A. x","B. y","C. z","D. w"],
                "correct_answer":"C","explanation":"why"}]}"#,
        ]);
        let list = generate_qas(&fake, "a transcription", 1).await.unwrap();
        assert_eq!(list.qas.len(), 1);
        assert_eq!(list.qas[0].correct_answer, "C");
        assert_eq!(list.qas[0].options.len(), 4);
    }

    #[tokio::test]
    async fn malformed_output_is_skipped_not_fatal() {
        let fake = FakeLlm::scripted(["not json"]);
        assert!(generate_qas(&fake, "a transcription", 1).await.is_none());
    }
}
