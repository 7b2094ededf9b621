use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};

use crate::extract::Strategy;
use crate::types::QuestionRecord;

const ANSWER_SYSTEM: &str =
    "You are an expert in answering multiple choice clinical questions about a clinical note.";
const ANSWER_SYSTEM_DIRECT: &str =
    "You are an expert in answering multiple choice clinical questions about a clinical note. \
     Respond only with the capital letter of the answer you choose.";
const PARSE_SYSTEM: &str =
    "You are an expert in parsing out the answer given to a multiple choice question. \
     Respond only with the capital letter of the answer that was chosen.";
const GENERATE_SYSTEM: &str =
    "You are a medical education expert who creates high-quality assessment questions \
     for healthcare professionals.";

fn messages(system: &str, user: String) -> Vec<ChatCompletionRequestMessage> {
    let sys = ChatCompletionRequestSystemMessageArgs::default()
        .content(system)
        .build()
        .unwrap()
        .into();
    let usr = ChatCompletionRequestUserMessageArgs::default()
        .content(user)
        .build()
        .unwrap()
        .into();
    vec![sys, usr]
}

/// Renders a record into the question prompt. Deterministic; option order
/// and text are preserved verbatim.
pub fn format_prompt(rec: &QuestionRecord) -> String {
    format!(
        "Clinical Note: ```{}```\n\nQuestion: {}\n\nChoices:\n{}",
        rec.transcription,
        rec.question,
        rec.options.join("\n"),
    )
}

pub fn build_question_messages(
    rec: &QuestionRecord,
    strategy: Strategy,
) -> Vec<ChatCompletionRequestMessage> {
    let system = match strategy {
        Strategy::Direct => ANSWER_SYSTEM_DIRECT,
        Strategy::TwoStage => ANSWER_SYSTEM,
    };
    messages(system, format_prompt(rec))
}

/// Stage-2 prompt: the stage-1 reply becomes the user turn.
pub fn build_parse_messages(raw_response: &str) -> Vec<ChatCompletionRequestMessage> {
    messages(PARSE_SYSTEM, raw_response.to_string())
}

pub fn build_generation_messages(
    transcription: &str,
    num_questions: usize,
) -> Vec<ChatCompletionRequestMessage> {
    let user = format!(
        "Generate {num_questions} non-trivial multiple-choice question(s) based on the \
         medical transcription below.\n\
         The question should:\n\
         1. Test clinically relevant knowledge that would be important for healthcare providers\n\
         2. Be specific to information contained in this transcription\n\
         3. Have exactly 4 answer choices (A, B, C, D)\n\
         4. Have only ONE correct answer\n\
         5. Include an explanation for why the correct answer is right and others are wrong\n\n\
         Medical Transcription:\n{transcription}"
    );
    messages(GENERATE_SYSTEM, user)
}
