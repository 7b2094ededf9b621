use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use medqa::dataset;
use medqa::eval::{run_eval, EvalConfig};
use medqa::extract::Strategy;
use medqa::generate::{self, GenerateConfig};
use medqa::llm::LlmClient;

#[derive(Parser)]
#[command(name = "medqa", version, about = "Generate and evaluate multiple-choice clinical questions from medical transcripts")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
    /// Base URL of an OpenAI-compatible endpoint (e.g. a local Ollama server)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// API key; defaults to OPENAI_API_KEY
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Retries per model call before giving up
    #[arg(long, global = true, default_value_t = 2)]
    max_retries: usize,
}

#[derive(Subcommand)]
enum Cmd {
    /// Answer each labeled question and report accuracy
    Eval {
        #[arg(long)]
        input_file: PathBuf,
        #[arg(long, default_value = "llama3.2:1b")]
        model: String,
        /// How the answer letter is extracted from the model's reply
        #[arg(long, value_enum, default_value_t = Strategy::TwoStage)]
        strategy: Strategy,
        /// Emit a progress line every this many records
        #[arg(long, default_value_t = 10)]
        progress_every: usize,
        /// Stop after this many records
        #[arg(long)]
        limit: Option<usize>,
        /// Where the per-record answer letters are written
        #[arg(long, default_value = "answers.txt")]
        output: PathBuf,
    },
    /// Synthesize labeled questions from a transcription CSV
    Generate {
        #[arg(long, default_value = "data/mtsamples.csv")]
        input: PathBuf,
        #[arg(long, default_value = "data/generated_questions.json")]
        output: PathBuf,
        #[arg(long, default_value = "gpt-4o-mini")]
        model: String,
        /// Medical specialty to filter the corpus to
        #[arg(long, default_value = "Cardiovascular / Pulmonary")]
        medical_specialty: String,
        /// Number of transcriptions to sample
        #[arg(long, default_value_t = 10)]
        transcriptions: usize,
        /// Question-answer pairs to generate per transcription
        #[arg(long, default_value_t = 1)]
        samples: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Eval { input_file, model, strategy, progress_every, limit, output } => {
            let llm = LlmClient::new(model, cli.base_url, cli.api_key, cli.max_retries);
            let records = dataset::load_questions(&input_file)?;
            let cfg = EvalConfig { strategy, progress_every, limit };
            let run = run_eval(&llm, &records, &cfg).await?;

            // Report accuracy before persisting the log.
            let accuracy = run.final_accuracy()?;
            info!("Final accuracy over {} questions: {accuracy:.2}", run.stats.processed);
            run.write_answer_log(&output)?;
            info!("Answer log written to {}", output.display());
        }
        Cmd::Generate { input, output, model, medical_specialty, transcriptions, samples } => {
            let llm = LlmClient::new(model, cli.base_url, cli.api_key, cli.max_retries);
            let cfg = GenerateConfig {
                medical_specialty,
                transcriptions,
                samples_per_transcription: samples,
            };
            let questions = generate::generate_questions(&llm, &input, &cfg).await?;
            generate::write_questions(&questions, &output)?;
            info!("Generated {} questions, saved to {}", questions.len(), output.display());
        }
    }
    Ok(())
}
