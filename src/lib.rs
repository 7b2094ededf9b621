pub mod dataset;
pub mod eval;
pub mod extract;
pub mod generate;
pub mod llm;
pub mod prompt;
pub mod types;

#[cfg(test)]
mod tests;
