//! Shared types for the simulator.

use clap::ValueEnum;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Jsonl,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AiType {
    Greedy,
    Random,
}

impl AiType {
    /// Registry name of the AI.
    pub fn name(&self) -> &'static str {
        match self {
            AiType::Greedy => "Greedy",
            AiType::Random => "RandomPlayer", // Actual name in registry
        }
    }
}
