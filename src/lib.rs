//! Resume scorer library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, ResumeScorerError};
pub use output::{AnalysisResponse, MatchReport};
pub use processing::{AnalysisOutcome, EmbeddingEngine, ResumeAnalyzer, SentenceEncoder};
