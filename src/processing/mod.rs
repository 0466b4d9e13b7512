//! Text processing and similarity analysis module

pub mod text_processor;
pub mod embeddings;
pub mod embedding_manager;
pub mod similarity;
pub mod classifier;
pub mod skills;
pub mod analyzer;

pub use analyzer::{AnalysisOutcome, ResumeAnalyzer};
pub use embeddings::{EmbeddingEngine, SentenceEncoder};
