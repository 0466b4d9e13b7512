//! CLI interface for the resume scorer

use crate::config::{OutputFormat, ScoreMode};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-scorer")]
#[command(version)]
#[command(about = "Score a resume against a job description")]
#[command(long_about = "Score a resume against a job description using sentence embeddings, and report strengths, partial matches and gaps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a resume against a job description
    Analyze(AnalyzeArgs),

    /// Embedding model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to resume file (PDF, TXT, MD)
    #[arg(short, long)]
    pub resume: PathBuf,

    /// Path to job description file (TXT, MD, PDF)
    #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
    pub job: Option<PathBuf>,

    /// Job description given inline
    #[arg(long)]
    pub job_text: Option<String>,

    /// Embedding model to use
    #[arg(short, long)]
    pub embedding: Option<String>,

    /// Output format: console, json, markdown, html
    #[arg(short, long)]
    pub output: Option<String>,

    /// Save output to file
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Include relevant matches, skills and sections
    #[arg(short, long)]
    pub detailed: bool,

    /// Score mode: document, coverage
    #[arg(long)]
    pub score_mode: Option<String>,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,

    /// With JSON output, emit only the analysis text and score
    #[arg(long)]
    pub response_only: bool,
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List known embedding models
    List,

    /// Download a model
    Download {
        /// Model id, display name or HuggingFace repo ID
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a downloaded model
    Remove {
        /// Model id to remove
        model: String,
    },

    /// Show model information
    Info {
        /// Model id
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "analysis.strength_threshold")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" | "text" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html",
            format
        )),
    }
}

pub fn parse_score_mode(mode: &str) -> Result<ScoreMode, String> {
    match mode.to_lowercase().as_str() {
        "document" | "doc" => Ok(ScoreMode::Document),
        "coverage" | "requirements" => Ok(ScoreMode::RequirementCoverage),
        _ => Err(format!(
            "Invalid score mode: {}. Supported: document, coverage",
            mode
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_requires_a_job_source() {
        let missing = Cli::try_parse_from(["resume-scorer", "analyze", "--resume", "cv.pdf"]);
        assert!(missing.is_err());

        let both = Cli::try_parse_from([
            "resume-scorer", "analyze", "--resume", "cv.pdf", "--job", "jd.txt", "--job-text", "Rust",
        ]);
        assert!(both.is_err());

        let inline = Cli::try_parse_from([
            "resume-scorer", "analyze", "--resume", "cv.pdf", "--job-text", "Rust developer.",
        ]);
        assert!(inline.is_ok());
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("md"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_parse_score_mode() {
        assert_eq!(parse_score_mode("coverage"), Ok(ScoreMode::RequirementCoverage));
        assert_eq!(parse_score_mode("Document"), Ok(ScoreMode::Document));
        assert!(parse_score_mode("average").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["pdf", "txt", "md"];
        assert!(validate_file_extension(Path::new("cv.PDF"), &allowed).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), &allowed).is_err());
        assert!(validate_file_extension(Path::new("cv"), &allowed).is_err());
    }
}
