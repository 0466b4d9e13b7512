//! resume-scorer command line entry point

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_scorer::cli::{self, AnalyzeArgs, Cli, Commands, ConfigAction, ModelAction};
use resume_scorer::config::{Config, OutputFormat};
use resume_scorer::error::{Result, ResumeScorerError};
use resume_scorer::input::InputManager;
use resume_scorer::output::formatter::{save_report_to_file, ReportGenerator};
use resume_scorer::output::MatchReport;
use resume_scorer::processing::embedding_manager::EmbeddingModelManager;
use resume_scorer::processing::{EmbeddingEngine, ResumeAnalyzer};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "txt", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Analyze(args) => run_analyze(args, config).await,
        Commands::Models { action } => run_models(action, config).await,
        Commands::Config { action } => run_config(action, config, &config_path),
    }
}

async fn run_analyze(args: AnalyzeArgs, config: Config) -> Result<()> {
    cli::validate_file_extension(&args.resume, &SUPPORTED_EXTENSIONS)
        .map_err(|e| ResumeScorerError::InvalidInput(format!("Resume file: {}", e)))?;
    if let Some(job) = &args.job {
        cli::validate_file_extension(job, &SUPPORTED_EXTENSIONS)
            .map_err(|e| ResumeScorerError::InvalidInput(format!("Job description file: {}", e)))?;
    }

    let output_format = match &args.output {
        Some(format) => cli::parse_output_format(format).map_err(ResumeScorerError::InvalidInput)?,
        None => config.output.format,
    };
    let score_mode = match &args.score_mode {
        Some(mode) => cli::parse_score_mode(mode).map_err(ResumeScorerError::InvalidInput)?,
        None => config.analysis.score_mode,
    };
    let detailed = args.detailed || config.output.detailed;
    let use_colors = config.output.color_output && !args.no_color;
    // Keep stdout clean for machine-readable formats
    let chatty = output_format == OutputFormat::Console;

    if chatty {
        println!("🚀 Resume match analysis");
        println!("📄 Resume: {}", args.resume.display());
    }

    let mut input_manager = InputManager::new();
    let resume_text = input_manager.extract_text(&args.resume).await?;
    let (job_text, job_source) = match (&args.job, &args.job_text) {
        (Some(job), _) => (
            input_manager.extract_text(job).await?,
            job.display().to_string(),
        ),
        (None, Some(text)) => (text.clone(), "inline".to_string()),
        (None, None) => {
            return Err(ResumeScorerError::InvalidInput(
                "Job description is required".to_string(),
            ))
        }
    };
    info!(
        "Resume: {} characters, job description: {} characters",
        resume_text.chars().count(),
        job_text.chars().count()
    );

    let mut model_manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
    let model_id = args
        .embedding
        .clone()
        .unwrap_or_else(|| config.models.default_embedding_model.clone());
    let model_id = model_manager
        .resolve_model_id(&model_id)
        .unwrap_or(model_id);
    let model_path = model_manager.ensure_model_available(&model_id).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .map_err(|e| ResumeScorerError::OutputFormatting(e.to_string()))?
            .tick_strings(&["-", "\\", "|", "/", "-"]),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner.set_message(format!("Loading embedding model {}...", model_id));
    let engine = EmbeddingEngine::load(&model_path, &model_id, &config)?;
    let mut analyzer = ResumeAnalyzer::new(engine, &config).with_score_mode(score_mode);

    spinner.set_message("Scoring resume against job description...");
    let outcome = analyzer.analyze(&resume_text, &job_text);
    spinner.finish_and_clear();
    let outcome = outcome?;

    let stats = analyzer.encoder().cache_stats();
    info!(
        "Embedding cache: {} entries, {} hits, {} misses",
        stats.cache_size, stats.cache_hits, stats.cache_misses
    );

    let report = MatchReport::from_outcome(outcome, &args.resume.display().to_string(), &job_source);
    let generator = ReportGenerator::with_options(use_colors, detailed, true, true)
        .json_response_only(args.response_only);
    let rendered = generator.generate_report(&report, &output_format)?;

    if chatty {
        println!();
    }
    println!("{}", rendered);

    if let Some(save_path) = &args.save {
        // Saved files never carry terminal color codes
        let plain = ReportGenerator::with_options(false, detailed, true, true)
            .json_response_only(args.response_only)
            .generate_report(&report, &output_format)?;
        save_report_to_file(&plain, save_path)?;
        if chatty {
            println!("\n💾 Report saved to {}", save_path.display());
        }
    }

    Ok(())
}

async fn run_models(action: ModelAction, config: Config) -> Result<()> {
    let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

    match action {
        ModelAction::List => {
            println!("📚 Embedding Models\n");
            for model in manager.list_available_models() {
                let status = if manager.is_model_downloaded(&model.id) {
                    "✅ Downloaded"
                } else {
                    "⬇️  Available"
                };
                println!(
                    "  • {} ({}) - {} MB, {} dims [{}]",
                    model.id, model.repo_id, model.size_mb, model.dimensions, status
                );
                println!("    {}", model.description);
            }

            let downloaded = manager.list_downloaded_models();
            if downloaded.is_empty() {
                println!("\n💡 No models downloaded yet. Get started with:");
                println!("   resume-scorer models download {}", manager.auto_select_model());
            } else {
                println!("\nDefault model: {}", config.models.default_embedding_model);
            }
        }

        ModelAction::Download { model, force } => {
            if !force && manager.is_model_downloaded(&model) {
                println!("✅ Model '{}' is already downloaded", model);
                println!("💡 Use --force to re-download");
                return Ok(());
            }

            println!("⬇️  Downloading model: {}", model);
            let model_path = manager.download_model(&model, force).await?;
            println!("✅ Model '{}' downloaded to {}", model, model_path.display());
        }

        ModelAction::Remove { model } => {
            let model_path = manager.remove_model(&model).await?;
            println!("🗑️  Removed {}", model_path.display());
        }

        ModelAction::Info { model } => {
            let info = manager
                .model_info(&model)
                .cloned()
                .ok_or_else(|| ResumeScorerError::ModelNotFound(model.clone()))?;

            println!("Name: {}", info.name);
            println!("Id: {}", info.id);
            println!("Repository: {}", info.repo_id);
            println!("Size: {} MB", info.size_mb);
            println!("Dimensions: {}", info.dimensions);
            println!("Description: {}", info.description);

            match manager.model_path(&info.id) {
                Some(path) => println!("Status: ✅ Downloaded at {}", path.display()),
                None => {
                    println!("Status: ⬇️  Available for download");
                    println!("\n💡 To download this model, run:");
                    println!("   resume-scorer models download {}", info.id);
                }
            }
        }
    }

    Ok(())
}

fn run_config(action: Option<ConfigAction>, mut config: Config, config_path: &Path) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let content = toml::to_string_pretty(&config).map_err(|e| {
                ResumeScorerError::Configuration(format!("Failed to serialize config: {}", e))
            })?;
            println!("⚙️  Configuration ({})\n", config_path.display());
            println!("{}", content);
        }

        Some(ConfigAction::Path) => {
            println!("{}", config_path.display());
        }

        Some(ConfigAction::Reset) => {
            Config::default().save_to(config_path)?;
            println!("✅ Configuration reset to defaults");
        }

        Some(ConfigAction::Set { key, value }) => {
            config.set_value(&key, &value)?;
            config.save_to(config_path)?;
            println!("✅ {} = {}", key, value);
        }
    }

    Ok(())
}
