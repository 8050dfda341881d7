//! devforge - AI-powered development assistant
//!
//! Describe what you want to build; devforge proposes technology stacks,
//! designs a project layout, generates the code and tells you how ready
//! the result is for deployment. Every AI stage degrades to a deterministic
//! fallback, so a run always finishes.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use devforge::ai::{AiManager, Provider, TextGenerator};
use devforge::analysis::{
    complexity_report, detect_language_from_path, AnalyzerSettings, StaticCodeAnalyzer,
    TestScaffoldGenerator,
};
use devforge::artifacts::ArtifactStore;
use devforge::config::{default_config_path, Config, ConfigManager};
use devforge::deploy::{readiness_report, DeploymentReadinessScorer};
use devforge::error::ErrorLog;
use devforge::generation::{
    combine_requirement, fallback, validate_requirement_with, GenerationOrchestrator,
    ProjectStructure, StackFamily, StageOutcome, TechStackOption,
};
use devforge::ingest;

/// devforge - AI-powered development assistant CLI
#[derive(Parser)]
#[command(name = "devforge")]
#[command(about = "AI-powered development assistant - describe the app, get stacks, code and a readiness score")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// AI provider override (openai, gemini)
    #[arg(long)]
    provider: Option<String>,

    /// Model override for all requests
    #[arg(long)]
    model: Option<String>,

    /// Run without an AI backend; every stage produces its deterministic fallback
    #[arg(long)]
    offline: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: stacks, structure, files, analysis, readiness
    Generate {
        /// What to build, in plain language
        requirement: String,

        /// Text or markdown document with additional context
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// Stack to use: a number from the option list or a name fragment
        #[arg(long)]
        stack: Option<String>,

        /// Output directory for generated artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip writing artifacts to disk
        #[arg(long)]
        no_save: bool,
    },

    /// Suggest technology stacks for a requirement
    Stacks {
        /// What to build, in plain language
        requirement: String,

        /// Text or markdown document with additional context
        #[arg(long)]
        context_file: Option<PathBuf>,
    },

    /// Statically analyze a source file or directory
    Analyze {
        /// File or directory to analyze
        path: PathBuf,

        /// Write the full analysis as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score existing code for deployment readiness
    Assess {
        /// Source file to score
        code: PathBuf,

        /// Matching test file, if any
        #[arg(long)]
        tests: Option<PathBuf>,

        /// Write the assessment as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a test module for a source file
    Scaffold {
        /// Source file to generate tests for
        file: PathBuf,

        /// Ask the AI backend instead of using the static scaffold
        #[arg(long)]
        ai: bool,

        /// Write the tests to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration as TOML
    Show,
    /// Write a default configuration file
    Init,
    /// Print the configuration file path
    Path,
}

/// CLI application state: loaded configuration plus per-invocation overrides.
struct DevForge {
    config_manager: ConfigManager,
    provider_override: Option<String>,
    model_override: Option<String>,
    offline: bool,
}

impl DevForge {
    fn new(cli: &Cli) -> Result<Self> {
        let config_manager = ConfigManager::new(cli.config.clone())?;
        Ok(Self {
            config_manager,
            provider_override: cli.provider.clone(),
            model_override: cli.model.clone(),
            offline: cli.offline,
        })
    }

    fn config(&self) -> &Config {
        self.config_manager.config()
    }

    fn model(&self) -> String {
        self.model_override
            .clone()
            .unwrap_or_else(|| self.config().ai.default_model.clone())
    }

    fn analyzer(&self) -> StaticCodeAnalyzer {
        StaticCodeAnalyzer::with_settings(AnalyzerSettings {
            long_function_lines: self.config().analysis.long_function_lines,
        })
    }

    fn scorer(&self) -> DeploymentReadinessScorer {
        DeploymentReadinessScorer::with_threshold(self.config().analysis.readiness_threshold)
    }

    /// Build the text generator the orchestrator runs against.
    ///
    /// Offline mode returns a manager with no registered clients: every
    /// request reports `NoProvider` and the pipeline produces its
    /// deterministic fallback output end to end.
    fn build_generator(&self) -> Result<Arc<dyn TextGenerator>> {
        if self.offline {
            let provider =
                Provider::parse(&self.config().ai.default_provider).unwrap_or_default();
            return Ok(Arc::new(AiManager::new(provider, self.model())));
        }

        let mut ai = self.config().ai.clone();
        ai.default_model = self.model();
        if let Some(provider) = &self.provider_override {
            if ai.fallback_provider.as_deref() == Some(provider.as_str()) {
                ai.fallback_provider = None;
                ai.fallback_model = None;
            }
            ai.default_provider = provider.clone();
        }

        let manager = AiManager::from_config(&ai).map_err(|e| {
            anyhow::anyhow!("{e}. Set OPENAI_API_KEY or GEMINI_API_KEY, or pass --offline")
        })?;
        Ok(Arc::new(manager))
    }

    fn orchestrator(&self) -> Result<GenerationOrchestrator> {
        Ok(GenerationOrchestrator::new(self.build_generator()?, self.model()))
    }

    /// Merge the requirement with an optional context document.
    fn resolve_requirement(&self, requirement: &str, context_file: Option<&Path>) -> Result<String> {
        match context_file {
            Some(path) => {
                let document = ingest::read_context_file(path)?;
                println!("📄 Using context from {}", path.display());
                Ok(combine_requirement(&document, requirement))
            }
            None => Ok(requirement.trim().to_string()),
        }
    }

    /// Validate the requirement; warnings print, errors stop the run.
    fn check_requirement(&self, requirement: &str) -> Result<()> {
        let generation = &self.config().generation;
        let check = validate_requirement_with(
            requirement,
            generation.min_requirement_length,
            generation.max_requirement_length,
        );

        for warning in &check.warnings {
            println!("{}", format!("⚠ {warning}").yellow());
        }
        for suggestion in &check.suggestions {
            println!("💡 {suggestion}");
        }
        if !check.valid {
            for error in &check.errors {
                eprintln!("{}", format!("✖ {error}").red());
            }
            bail!("requirement validation failed");
        }
        Ok(())
    }

    /// Run the whole pipeline for one requirement.
    async fn run_generate(
        &self,
        requirement: &str,
        context_file: Option<&Path>,
        stack_choice: Option<&str>,
        output: Option<PathBuf>,
        no_save: bool,
    ) -> Result<()> {
        let requirement = self.resolve_requirement(requirement, context_file)?;
        self.check_requirement(&requirement)?;

        let mut orchestrator = self.orchestrator()?;

        let bar = spinner("Suggesting technology stacks...");
        let stacks = orchestrator.suggest_tech_stacks(&requirement).await;
        bar.finish_and_clear();
        note_fallback("Stack suggestion", &stacks);
        print_stack_options(&stacks.value);

        let selected = select_stack(&stacks.value, stack_choice)?;
        println!("\n✅ Selected stack: {}", selected.name.clone().bold());
        info!(stack = %selected.name, "stack selected");

        let bar = spinner("Designing project structure...");
        let structure = orchestrator.generate_structure(&requirement, selected).await;
        bar.finish_and_clear();
        let layout = if structure.value.success {
            structure.value
        } else {
            let reason = structure
                .fallback_reason
                .clone()
                .or_else(|| structure.value.error.clone())
                .unwrap_or_else(|| "model rejected the request".to_string());
            println!(
                "{}",
                format!("⚠ Structure generation failed ({reason}); using a standard layout.")
                    .yellow()
            );
            fallback::fallback_structure("generated_project")
        };
        print_structure(&layout);

        let bar = spinner("Generating project files...");
        let bundle = orchestrator
            .generate_bundle(&requirement, &layout, selected.family)
            .await;
        bar.finish_and_clear();
        note_fallback("File generation", &bundle);
        let bundle = bundle.value;
        println!(
            "\n📦 Generated {} main, {} test and {} additional files",
            bundle.main_files.len(),
            bundle.test_files.len(),
            bundle.additional_files.len()
        );

        let language = stack_language(selected);
        if let Some((name, code)) = bundle.main_files.first() {
            let analysis = self.analyzer().analyze(code, language);
            println!("\n📊 Static analysis of {name}:");
            println!("{}", complexity_report(&analysis));
        }

        let combined_code = join_section(&bundle.main_files);
        let combined_tests = join_section(&bundle.test_files);
        let assessment = self.scorer().assess(&combined_code, &combined_tests, language);
        println!("{}", readiness_report(&assessment));

        let error_log = orchestrator.error_log();
        print_error_summary(&error_log);

        if self.config().general.auto_save && !no_save {
            let base = output.unwrap_or_else(|| self.config().general.output_dir.clone());
            let store = ArtifactStore::new(base)?;
            let project_dir = store.save_bundle(&layout.project_name, &bundle)?;
            store.save_structure(&layout)?;
            store.save_assessment(&layout.project_name, &assessment)?;
            if !error_log.is_empty() {
                store.save_error_log(&layout.project_name, &error_log)?;
            }
            println!(
                "\n💾 Project exported to {}",
                project_dir.display().to_string().cyan()
            );
        } else {
            println!("\nArtifacts not saved (auto_save off or --no-save).");
        }

        Ok(())
    }

    /// Suggest stacks without running the rest of the pipeline.
    async fn run_stacks(&self, requirement: &str, context_file: Option<&Path>) -> Result<()> {
        let requirement = self.resolve_requirement(requirement, context_file)?;
        self.check_requirement(&requirement)?;

        let mut orchestrator = self.orchestrator()?;
        let bar = spinner("Suggesting technology stacks...");
        let stacks = orchestrator.suggest_tech_stacks(&requirement).await;
        bar.finish_and_clear();
        note_fallback("Stack suggestion", &stacks);

        println!("\n🧰 Technology stack options:");
        for (index, option) in stacks.value.iter().enumerate() {
            println!("\n  {}. {}", index + 1, option.summary().bold());
            println!(
                "     complexity: {}, estimated time: {}",
                option.complexity, option.estimated_time
            );
            println!("     best for: {}", option.best_use_case);
            for pro in &option.pros {
                println!("     {} {}", "+".green(), pro);
            }
            for con in &option.cons {
                println!("     {} {}", "-".red(), con);
            }
            if !option.dependencies.is_empty() {
                println!("     dependencies: {}", option.dependencies.join(", "));
            }
        }
        Ok(())
    }

    /// Analyze one file or every recognized source file under a directory.
    async fn run_analyze(&self, path: PathBuf, output: Option<PathBuf>) -> Result<()> {
        info!(path = %path.display(), "analyzing");
        let analyzer = self.analyzer();

        if path.is_dir() {
            let files = ingest::list_source_files(&path)?;
            if files.is_empty() {
                bail!("no recognized source files under {}", path.display());
            }

            let mut analyses = Vec::new();
            let mut total_issues = 0usize;
            for file in &files {
                let code = std::fs::read_to_string(file)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                let language = detect_language_from_path(file);
                let analysis = analyzer.analyze(&code, &language);
                println!(
                    "  {}: quality {:.1}, {} complexity, {} functions, {} lines",
                    file.display(),
                    analysis.quality_score,
                    analysis.complexity,
                    analysis.metrics.functions,
                    analysis.metrics.lines_of_code
                );
                total_issues += analysis.issues.len();
                analyses.push((file.clone(), analysis));
            }

            println!("\n📊 Analysis Summary:");
            println!("  Files: {}", analyses.len());
            println!("  Issues: {}", total_issues);

            if let Some(output_path) = output {
                let document: Vec<_> = analyses
                    .iter()
                    .map(|(file, analysis)| {
                        serde_json::json!({ "path": file, "analysis": analysis })
                    })
                    .collect();
                std::fs::write(&output_path, serde_json::to_string_pretty(&document)?)?;
                println!("✅ Analysis results written to {}", output_path.display());
            }
            return Ok(());
        }

        let code = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let language = detect_language_from_path(&path);
        let analysis = analyzer.analyze(&code, &language);
        println!("{}", complexity_report(&analysis));

        if let Some(output_path) = output {
            std::fs::write(&output_path, serde_json::to_string_pretty(&analysis)?)?;
            println!("✅ Analysis results written to {}", output_path.display());
        }
        Ok(())
    }

    /// Score existing code for deployment readiness.
    async fn run_assess(
        &self,
        code_path: PathBuf,
        tests_path: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let code = std::fs::read_to_string(&code_path)
            .with_context(|| format!("failed to read {}", code_path.display()))?;
        let tests = match &tests_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => String::new(),
        };
        if tests_path.is_none() {
            println!(
                "{}",
                "⚠ No test file given; the test coverage score will be low.".yellow()
            );
        }

        let language = detect_language_from_path(&code_path);
        let assessment = self.scorer().assess(&code, &tests, &language);
        println!("{}", readiness_report(&assessment));

        if let Some(output_path) = output {
            std::fs::write(&output_path, serde_json::to_string_pretty(&assessment)?)?;
            println!("✅ Assessment written to {}", output_path.display());
        }
        Ok(())
    }

    /// Generate a test module for one source file.
    async fn run_scaffold(&self, file: PathBuf, ai: bool, output: Option<PathBuf>) -> Result<()> {
        let code = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let language = detect_language_from_path(&file).to_string();
        let filename = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "module.py".to_string());

        let tests = if ai {
            let mut orchestrator = self.orchestrator()?;
            let outcome = orchestrator
                .generate_tests_for_file(&filename, &code, &language)
                .await;
            note_fallback("Test generation", &outcome);
            outcome.value
        } else {
            let module = Path::new(&filename)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("module")
                .to_string();
            let analysis = self.analyzer().analyze(&code, &language);
            TestScaffoldGenerator::new().generate(&analysis, &module)
        };

        match output {
            Some(output_path) => {
                std::fs::write(&output_path, &tests)?;
                println!("✅ Tests written to {}", output_path.display());
            }
            None => println!("{tests}"),
        }
        Ok(())
    }
}

/// Configuration management; runs without a loaded config so `init` works
/// on a fresh machine.
fn run_config(config_path: Option<PathBuf>, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let manager = ConfigManager::new(config_path)?;
            print!("{}", toml::to_string_pretty(manager.config())?);
        }
        ConfigAction::Init => {
            let path = config_path.unwrap_or_else(default_config_path);
            if path.exists() {
                bail!("configuration already exists at {}", path.display());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, toml::to_string_pretty(&Config::default())?)?;
            println!("✅ Default configuration written to {}", path.display());
        }
        ConfigAction::Path => {
            let path = config_path.unwrap_or_else(default_config_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Spinner shown while a pipeline stage waits on the backend.
fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Surface a degraded stage to the user without stopping the run.
fn note_fallback<T>(label: &str, outcome: &StageOutcome<T>) {
    if outcome.used_fallback {
        let reason = outcome
            .fallback_reason
            .as_deref()
            .unwrap_or("backend unavailable");
        println!("{}", format!("⚠ {label} degraded: {reason}").yellow());
    }
}

fn print_stack_options(options: &[TechStackOption]) {
    println!("\n🧰 Technology stack options:");
    for (index, option) in options.iter().enumerate() {
        println!("\n  {}. {}", index + 1, option.summary().bold());
        println!(
            "     complexity: {}, estimated time: {}",
            option.complexity, option.estimated_time
        );
        println!("     best for: {}", option.best_use_case);
    }
}

fn print_structure(structure: &ProjectStructure) {
    println!(
        "\n📁 Project structure: {} ({} files)",
        structure.project_name.clone().bold(),
        structure.file_count()
    );
    for file in &structure.layout.root_files {
        println!("  {file}");
    }
    for (dir, files) in &structure.layout.directories {
        println!("  {}", dir.clone().cyan());
        for file in files {
            println!("    {file}");
        }
    }
}

fn print_error_summary(log: &ErrorLog) {
    if log.is_empty() {
        return;
    }
    let summary = log.summary();
    println!(
        "{}",
        format!(
            "\n⚠ {} backend failures during this run ({} recovered):",
            summary.total_errors, summary.recovered_errors
        )
        .yellow()
    );
    for (kind, count) in &summary.counts_by_kind {
        println!("  {kind}: {count}");
    }
}

/// Pick a stack from `--stack` (list number or name fragment), an interactive
/// prompt, or default to the first option when stdin is not a terminal.
fn select_stack<'a>(
    options: &'a [TechStackOption],
    choice: Option<&str>,
) -> Result<&'a TechStackOption> {
    if options.is_empty() {
        bail!("no technology stack options available");
    }

    if let Some(choice) = choice {
        if let Ok(position) = choice.parse::<usize>() {
            if (1..=options.len()).contains(&position) {
                return Ok(&options[position - 1]);
            }
        }
        let lowered = choice.to_lowercase();
        if let Some(option) = options
            .iter()
            .find(|option| option.name.to_lowercase().contains(&lowered))
        {
            return Ok(option);
        }
        bail!(
            "no stack matches '{}'; available: {}",
            choice,
            options
                .iter()
                .map(|option| option.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if std::io::stdin().is_terminal() {
        Ok(&options[prompt_stack_selection(options.len())])
    } else {
        println!("No stack selected; using {}.", options[0].name.clone().bold());
        Ok(&options[0])
    }
}

/// Zero-based index of the user's pick. Empty input means the first option.
fn prompt_stack_selection(count: usize) -> usize {
    loop {
        print!("\nSelect a stack [1-{count}] (Enter for 1): ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return 0;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return 0;
        }
        match trimmed.parse::<usize>() {
            Ok(choice) if (1..=count).contains(&choice) => return choice - 1,
            _ => println!("{}", format!("Enter a number between 1 and {count}.").yellow()),
        }
    }
}

/// Language tag the analyzer and scorer treat the generated bundle as.
fn stack_language(stack: &TechStackOption) -> &'static str {
    match stack.family {
        StackFamily::NodeLike => "javascript",
        _ => {
            let lowered = stack.language.to_lowercase();
            if lowered.contains("javascript") || lowered.contains("typescript") {
                "javascript"
            } else {
                "python"
            }
        }
    }
}

fn join_section(files: &IndexMap<String, String>) -> String {
    files.values().cloned().collect::<Vec<_>>().join("\n\n")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Config management and version info work without a loaded config
    match &cli.command {
        Commands::Version => {
            println!("devforge v{}", env!("CARGO_PKG_VERSION"));
            println!("AI-powered development assistant");
            return Ok(());
        }
        Commands::Config { action } => {
            init_tracing(cli.log_level.as_deref().unwrap_or("info"));
            return run_config(cli.config.clone(), action);
        }
        _ => {}
    }

    let app = DevForge::new(&cli)?;

    // Initialize logging; the flag wins over the configured level
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| app.config().general.log_level.clone());
    init_tracing(&level);

    // Handle commands
    match cli.command {
        Commands::Generate {
            requirement,
            context_file,
            stack,
            output,
            no_save,
        } => {
            app.run_generate(
                &requirement,
                context_file.as_deref(),
                stack.as_deref(),
                output,
                no_save,
            )
            .await?
        }
        Commands::Stacks {
            requirement,
            context_file,
        } => app.run_stacks(&requirement, context_file.as_deref()).await?,
        Commands::Analyze { path, output } => app.run_analyze(path, output).await?,
        Commands::Assess {
            code,
            tests,
            output,
        } => app.run_assess(code, tests, output).await?,
        Commands::Scaffold { file, ai, output } => app.run_scaffold(file, ai, output).await?,
        Commands::Config { .. } | Commands::Version => unreachable!("handled above"),
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let log_level = match level {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();
}
