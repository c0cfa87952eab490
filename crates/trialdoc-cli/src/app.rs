//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use trialdoc_ooxml::{DocumentRenderer, RenderSummary};
use trialdoc_translate::{
    apply, collect, ApplyReport, ChatCompletionsBackend, ParallelTranslator, TextPath,
    TranslationBackend, TranslationConfig, TranslationStats,
};
use trialdoc_uif::UniversalDocument;
use trialdoc_validate::{ValidationEngine, ValidationReport};

use crate::settings::Settings;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "trialdoc")]
#[command(author, version, about = "Clinical trial documents from UIF trees", long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a UIF document to DOCX
    Render {
        /// Input UIF JSON file
        input: PathBuf,

        /// Output DOCX file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render even if validation fails
        #[arg(long)]
        no_validate: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a UIF document
    Validate {
        /// Input UIF JSON file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print every translatable text leaf as JSON
    Extract {
        /// Input UIF JSON file
        input: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a {path: text} JSON map to a UIF document
    Patch {
        /// Input UIF JSON file
        input: PathBuf,

        /// Translation map JSON file
        translations: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate a UIF document
    Translate {
        /// Input UIF JSON file
        input: PathBuf,

        /// Target language code (es, fr, de, ...)
        #[arg(short, long)]
        lang: String,

        /// Output UIF JSON file (default: <input>.<lang>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also render the translated document to this DOCX file
        #[arg(long)]
        render: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            output,
            no_validate,
            config,
        } => {
            render_command(&input, output.as_deref(), no_validate, config.as_deref())?;
        }
        Commands::Validate { input, format } => {
            let report = validate_command(&input, format)?;
            // Exit with error code if there are errors
            if !report.is_valid() {
                std::process::exit(1);
            }
        }
        Commands::Extract { input, output } => {
            extract_command(&input, output.as_deref())?;
        }
        Commands::Patch {
            input,
            translations,
            output,
        } => {
            patch_command(&input, &translations, output.as_deref())?;
        }
        Commands::Translate {
            input,
            lang,
            output,
            render,
            config,
        } => {
            translate_command(
                &input,
                &lang,
                output.as_deref(),
                render.as_deref(),
                config.as_deref(),
            )?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber; `log` records from the renderer are bridged in
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // A second initialization (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read a UIF tree from a JSON file
pub fn load_document(path: &Path) -> Result<UniversalDocument> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse UIF document: {}", path.display()))
}

/// Write a UIF tree as pretty JSON
pub fn save_document(doc: &UniversalDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(doc).context("Failed to serialize UIF document")?;
    write_output(&json, Some(path))
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display()))
        }
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

/// Execute the render command
pub fn render_command(
    input: &Path,
    output: Option<&Path>,
    no_validate: bool,
    config: Option<&Path>,
) -> Result<RenderSummary> {
    println!("trialdoc v{}", trialdoc_ooxml::VERSION);
    println!("Rendering: {}", input.display());

    let settings = Settings::locate(config, input)?;
    let doc = load_document(input)?;

    // Determine output path (default: input with .docx extension)
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension("docx"),
    };

    let summary = render_document(&doc, &output_path, &settings, no_validate)?;

    println!();
    println!("Render complete!");
    println!("  Output: {}", output_path.display());
    println!(
        "  {} sections, {} content blocks",
        summary.section_count, summary.content_block_count
    );
    println!("  Size: {} bytes ({} parts verified)", summary.byte_size, summary.parts.len());

    Ok(summary)
}

fn render_document(
    doc: &UniversalDocument,
    output_path: &Path,
    settings: &Settings,
    no_validate: bool,
) -> Result<RenderSummary> {
    let mut options = settings.render.to_options();
    if no_validate {
        options.validate = false;
    }

    let mut renderer = DocumentRenderer::with_options(options);
    let output = renderer
        .render_to_file(doc, output_path)
        .with_context(|| format!("Failed to render {}", output_path.display()))?;
    Ok(output.summary)
}

/// Execute the validate command
pub fn validate_command(input: &Path, format: OutputFormat) -> Result<ValidationReport> {
    let doc = load_document(input)?;
    let report = ValidationEngine::with_defaults()
        .validate(&doc)
        .with_file(input.display().to_string());

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize diagnostics to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if report.diagnostics.is_empty() {
                println!("✓ No issues found in {}", input.display());
            } else {
                for diag in &report.diagnostics {
                    println!("{}", diag);
                    println!();
                }
                println!(
                    "Found {} error(s) and {} warning(s)",
                    report.errors().count(),
                    report.warnings().count()
                );
            }
        }
    }

    Ok(report)
}

/// Execute the extract command
pub fn extract_command(input: &Path, output: Option<&Path>) -> Result<usize> {
    let doc = load_document(input)?;
    let items = collect(&doc);
    let json = serde_json::to_string_pretty(&items).context("Failed to serialize text items")?;
    write_output(&json, output)?;
    Ok(items.len())
}

/// Execute the patch command
pub fn patch_command(
    input: &Path,
    translations: &Path,
    output: Option<&Path>,
) -> Result<ApplyReport> {
    let mut doc = load_document(input)?;

    let content = fs::read_to_string(translations).with_context(|| {
        format!("Failed to read translation map: {}", translations.display())
    })?;
    let map: HashMap<TextPath, String> = serde_json::from_str(&content).with_context(|| {
        format!("Failed to parse translation map: {}", translations.display())
    })?;

    let report = apply(&mut doc, &map);
    for path in &report.unmatched {
        eprintln!("warning: no text at '{}'", path);
    }

    let json = serde_json::to_string_pretty(&doc).context("Failed to serialize UIF document")?;
    write_output(&json, output)?;
    Ok(report)
}

/// Translate a tree on a fresh runtime
pub fn translate_document(
    doc: &UniversalDocument,
    lang: &str,
    backend: Arc<dyn TranslationBackend>,
    config: TranslationConfig,
) -> Result<(UniversalDocument, TranslationStats)> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let translator = ParallelTranslator::new(backend, config);
    Ok(runtime.block_on(translator.translate_with_stats(doc, lang)))
}

/// Execute the translate command
pub fn translate_command(
    input: &Path,
    lang: &str,
    output: Option<&Path>,
    render: Option<&Path>,
    config: Option<&Path>,
) -> Result<TranslationStats> {
    println!("trialdoc v{}", trialdoc_translate::VERSION);
    println!("Translating: {} -> {}", input.display(), lang);

    let settings = Settings::locate(config, input)?;
    let doc = load_document(input)?;

    let backend = ChatCompletionsBackend::from_config(settings.translation.backend.clone())
        .context("Failed to configure translation backend")?;
    let (translated, stats) =
        translate_document(&doc, lang, Arc::new(backend), settings.translation.clone())?;

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension(format!("{}.json", lang)),
    };
    save_document(&translated, &output_path)?;

    println!();
    println!("Translation complete!");
    println!("  Output: {}", output_path.display());
    println!(
        "  {} items: {} cached, {} translated, {} passed through",
        stats.items_total, stats.items_cached, stats.items_translated, stats.items_passthrough
    );
    println!(
        "  {} batches: {} succeeded, {} failed",
        stats.batches_total, stats.batches_succeeded, stats.batches_failed
    );

    if let Some(docx) = render {
        let summary = render_document(&translated, docx, &settings, false)?;
        println!("  Rendered: {} ({} bytes)", docx.display(), summary.byte_size);
    }

    Ok(stats)
}
