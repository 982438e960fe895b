//! RedactAI command-line interface.
//!
//! Runs the detection and redaction pipeline against a local model runtime
//! and prints JSON results on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use redactai::logging::{init_tracing, LoggingConfig};
use redactai::{
    ClientRegistry, DocumentSource, Overrides, Pipeline, PipelineConfig, PreviewOpener,
    RedactorError, RedactorResult, TextExtractor,
};

/// PII detection and redaction for PDF documents
///
/// Uses a locally hosted Ollama model to find sensitive information, then
/// securely removes every verbatim occurrence from a copy of the document.
#[derive(Parser)]
#[command(name = "redactai")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Ollama base URL
    #[arg(long, global = true, env = "OLLAMA_BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Model used for detection
    #[arg(short, long, global = true, env = "REDACTAI_MODEL", value_name = "MODEL")]
    model: Option<String>,

    /// Detection request timeout in seconds
    #[arg(long, global = true, env = "REDACTAI_TIMEOUT_SECS", value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Password for encrypted PDFs
    #[arg(long, global = true, env = "REDACTAI_PDF_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect sensitive data and print a masked report (writes nothing)
    Analyze {
        /// Input PDF file path
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Write a redacted copy and a highlighted preview
    Redact {
        /// Input PDF file path
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Redact with values excluded from or added to the detected set
    Custom {
        /// Input PDF file path
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Value to leave unredacted (can be specified multiple times)
        #[arg(short, long, value_name = "TEXT")]
        exclude: Vec<String>,

        /// Literal value to always redact (can be specified multiple times)
        #[arg(short, long, value_name = "TEXT")]
        include: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check that the runtime is reachable and the model is installed
    Status,

    /// List models installed in the runtime
    Models,

    /// Extract text from a PDF (for debugging and verification)
    Extract {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Directory for the output files (defaults to beside the input)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Return both documents base64-encoded in the JSON instead of writing files
    #[arg(long)]
    encoded: bool,

    /// Open the original and the redacted copy when done
    #[arg(long, conflicts_with = "encoded")]
    open: bool,
}

/// Opens files with the platform's default viewer.
struct SystemOpener;

impl PreviewOpener for SystemOpener {
    fn open_for_preview(&self, path: &Path) -> RedactorResult<()> {
        if !path.exists() {
            return Err(RedactorError::InvalidInput {
                parameter: "path".to_string(),
                reason: format!("{} does not exist", path.display()),
            });
        }

        let mut command = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else if cfg!(target_os = "macos") {
            Command::new("open")
        } else {
            Command::new("xdg-open")
        };
        command.arg(path).spawn().map_err(|e| RedactorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    base_url: &'a str,
    model: &'a str,
    reachable: bool,
    model_available: bool,
}

/// Command handler with the pipeline injected.
struct CommandHandler {
    pipeline: Pipeline,
    verbose: bool,
}

impl CommandHandler {
    fn new(config: PipelineConfig, open: bool, verbose: bool) -> Self {
        let registry = Arc::new(ClientRegistry::new(config.clone()));
        let mut pipeline = Pipeline::new(registry, config);
        if open {
            pipeline = pipeline.with_preview_opener(Box::new(SystemOpener));
        }
        Self { pipeline, verbose }
    }

    fn analyze(&self, input: &Path, model: Option<&str>) -> Result<()> {
        ensure_input(input)?;
        let outcome = self
            .pipeline
            .analyze(&DocumentSource::path(input), model)
            .with_context(|| format!("Analysis of {} failed", input.display()))?;
        print_json(&outcome)
    }

    fn redact(
        &self,
        input: &Path,
        overrides: Option<Overrides>,
        model: Option<&str>,
        encoded: bool,
    ) -> Result<()> {
        ensure_input(input)?;
        let source = DocumentSource::path(input);
        let outcome = match &overrides {
            Some(overrides) => self
                .pipeline
                .redact_custom(&source, overrides, model, encoded),
            None => self.pipeline.redact(&source, model, encoded),
        }
        .with_context(|| format!("Redaction of {} failed", input.display()))?;

        if self.verbose {
            let gaps = outcome.report.gaps().count();
            if gaps > 0 {
                eprintln!("⚠ {} detected value(s) not found verbatim in the document", gaps);
            }
            eprintln!(
                "✓ Redacted {} instance(s) across {} page(s)",
                outcome.report.total_marks,
                outcome.report.per_page_counts.len()
            );
        }
        print_json(&outcome)
    }

    fn status(&self, model: Option<&str>) -> Result<()> {
        let config = self.pipeline.config();
        let status = self
            .pipeline
            .check_status(model, None)
            .context("Status check failed")?;
        print_json(&StatusReport {
            base_url: &config.base_url,
            model: config.model_or_default(model),
            reachable: status.reachable,
            model_available: status.model_available,
        })
    }

    fn models(&self) -> Result<()> {
        let models = self
            .pipeline
            .list_models(None)
            .context("Could not list models")?;
        print_json(&models)
    }

    fn extract(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        ensure_input(input)?;
        let pages = TextExtractor::new(input)
            .with_password(self.pipeline.config().password.clone())
            .extract_all()
            .with_context(|| "Text extraction failed")?;

        let mut text = String::new();
        for page in &pages {
            text.push_str(&format!("--- page {} ---\n", page.page_number()));
            text.push_str(&page.content);
            text.push('\n');
        }

        if let Some(output_path) = output {
            std::fs::write(output_path, &text)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!(
                "✓ Extracted {} page(s), {} characters → {}",
                pages.len(),
                text.len(),
                output_path.display()
            );
        } else {
            print!("{}", text);
        }

        Ok(())
    }
}

fn ensure_input(input: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Layers the config file, then flags and environment, over the defaults.
fn build_config(cli: &Cli, output_dir: Option<&Path>) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(model) = &cli.model {
        config = config.with_default_model(model.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_detection_timeout(Duration::from_secs(secs));
    }
    if let Some(password) = &cli.password {
        config = config.with_password(password.clone());
    }
    if let Some(dir) = output_dir {
        config = config.with_output_dir(dir);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(LoggingConfig {
        verbose: cli.verbose,
        json_format: cli.log_json,
    });

    let output = match &cli.command {
        Commands::Redact { output, .. } | Commands::Custom { output, .. } => Some(output),
        _ => None,
    };
    let config = build_config(&cli, output.and_then(|o| o.output_dir.as_deref()))?;
    let open = output.is_some_and(|o| o.open);
    let handler = CommandHandler::new(config, open, cli.verbose);
    let model = cli.model.as_deref();

    match &cli.command {
        Commands::Analyze { input } => handler.analyze(input, model)?,
        Commands::Redact { input, output } => handler.redact(input, None, model, output.encoded)?,
        Commands::Custom {
            input,
            exclude,
            include,
            output,
        } => {
            let overrides = Overrides::new(exclude.clone(), include.clone());
            handler.redact(input, Some(overrides), model, output.encoded)?
        }
        Commands::Status => handler.status(model)?,
        Commands::Models => handler.models()?,
        Commands::Extract { input, output } => handler.extract(input, output.as_deref())?,
    }

    Ok(())
}
