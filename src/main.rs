//! @ai:module:intent CLI entry point for summarizing, annotating and highlighting RINEX files
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on scan, output, config

use clap::{Parser, Subcommand, ValueEnum};
use rinex_lens::{
    config::DEFAULT_CONFIG_FILE, output, scan, Config, FileDetector, OutputFormat, Result,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rinex-lens")]
#[command(author, version, about = "rinex-lens - RINEX observation file annotator")]
struct Cli {
    /// Configuration file (defaults to ./rinex-lens.toml when present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a file, or every observation file under a directory
    Summary {
        /// Path to file or directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// List annotation spans grouped by category
    Annotate {
        /// Path to file
        path: PathBuf,

        /// Only show spans of this category (e.g. C1, L1C, "header line")
        #[arg(long)]
        category: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "json-pretty")]
        format: Format,
    },

    /// Print a file with observation values colored by type
    Highlight {
        /// Path to file
        path: PathBuf,
    },

    /// Write the default configuration file
    Init {
        /// Where to write the configuration
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
    Markdown,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
            Format::Markdown => OutputFormat::Markdown,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rinex_lens=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Summary { path, format } => {
            let config = Config::load_or_default(config_path)?;
            let files = if path.is_file() {
                vec![scan::scan_file(&path, &config.style)?]
            } else {
                let detector = FileDetector::new(&config.scan.extensions);
                scan::scan_directory(&path, &config.style, &detector)?
            };

            println!("{}", output::format_summaries(&files, format.into())?);

            if files.is_empty() {
                tracing::warn!("No observation files found under {}", path.display());
                Ok(ExitCode::from(1))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }

        Commands::Annotate {
            path,
            category,
            format,
        } => {
            let config = Config::load_or_default(config_path)?;
            let file = scan::scan_file(&path, &config.style)?;

            if let Some(category) = &category {
                if !file.document.annotations.has_category(category) {
                    eprintln!("Error: unknown category '{}'", category);
                    return Ok(ExitCode::from(2));
                }
            }

            println!(
                "{}",
                output::format_annotations(&file, category.as_deref(), format.into())?
            );
            Ok(ExitCode::SUCCESS)
        }

        Commands::Highlight { path } => {
            let config = Config::load_or_default(config_path)?;
            let text = scan::read_document(&path)?;
            let document = rinex_lens::parse_with_style(&text, &config.style);
            let categories = config.style.categories(document.header.format_version());

            println!("{}", output::render_highlighted(&text, &document, &categories));

            if let Some(summary) = &document.summary {
                println!("\n{}", output::summary_markdown(summary));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Init { output, force } => init(&output, force),
    }
}

fn init(path: &Path, force: bool) -> Result<ExitCode> {
    if path.exists() && !force {
        eprintln!(
            "Error: {} already exists (use --force to overwrite)",
            path.display()
        );
        return Ok(ExitCode::from(2));
    }

    Config::default().save(path)?;
    tracing::info!("Wrote default configuration to {}", path.display());
    Ok(ExitCode::SUCCESS)
}
