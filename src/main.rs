use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docfill::Config;

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pdf,
    Typst,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Typst => "typ",
        }
    }
}

#[derive(Parser)]
#[command(name = "docfill")]
#[command(about = "Fill a Markdown template with field values and render it")]
struct Cli {
    /// Markdown template containing {{field}} placeholders
    template: PathBuf,

    /// JSON object mapping field names to values
    #[arg(short, long)]
    fields: PathBuf,

    /// Output file (defaults to template name with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file (defaults to docfill.toml next to the template)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "pdf")]
    format: Format,
}

fn read(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docfill=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.template.with_file_name("docfill.toml"));
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    let markdown = read(&cli.template);
    let fields = read(&cli.fields);

    let (document, report) = match docfill::fill_markdown_template(&markdown, &fields, &config) {
        Ok(filled) => filled,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    for name in &report.skipped {
        tracing::warn!(field = %name, "placeholder not found in template");
    }

    let bytes = match cli.format {
        Format::Typst => docfill::document_to_typst(&document, &config).into_bytes(),
        Format::Pdf => match docfill::document_to_pdf(&document, &config) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    };

    // Determine output path
    let output = cli
        .output
        .unwrap_or_else(|| cli.template.with_extension(cli.format.extension()));

    if let Err(e) = fs::write(&output, bytes) {
        eprintln!("Error writing {}: {}", output.display(), e);
        std::process::exit(1);
    }

    println!("Created {}", output.display());
}
