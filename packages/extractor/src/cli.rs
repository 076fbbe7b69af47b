//! Command-line interface for the extractor.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{parse_section_target, OutputFormat, ParserConfig, DEFAULT_OUTPUT_DIR};
use crate::error::{ExtractorError, Result};
use crate::output::DocumentWriter;
use crate::service::ParserService;
use crate::types::SectionTarget;

/// Regclause - Extract structured clauses from FCA and EBA regulatory PDFs.
#[derive(Parser)]
#[command(name = "regclause")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a regulation document and write the clauses to a file.
    Parse {
        /// Jurisdiction (e.g., uk, eu)
        jurisdiction: String,

        /// Document type (default: first registered for the jurisdiction)
        document_type: Option<String>,

        /// PDF to parse instead of the parser's default location
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output directory (default: output/)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// First page to read (only used by parsers without a fixed start page)
        #[arg(long)]
        start_page: Option<u32>,

        /// Section to extract as ID=TITLE; repeat for several sections
        #[arg(short, long = "section", value_parser = parse_section_arg)]
        sections: Vec<SectionTarget>,

        /// JSON file with a parser configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Leave the metadata block out of the output
        #[arg(long)]
        no_metadata: bool,
    },

    /// List the registered parsers.
    List,

    /// Find the parser that accepts a file.
    Detect {
        /// PDF to inspect
        file: PathBuf,

        /// Only consider parsers of this jurisdiction
        #[arg(short, long)]
        jurisdiction: Option<String>,
    },

    /// Parse every registered document and write one file per document.
    GenerateAll {
        /// Output directory (default: output/)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

fn parse_section_arg(arg: &str) -> std::result::Result<SectionTarget, String> {
    parse_section_target(arg).map_err(|e| e.to_string())
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            jurisdiction,
            document_type,
            file,
            output,
            format,
            start_page,
            sections,
            config,
            no_metadata,
        } => {
            let mut parser_config = match config {
                Some(path) => ParserConfig::from_json_file(&path)?,
                None => ParserConfig::default(),
            };
            if let Some(file) = file {
                parser_config = parser_config.with_document_file_path(file);
            }
            if let Some(format) = format {
                parser_config = parser_config.with_output_format(format);
            }
            if let Some(page) = start_page {
                parser_config = parser_config.with_start_page(page);
            }
            if !sections.is_empty() {
                parser_config = parser_config.with_sections(sections);
            }
            if no_metadata {
                parser_config.include_metadata = false;
            }
            parser_config.validate()?;

            parse_command(
                &jurisdiction,
                document_type.as_deref(),
                parser_config,
                output.as_deref(),
            )
        }
        Commands::List => list_command(),
        Commands::Detect { file, jurisdiction } => detect_command(&file, jurisdiction.as_deref()),
        Commands::GenerateAll { output, format } => {
            let mut parser_config = ParserConfig::default();
            if let Some(format) = format {
                parser_config = parser_config.with_output_format(format);
            }
            generate_all_command(parser_config, output.as_deref())
        }
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn output_dir(output: Option<&Path>) -> PathBuf {
    output.map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), Path::to_path_buf)
}

/// Execute the parse command.
fn parse_command(
    jurisdiction: &str,
    document_type: Option<&str>,
    config: ParserConfig,
    output: Option<&Path>,
) -> Result<()> {
    let writer = DocumentWriter::from_config(output_dir(output), &config);
    let mut service = ParserService::with_defaults(config);

    let document_type = match document_type {
        Some(t) => t.to_string(),
        None => service
            .registry()
            .types_for(jurisdiction)
            .first()
            .map(|t| (*t).to_string())
            .ok_or_else(|| ExtractorError::UnknownJurisdiction {
                jurisdiction: jurisdiction.to_lowercase(),
                available: service.registry().jurisdictions().join(", "),
            })?,
    };

    println!(
        "{} {}:{}",
        style("Parsing").bold(),
        style(jurisdiction.to_lowercase()).cyan(),
        style(&document_type).cyan()
    );
    println!();

    let pb = spinner();
    pb.set_message("Extracting clauses...");

    let document = match service.parse_document(jurisdiction, Some(&document_type)) {
        Ok(document) => document,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Saving output...");
    let path = match writer.write(&document, jurisdiction, &document_type) {
        Ok(path) => path,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    println!("  Document: {}", style(&document.document_type).green());
    println!("  Pages: {}", document.metadata.total_pages);
    println!("  Clauses: {}", document.clause_count());
    for section in &document.metadata.sections_extracted {
        let count = document.clauses_in_section(section).count();
        if count == 0 {
            println!("    {section}: {}", style("not found").yellow());
        } else {
            println!("    {section}: {count}");
        }
    }

    println!();
    println!("{} {}", style("Saved to:").green().bold(), path.display());

    Ok(())
}

/// Execute the list command.
fn list_command() -> Result<()> {
    let service = ParserService::with_defaults(ParserConfig::default());

    println!("{}", style("Registered parsers").bold());
    for entry in service.parser_info() {
        println!(
            "  {}:{}  {} v{} ({})",
            style(&entry.jurisdiction).cyan(),
            style(&entry.document_type).cyan(),
            entry.info.parser,
            entry.info.version,
            entry.info.supported_types.join(", ")
        );
    }

    Ok(())
}

/// Execute the detect command.
fn detect_command(file: &Path, jurisdiction: Option<&str>) -> Result<()> {
    let service = ParserService::with_defaults(ParserConfig::default());
    let detection = service
        .registry()
        .detect(file, jurisdiction, service.config())?;

    println!(
        "{} {}:{} ({})",
        style("Detected").green().bold(),
        style(&detection.jurisdiction).cyan(),
        style(&detection.document_type).cyan(),
        detection.parser.name()
    );

    Ok(())
}

/// Execute the generate-all command.
fn generate_all_command(config: ParserConfig, output: Option<&Path>) -> Result<()> {
    let writer = DocumentWriter::from_config(output_dir(output), &config);
    let mut service = ParserService::with_defaults(config);

    let jurisdictions: Vec<String> = service
        .registry()
        .jurisdictions()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut generated = 0usize;
    let mut failed = 0usize;
    for jurisdiction in &jurisdictions {
        println!("{} {}", style("Processing").bold(), style(jurisdiction).cyan());

        let pb = spinner();
        pb.set_message("Parsing documents...");
        let result = service.parse_all(jurisdiction);
        pb.finish_and_clear();

        let documents = match result {
            Ok(documents) => documents,
            Err(e) => {
                println!("  {} {e}", style("Failed:").red().bold());
                failed += 1;
                continue;
            }
        };

        for (document_type, document) in &documents {
            let path = writer.write(document, jurisdiction, document_type)?;
            println!(
                "  {} {} ({} clauses)",
                style("Generated:").green(),
                path.display(),
                document.clause_count()
            );
            generated += 1;
        }
    }

    println!();
    println!("  Generated: {}", style(generated).green().bold());
    println!("  Failed: {}", style(failed).red());
    println!("  Output directory: {}", writer.output_dir().display());

    if generated == 0 {
        return Err(ExtractorError::NothingGenerated(writer.output_dir().to_path_buf()));
    }
    Ok(())
}
