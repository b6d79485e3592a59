mod compare;
mod document;
mod error;
mod export;
mod parser;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use parser::term::detect_term;
use parser::ParsedClasslist;
use settings::Settings;

#[derive(Parser)]
#[command(name = "classlist_parser", about = "Banner class list PDF to per-section rosters")]
struct Cli {
    /// Settings file (TOML); defaults to ./classlist.toml when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract rosters from a class list and write the workbook
    Parse {
        /// Class list PDF (or form-feed separated text dump)
        input: Option<PathBuf>,
        /// Base directory for the output subfolder (default: current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Ignore the configured course allow-list
        #[arg(long)]
        all_courses: bool,
        /// Only read sections of this subject code (e.g. GEO)
        #[arg(short, long)]
        department: Option<String>,
        /// Also print the grouped records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the term detected on the first page
    Term { input: PathBuf },
    /// Report students added/dropped between two exported workbooks
    Compare {
        /// First-week workbook (.xlsx)
        first: PathBuf,
        /// Later workbook (.xlsx)
        second: PathBuf,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    let result = match cli.command {
        Commands::Parse {
            input,
            output_dir,
            all_courses,
            department,
            json,
        } => {
            if all_courses {
                settings.accept_all_courses();
            }
            if department.is_some() {
                settings.department_prefix = department;
            }
            run_parse(input.as_deref(), output_dir.as_deref(), &settings, json)
        }
        Commands::Term { input } => {
            let doc = document::load(&input)
                .with_context(|| format!("Failed to read {:?}", input))?;
            let term = detect_term(doc.first_page());
            if term.is_known() {
                println!("{}", term);
            } else {
                println!("No term found in {}.", doc.path.display());
            }
            Ok(())
        }
        Commands::Compare {
            first,
            second,
            output_dir,
        } => {
            let out_dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
            let (report, path) = compare::run(&first, &second, &out_dir)
                .context("There was an error comparing class lists")?;
            println!(
                "Comparison completed: {} added, {} dropped.\nCreated: {}",
                report.added.len(),
                report.dropped.len(),
                path.display()
            );
            Ok(())
        }
    };

    match &result {
        Ok(()) => info!("Done in {:.1}s", t0.elapsed().as_secs_f64()),
        Err(_) => warn!("Failed after {:.1}s", t0.elapsed().as_secs_f64()),
    }
    result
}

fn run_parse(
    input: Option<&Path>,
    output_dir: Option<&Path>,
    settings: &Settings,
    json: bool,
) -> anyhow::Result<()> {
    let input = document::resolve_input(input)?;
    let doc = document::load(&input).with_context(|| format!("Failed to read {:?}", input))?;

    let parsed = scan_with_progress(&doc, settings);
    if parsed.term.is_known() {
        info!("Detected term: {}", parsed.term);
    } else {
        warn!("No term found on the first page; using the plain output name");
    }

    let groups = parsed.groups();
    info!("{} records in {} sections", parsed.records.len(), groups.len());

    let out_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(&settings.output_subfolder);
    let stem = export::output_stem(&settings.output_name_prefix, &parsed.term);
    let path = export::workbook_path(&out_dir, &stem);

    export::write_workbook(&path, &export::classlist_sheets(&parsed.records, &groups))
        .context("There was an error writing the workbook")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    }
    println!("Created: {}", path.display());
    Ok(())
}

fn scan_with_progress(doc: &document::LoadedDocument, settings: &Settings) -> ParsedClasslist {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(doc.pages.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] page {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let parsed = parser::parse_pages(&doc.pages, settings, |i, added| {
        debug!(page = i + 1, added, "page scanned");
        pb.inc(1);
    });
    pb.finish_and_clear();
    parsed
}
