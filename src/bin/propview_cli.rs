//! CLI tool for propview - metrics, documents and exports of a proposal
//!
//! Usage:
//!   propview_cli metrics                         # Derived metrics of the default proposal as JSON
//!   propview_cli --storage ./state pdf           # System proposal PDF of the stored proposal
//!   propview_cli pdf --kind access-control -o quote.pdf
//!   propview_cli export --collection roi --format xlsx
//!   propview_cli snapshot --input backup.json    # Reconcile and re-export a backup

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use propview::error::GenerationError;
use propview::export::{export_grid, SheetFormat};
use propview::persistence::{self, default_snapshot, FileStorage};
use propview::projection::{
    project_itemized_quote, project_system_proposal, ContentPlan, DirAssetLoader,
};
use propview::render::{DocumentRenderer, PdfRenderer};
use propview::{CollectionRef, EditorConfig, ProposalEditor, ProposalSnapshot, SectionRef};

/// propview - compute, render and export sales proposals.
#[derive(Parser, Debug)]
#[command(name = "propview_cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration (currency, ROI horizon, branding).
    #[arg(short, long, global = true, env = "PROPVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Read the proposal from a file-backed store in this directory.
    #[arg(short, long, global = true)]
    storage: Option<PathBuf>,

    /// Read the proposal from an exported JSON file instead.
    #[arg(short, long, global = true, conflicts_with = "storage")]
    input: Option<PathBuf>,

    /// Generation date stamped on outputs (defaults to today).
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print derived metrics as JSON
    Metrics,

    /// Render a PDF document
    Pdf {
        #[arg(short, long, value_enum, default_value_t = DocumentKind::System)]
        kind: DocumentKind,

        /// Directory holding logo and other assets.
        #[arg(short, long, default_value = ".")]
        assets: PathBuf,

        /// Output path (defaults to the document's file name).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export one grid as CSV or XLSX
    Export {
        #[arg(short = 'l', long, value_enum)]
        collection: Collection,

        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the proposal as an interchange JSON file
    Snapshot {
        /// Print to stdout instead of writing `propuesta_cctv_<date>.json`.
        #[arg(long)]
        stdout: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DocumentKind {
    System,
    AccessControl,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Collection {
    Quotation,
    AccessControl,
    Infrastructure,
    Benefits,
    Roi,
    Locations,
}

impl From<Collection> for CollectionRef {
    fn from(c: Collection) -> Self {
        match c {
            Collection::Quotation => Self::Quotation,
            Collection::AccessControl => Self::AccessControl,
            Collection::Infrastructure => Self::Infrastructure,
            Collection::Benefits => Self::Benefits,
            Collection::Roi => Self::Roi,
            Collection::Locations => Self::Locations,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Xlsx,
}

impl From<Format> for SheetFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => Self::Csv,
            Format::Xlsx => Self::Xlsx,
        }
    }
}

fn load_snapshot(cli: &Cli, config: &EditorConfig) -> propview::Result<ProposalSnapshot> {
    if let Some(ref path) = cli.input {
        let json = fs::read_to_string(path).map_err(propview::error::PersistenceError::from)?;
        return Ok(persistence::load_from_str(&json)?);
    }
    if let Some(ref dir) = cli.storage {
        let editor = ProposalEditor::open(FileStorage::new(dir), config.clone());
        return Ok((*editor.snapshot()).clone());
    }
    Ok(default_snapshot())
}

fn write_output(path: &Path, bytes: &[u8]) -> propview::Result<()> {
    fs::write(path, bytes).map_err(GenerationError::from)?;
    eprintln!("Written: {}", path.display());
    Ok(())
}

fn run(cli: &Cli) -> propview::Result<()> {
    let config = match cli.config {
        Some(ref path) => EditorConfig::from_path(path)?,
        None => EditorConfig::default(),
    };
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let snapshot = load_snapshot(cli, &config)?;

    match cli.command {
        Commands::Metrics => {
            let metrics = propview::finance::derive_metrics(&snapshot, &config.roi)?;
            let json = serde_json::to_string_pretty(&metrics)
                .map_err(propview::error::PersistenceError::from)?;
            let mut stdout = io::stdout();
            writeln!(stdout, "{json}").map_err(GenerationError::from)?;
        }
        Commands::Pdf {
            kind,
            ref assets,
            ref output,
        } => {
            let loader = DirAssetLoader::new(assets);
            let document = match kind {
                DocumentKind::System => {
                    let plan = ContentPlan::system_proposal(date);
                    project_system_proposal(&snapshot, &plan, &loader, &config)
                }
                DocumentKind::AccessControl => {
                    let plan = ContentPlan::access_control_quote(date);
                    project_itemized_quote(
                        &snapshot,
                        SectionRef::AccessControl,
                        &plan,
                        &loader,
                        &config,
                    )
                }
            };
            let bytes = PdfRenderer::new().render(&document)?;
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&document.file_name));
            write_output(&path, &bytes)?;
        }
        Commands::Export {
            collection,
            format,
            ref output,
        } => {
            let export = export_grid(&snapshot, collection.into(), format.into(), date)?;
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&export.file_name));
            write_output(&path, &export.bytes)?;
        }
        Commands::Snapshot { stdout } => {
            let export = persistence::export_snapshot(&snapshot, date)?;
            if stdout {
                let mut out = io::stdout();
                writeln!(out, "{}", export.contents).map_err(GenerationError::from)?;
            } else {
                write_output(Path::new(&export.file_name), export.contents.as_bytes())?;
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("propview=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
