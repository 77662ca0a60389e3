use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use dashprint::{RenderSettings, Snapshot};

#[derive(Parser)]
#[command(
    name = "dashprint",
    version,
    about = "Render an analytics snapshot into PDF and DOCX report artifacts"
)]
struct Args {
    /// Analytics snapshot JSON file
    snapshot: PathBuf,

    /// Render settings JSON file; built-in defaults apply when omitted
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Which artifact(s) to produce
    #[arg(short, long, value_enum, default_value_t = Format::Both)]
    format: Format,

    /// Directory the artifacts are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pdf,
    Docx,
    Both,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot: Snapshot = serde_json::from_str(&std::fs::read_to_string(&args.snapshot)?)?;
    let settings: RenderSettings = match &args.settings {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => RenderSettings::default(),
    };

    std::fs::create_dir_all(&args.out_dir)?;

    if matches!(args.format, Format::Pdf | Format::Both) {
        let path = dashprint::export_pdf(&snapshot, &settings, &args.out_dir)?;
        println!("{}", path.display());
    }
    if matches!(args.format, Format::Docx | Format::Both) {
        let path = dashprint::export_docx(&snapshot, &settings, &args.out_dir)?;
        println!("{}", path.display());
    }
    Ok(())
}
