use clap::Parser;
use oildata_normalizer::{run_batch, NormalizeOptions};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    about = "Normalize reservoir-economics report workbooks into one long-format forecast table."
)]
struct Args {
    /// Directory holding unprocessed report workbooks (*.xls*).
    input_dir: PathBuf,

    /// Directory staged (date-prefixed) input files are moved to.
    #[arg(long, default_value = "processed")]
    processed_dir: PathBuf,

    /// Directory the aggregate output workbook is written to.
    #[arg(long, default_value = "curated")]
    output_dir: PathBuf,

    /// JSON file overriding loader, layout, and taxonomy settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of preamble rows skipped before segmentation.
    #[arg(long)]
    skip_rows: Option<usize>,

    /// Read a named sheet instead of the first one.
    #[arg(long)]
    sheet: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut options = match &args.config {
        Some(path) => match NormalizeOptions::from_path(path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("failed to read config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => NormalizeOptions::default(),
    };
    if let Some(skip_rows) = args.skip_rows {
        options.load.skip_rows = skip_rows;
    }
    if let Some(sheet) = args.sheet {
        options.load.sheet = Some(sheet);
    }

    let summary = match run_batch(
        &args.input_dir,
        &args.processed_dir,
        &args.output_dir,
        &options,
    ) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("run failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "processed {} file(s), {} failure(s)",
        summary.processed.len(),
        summary.failures.len()
    );
    for failure in &summary.failures {
        println!("  failed: {}: {}", failure.path.display(), failure.error);
    }
    if let Some(output) = &summary.output {
        println!("wrote {} row(s) to {}", summary.rows_written, output.display());
    }

    if summary.processed.is_empty() && !summary.failures.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
