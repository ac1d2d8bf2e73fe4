use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use parwalk::{Collector, Entry, Visitor, WalkSettings, Walker};

#[derive(Parser, Debug)]
#[command(name = "parwalk", version, about = "Concurrent directory tree walker")]
struct Cli {
    /// Root of the walk (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Maximum concurrent I/O operations
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Do not descend below this depth (root is 0)
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Directory name to skip; may be repeated
    #[arg(long = "skip", value_name = "NAME")]
    skip: Vec<String>,

    /// Stop at the first unreadable entry
    #[arg(long)]
    fail_fast: bool,

    /// Print every visited path
    #[arg(long)]
    print: bool,

    /// Export the walk report as JSON to file
    #[arg(long)]
    export_json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing (logs to stderr)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = WalkSettings::default().with_max_depth(cli.max_depth);
    if let Some(conc) = cli.concurrency {
        settings.max_concurrent_io = conc;
    }

    let root = std::fs::canonicalize(&cli.path)?;
    let collector = Collector::new(cli.skip, cli.fail_fast);
    let walker = Walker::new(settings);
    let started_at = chrono::Utc::now();

    let outcome = if cli.print {
        let inner = collector.clone();
        walker
            .walk(root.clone(), move |entry: &Entry| {
                println!("{}", entry.path.display());
                inner.visit(entry)
            })
            .await
    } else {
        walker.walk(root.clone(), collector.clone()).await
    };

    let report = collector.report(root, &outcome, walker.settings(), started_at);

    if let Some(ref export_path) = cli.export_json {
        parwalk::export::json::export_json(&report, export_path)?;
        eprintln!("Exported to: {}", export_path.display());
    }

    let progress = collector.progress().snapshot();
    eprintln!(
        "{} files, {} dirs, {} other, {} bytes, {} errors in {:.3}s ({:.0} entries/s)",
        report.total_files,
        report.total_dirs,
        report.total_other,
        report.total_size,
        progress.errors_count,
        progress.elapsed.as_secs_f64(),
        progress.entries_per_second,
    );

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!("Walk aborted: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
