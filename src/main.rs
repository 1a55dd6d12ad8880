//! hatch - verified footage ingest and project scaffolding.
//!
//! Usage:
//!   hatch scan <PATH>...                 List the files a selection would ingest
//!   hatch tree <ROOT>                    Show a project's folder structure
//!   hatch ingest <PATH>... --dest <DIR>  Copy and verify footage
//!   hatch logs [--dest <DIR>]            Show the operation log
//!   hatch logs clear                     Delete every log entry
//!   hatch scaffold --dest <DIR> --name <ROOT> <FOLDER>...
//!   hatch scaffold --dest <DIR> --name <ROOT> --like <PROJECT>
//!   hatch --help                         Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use hatch_core::{ProjectMetadata, Settings, StructureNode, VerifyMode};
use hatch_ops::{
    ConflictAction, IngestEngine, IngestRequest, LogEntry, OperationLog, ResolveRequest,
    scaffold_project,
};
use hatch_scan::{SourceEnumerator, read_structure};

#[derive(Parser)]
#[command(
    name = "hatch",
    version,
    about = "Verified footage ingest and project scaffolding",
    long_about = "hatch offloads camera footage into a project destination, verifies \
                  every copy and keeps an auditable log of each run.\n\n\
                  Files that already exist at the destination are reported as \
                  conflicts; pass --on-conflict to resolve them in the same run."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the files a selection would ingest
    Scan {
        /// Files or folders to enumerate
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the folder structure under a root
    Tree {
        root: PathBuf,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy footage into a destination with verification
    Ingest {
        /// Files or folders to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Destination folder
        #[arg(short, long)]
        dest: PathBuf,

        /// Project name recorded in the log
        #[arg(long)]
        project: Option<String>,

        /// Client name recorded in the log
        #[arg(long)]
        client: Option<String>,

        /// Project type recorded in the log
        #[arg(long)]
        kind: Option<String>,

        /// Project date recorded in the log
        #[arg(long)]
        date: Option<String>,

        /// Resolve conflicts right away: skip or overwrite
        #[arg(long)]
        on_conflict: Option<ConflictAction>,

        /// Verification mode: size or checksum (defaults to settings)
        #[arg(long)]
        verify: Option<VerifyMode>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or clear the operation log
    Logs {
        #[command(subcommand)]
        action: Option<LogsCommand>,

        /// Only show runs into this project folder
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a project folder tree
    Scaffold {
        /// Folder to create the project in
        #[arg(short, long)]
        dest: PathBuf,

        /// Project root folder name
        #[arg(short, long)]
        name: String,

        /// Copy the folder layout of an existing project
        #[arg(long)]
        like: Option<PathBuf>,

        /// Relative folders to create under the root
        folders: Vec<String>,
    },
}

#[derive(Subcommand)]
enum LogsCommand {
    /// Delete every log entry
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Command::Scan { paths, json } => run_scan(&settings, &paths, json)?,
        Command::Tree { root, json } => run_tree(&root, json)?,
        Command::Ingest {
            paths,
            dest,
            project,
            client,
            kind,
            date,
            on_conflict,
            verify,
            json,
        } => {
            let metadata = ProjectMetadata {
                project_name: project,
                client_name: client,
                project_type: kind,
                date,
            };
            run_ingest(&settings, &paths, dest, metadata, on_conflict, verify, json).await?;
        }
        Command::Logs { action, dest, json } => {
            let log = open_log(&settings)?;
            match action {
                Some(LogsCommand::Clear) => {
                    log.clear().context("Failed to clear log")?;
                    println!("Operation log cleared.");
                }
                None => run_logs(&log, dest.as_deref(), json)?,
            }
        }
        Command::Scaffold {
            dest,
            name,
            like,
            mut folders,
        } => {
            if let Some(template) = like {
                let tree = read_structure(&template).context("Failed to read template")?;
                folders.extend(
                    tree.relative_folders()
                        .iter()
                        .map(|p| p.to_string_lossy().into_owned()),
                );
            }
            let result = scaffold_project(&dest, &name, &folders)?;
            println!("Created {}", result.root.display());
            for folder in &result.created {
                println!("  {}", folder.display());
            }
        }
    }

    Ok(())
}

fn open_log(settings: &Settings) -> Result<OperationLog> {
    let path = settings
        .log_path()
        .ok_or_else(|| eyre!("No configuration directory available for the operation log"))?;
    tracing::debug!(path = %path.display(), "opening operation log");
    OperationLog::open(&path).with_context(|| format!("Failed to open log {}", path.display()))
}

fn enumerator(settings: &Settings) -> Result<SourceEnumerator> {
    SourceEnumerator::with_config(settings.scan.clone()).context("Invalid scan settings")
}

/// List enumerated files.
fn run_scan(settings: &Settings, paths: &[PathBuf], json: bool) -> Result<()> {
    let result = enumerator(settings)?.enumerate(paths);

    if json {
        println!("{}", serde_json::to_string_pretty(&result.files)?);
    } else {
        for file in &result.files {
            println!("{:>10}  {}", format_size(file.size), file.relative_path.display());
        }
        println!();
        println!(
            " {} files, {}",
            result.files.len(),
            format_size(result.total_size())
        );
    }

    if result.has_warnings() {
        report_warnings(&result.warnings);
    }
    Ok(())
}

fn run_tree(root: &Path, json: bool) -> Result<()> {
    let tree = read_structure(root).context("Failed to read structure")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        println!("{}", tree.name);
        print_node(&tree, "");
        println!();
        println!(" {} folders", tree.folder_count());
    }
    Ok(())
}

fn print_node(node: &StructureNode, prefix: &str) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        println!("{}{}{}", prefix, if last { "└── " } else { "├── " }, child.name);
        if !child.is_leaf() {
            let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
            print_node(child, &next);
        }
    }
}

async fn run_ingest(
    settings: &Settings,
    paths: &[PathBuf],
    dest: PathBuf,
    metadata: ProjectMetadata,
    on_conflict: Option<ConflictAction>,
    verify: Option<VerifyMode>,
    json: bool,
) -> Result<()> {
    let enumeration = enumerator(settings)?.enumerate(paths);
    if enumeration.has_warnings() {
        report_warnings(&enumeration.warnings);
    }

    if enumeration.files.is_empty() {
        println!("Nothing to ingest.");
        return Ok(());
    }

    let mut config = settings.ingest.clone();
    if let Some(mode) = verify {
        config.verify = mode;
    }
    let engine = IngestEngine::with_config(open_log(settings)?, config);

    eprintln!(
        "Ingesting {} files ({}) into {}",
        enumeration.files.len(),
        format_size(enumeration.total_size()),
        dest.display()
    );

    let bar = progress_bar()?;
    let mut task = engine.start_ingest(IngestRequest::new(
        enumeration.files,
        &dest,
        metadata.clone(),
    ));
    while let Some(progress) = task.progress.recv().await {
        bar.set_position(u64::from(progress.percent));
        bar.set_message(progress.message);
    }
    bar.finish_and_clear();

    let mut report = task.finish().await?;

    if let Some(action) = on_conflict.filter(|_| !report.result.conflicts.is_empty()) {
        eprintln!(
            "Resolving {} conflicts ({action})",
            report.result.conflicts.len()
        );
        let bar = progress_bar()?;
        let mut task = engine.start_resolve(ResolveRequest {
            conflicts: report.result.conflicts.clone(),
            action,
            destination: dest.clone(),
            metadata,
            log_id: report.log_id.clone(),
        });
        while let Some(progress) = task.progress.recv().await {
            bar.set_position(u64::from(progress.percent));
            bar.set_message(progress.message);
        }
        bar.finish_and_clear();
        report.result.absorb(task.finish().await?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let result = &report.result;
    println!();
    println!("{}", "─".repeat(60));
    println!(" {}", result.summary());
    println!(" {} verified", format_size(result.total_size));
    if let Some(id) = &report.log_id {
        println!(" Log entry {id}");
    }
    println!("{}", "─".repeat(60));

    if !result.failed.is_empty() {
        println!();
        println!(" Failed:");
        for failure in &result.failed {
            println!("   {failure}");
        }
    }
    if !result.conflicts.is_empty() {
        println!();
        println!(" Already at destination (rerun with --on-conflict):");
        for conflict in &result.conflicts {
            println!("   {}", conflict.display_name);
        }
    }

    Ok(())
}

fn run_logs(log: &OperationLog, dest: Option<&Path>, json: bool) -> Result<()> {
    let entries = match dest {
        Some(dest) => log.list_for_destination(dest)?,
        None => log.list()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No ingest runs logged.");
        return Ok(());
    }

    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

fn print_entry(entry: &LogEntry) {
    println!(
        "{}  {:<8} {}",
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.status.to_string(),
        entry.metadata.display_name()
    );
    println!("    {}", entry.description);
    println!("    -> {}", entry.destination.display());
    println!(
        "    {} copied, {} skipped, {} failed, {} pending conflicts",
        entry.files_copied, entry.files_skipped, entry.files_failed, entry.files_conflict
    );
}

fn report_warnings(warnings: &[hatch_core::ScanWarning]) {
    for warning in warnings {
        eprintln!("warning: skipped {}", warning.message);
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {wide_msg}")?
            .progress_chars("█▉▊▋▌▍▎▏ "),
    );
    Ok(bar)
}

/// Format bytes as human-readable size.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
