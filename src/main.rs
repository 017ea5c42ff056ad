use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use ts_splice::config::{apply_plan, load_from_path, ApplicationError, EditResult};
use ts_splice::ts::{validate_syntax, Dialect};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "ts-splice")]
#[command(about = "Structural edits for TypeScript sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an edit plan
    Apply {
        /// Edit plan file, or a directory of `.toml` plans
        #[arg(short, long)]
        plan: PathBuf,

        /// Root that plan file paths are relative to (defaults to the current directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Report syntax errors in TypeScript files
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the edits of a plan
    List {
        #[arg(short, long)]
        plan: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            plan,
            workspace,
            dry_run,
            diff,
        } => cmd_apply(&plan, workspace, dry_run, diff),
        Commands::Check { files } => cmd_check(&files),
        Commands::List { plan } => cmd_list(&plan),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "ts_splice=warn",
        1 => "ts_splice=debug",
        _ => "ts_splice=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// A plan path is either one file or a directory whose `.toml` files are
/// applied in name order.
fn discover_plan_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .toml edit plans found in {}", path.display());
    }
    Ok(files)
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("\n{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_apply(plan: &Path, workspace: Option<PathBuf>, dry_run: bool, show_diff: bool) -> Result<()> {
    let workspace = match workspace {
        Some(path) => path.canonicalize()?,
        None => env::current_dir()?,
    };
    let plan_files = discover_plan_files(plan)?;

    println!("Workspace: {}", workspace.display());
    println!();

    let mut total_applied = 0;
    let mut total_already_applied = 0;
    let mut total_failed = 0;

    for plan_file in plan_files {
        println!("Loading edits from {}...", plan_file.display());
        let plan = load_from_path(&plan_file)?;

        if dry_run {
            println!("{}", "  [DRY RUN - showing what would be applied]".cyan());
        }

        let report = apply_plan(&plan, &workspace, dry_run);

        for (edit_id, result) in &report.results {
            match result {
                Ok(EditResult::Applied { file }) => {
                    let verb = if dry_run { "Would apply to" } else { "Applied to" };
                    println!("{} {}: {} {}", "✓".green(), edit_id, verb, file.display());
                    total_applied += 1;
                }
                Ok(EditResult::AlreadyApplied { file }) => {
                    println!(
                        "{} {}: Already applied to {}",
                        "⊙".yellow(),
                        edit_id,
                        file.display()
                    );
                    total_already_applied += 1;
                }
                Err(e) => {
                    eprintln!("{} {}: Error - {}", "✗".red(), edit_id, e);
                    total_failed += 1;

                    match e {
                        ApplicationError::Manipulation { file, .. } => {
                            eprintln!("  File: {}", file.display());
                            eprintln!("  The file was left as it was before this edit");
                        }
                        ApplicationError::IntroducedSyntaxErrors { file, .. } => {
                            eprintln!("  {}", "CONFLICT: edit produced invalid TypeScript".red());
                            eprintln!("  File: {}", file.display());
                            eprintln!("  Action: Check the texts supplied by the edit");
                        }
                        _ => {}
                    }
                }
            }
        }

        if show_diff || dry_run {
            for change in &report.changes {
                display_diff(&change.path, &change.before, &change.after);
            }
        }

        println!();
    }

    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", total_applied).green());
    println!(
        "  {} already applied",
        format!("{}", total_already_applied).yellow()
    );
    println!("  {} failed", format!("{}", total_failed).red());

    if total_failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check(files: &[PathBuf]) -> Result<()> {
    let mut invalid = 0;

    for file in files {
        let content = fs::read_to_string(file)?;
        match validate_syntax(&content, Dialect::from_path(file)) {
            Ok(()) => println!("{} {}", "✓".green(), file.display()),
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_list(plan: &Path) -> Result<()> {
    for plan_file in discover_plan_files(plan)? {
        let plan = load_from_path(&plan_file)?;
        let title = if plan.meta.name.is_empty() {
            plan_file.display().to_string()
        } else {
            plan.meta.name.clone()
        };
        println!("{}", title.bold());
        if let Some(description) = &plan.meta.description {
            println!("  {}", description.dimmed());
        }

        for edit in &plan.edits {
            let target = edit
                .target
                .as_ref()
                .map_or_else(|| "file".to_string(), ToString::to_string);
            println!(
                "  - {} {} {} on {}",
                edit.id,
                edit.operation.name().cyan(),
                target,
                edit.file
            );
        }
        println!();
    }
    Ok(())
}
