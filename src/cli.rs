//! Command-line interface for narrate.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::granulate::Granulator;
use crate::lexicography::{Diagnostic, ExpoTag, Extraction, Lexicographer};
use crate::narration::{self, with_suffix};
use crate::report;
use crate::store::LexemeStore;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Marry narrative to source code.
///
/// Narrate reads source files written with exposition tags, binds each tagged
/// comment or string to the identity it describes, and writes a dictionary
/// plus an editable index. The index, once editorialised, renders to markdown.
#[derive(Parser)]
#[command(name = "narrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract expositions from a source tree
    Scan(ScanArgs),
    /// Render an editorialised index to markdown
    Render(RenderArgs),
    /// Show one pipeline stage for a single file
    Inspect(InspectArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Directory to scan
    pub path: PathBuf,

    /// Base name of the output files (default: from config, else "expo")
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Overwrite the dictionary and regenerate the index
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the render command.
#[derive(Parser)]
pub struct RenderArgs {
    /// Base path of the dictionary and index (without extension)
    pub base: PathBuf,

    /// Markdown output path (default: from config, else "narration.md")
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Pipeline stage to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    Powder,
    Purified,
    Precursors,
    Grains,
    Attestations,
    Identities,
    Expositions,
}

/// Arguments for the inspect command.
#[derive(Parser)]
pub struct InspectArgs {
    /// Source file to inspect
    pub file: PathBuf,

    /// Stage to show
    #[arg(short, long, value_enum, default_value = "expositions")]
    pub stage: Stage,

    /// Root the file's dotted name is taken relative to (default: its directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Only show expositions of this category
    #[arg(long)]
    pub category: Option<String>,
}

fn debug_enabled() -> bool {
    std::env::var("NARRATE_DEBUG").is_ok()
}

/// Collect the files a scan should read, in path order.
///
/// Hidden and private entries are skipped along with anything matching the
/// configured exclusion globs (matched against the path under `root`).
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let exclusions = config.exclusions()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            if name.starts_with('.') || config.is_private(&name) {
                return false;
            }
            let relative = e.path().strip_prefix(root).unwrap_or(e.path());
            !exclusions.is_match(relative)
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if config.wants_extension(ext) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Granulate one file and extract its expositions.
pub fn narrate_file(root: &Path, path: &Path) -> anyhow::Result<Extraction> {
    let source = fs::read(path)?;
    let granulation = Granulator::for_path(root, path).granulate_source(&source)?;
    Ok(Lexicographer::extract(&granulation.grains))
}

/// Everything a scan found.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub store: LexemeStore,
    pub scanned: usize,
    /// Files that could not be granulated, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    pub diagnostics: Vec<(PathBuf, Diagnostic)>,
}

/// Extract every file and merge the results in path order.
pub fn scan_files(root: &Path, files: &[PathBuf], parallel: bool) -> ScanOutcome {
    let extract = |path: &PathBuf| (path.clone(), narrate_file(root, path));
    let results: Vec<(PathBuf, anyhow::Result<Extraction>)> = if parallel {
        files.par_iter().map(extract).collect()
    } else {
        files.iter().map(extract).collect()
    };

    let mut outcome = ScanOutcome::default();
    for (path, result) in results {
        match result {
            Ok(extraction) => {
                if debug_enabled() {
                    eprintln!(
                        "[debug] {}: {} lexemes",
                        path.display(),
                        extraction.lexemes.len()
                    );
                }
                outcome.scanned += 1;
                outcome.store.merge(extraction.lexemes);
                outcome
                    .diagnostics
                    .extend(extraction.diagnostics.into_iter().map(|d| (path.clone(), d)));
            }
            Err(e) => outcome.skipped.push((path, e.to_string())),
        }
    }
    outcome
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if !args.path.is_dir() {
        eprintln!("Error: scan directory {:?} does not exist", args.path);
        return Ok(EXIT_ERROR);
    }

    let base = args.output.clone().unwrap_or_else(|| config.output.clone());
    let dictionary_path = with_suffix(&args.path.join(&base), "json");
    let index_path = with_suffix(&args.path.join(&base), "txt");

    if dictionary_path.exists() && !args.force {
        eprintln!("Error: {} already exists", dictionary_path.display());
        eprintln!("Use --force to overwrite it");
        return Ok(EXIT_ERROR);
    }

    let write_index = if index_path.exists() && !args.force {
        eprintln!(
            "Warning: keeping editorialised {}; regenerating the dictionary only",
            index_path.display()
        );
        false
    } else {
        true
    };

    println!("  {}{}", "Scan directory: ".dimmed(), args.path.display());
    println!("  {}{}", "Output base: ".dimmed(), base);
    println!();

    let files = collect_files(&args.path, &config)?;
    if files.is_empty() {
        eprintln!("Warning: no files to scan");
    }

    let outcome = scan_files(&args.path, &files, config.is_parallel());

    for (path, reason) in &outcome.skipped {
        eprintln!("Warning: skipped {}: {}", path.display(), reason);
    }
    for (path, diagnostic) in &outcome.diagnostics {
        eprintln!("Warning: {}: {}", path.display(), diagnostic);
    }

    report::write_summary(&outcome.store);
    report::save(
        &outcome.store,
        &dictionary_path,
        write_index.then_some(index_path.as_path()),
    )?;

    println!(
        "  {} {} lexemes from {} files",
        "Wrote".green(),
        outcome.store.len(),
        outcome.scanned
    );

    Ok(EXIT_SUCCESS)
}

/// Run the render command.
pub fn run_render(args: &RenderArgs) -> anyhow::Result<i32> {
    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.render.output));

    if let Err(e) = narration::render_files(&args.base, &output) {
        eprintln!("Error: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Rendered {}", output.display());
    Ok(EXIT_SUCCESS)
}

/// Run the inspect command.
pub fn run_inspect(args: &InspectArgs) -> anyhow::Result<i32> {
    let category = match args.category.as_deref().map(str::parse::<ExpoTag>) {
        None => None,
        Some(Ok(tag)) => Some(tag),
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let root = match &args.root {
        Some(r) => r.clone(),
        None => args
            .file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let source = match fs::read(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", args.file.display(), e);
            return Ok(EXIT_ERROR);
        }
    };

    let granulation = match Granulator::for_path(&root, &args.file).granulate_source(&source) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}: {}", args.file.display(), e);
            return Ok(EXIT_ERROR);
        }
    };

    let lines = match args.stage {
        Stage::Powder => report::dump_tokens(&granulation.powder),
        Stage::Purified => report::dump_tokens(&granulation.purified),
        Stage::Precursors => report::dump_precursors(&granulation.precursors),
        Stage::Grains => report::dump_grains(&granulation.grains),
        Stage::Attestations => report::attestations(&granulation.grains),
        Stage::Identities => report::identities(&granulation.grains),
        Stage::Expositions => {
            let extraction = Lexicographer::extract(&granulation.grains);
            for diagnostic in &extraction.diagnostics {
                eprintln!("Warning: {}", diagnostic);
            }
            report::write_expositions(&extraction.lexemes, category);
            return Ok(EXIT_SUCCESS);
        }
    };

    for line in lines {
        println!("{}", line);
    }

    Ok(EXIT_SUCCESS)
}
