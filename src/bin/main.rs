use clap::Parser;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use normalizer_core::{MatchDiagnostics, NameCategory, NormalizeOptions, Normalizer, NormalizerConfig, SearchMode};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Normalizes historical name spellings read from stdin, one per line.
#[derive(Parser, Debug)]
#[command(name = "name_normalizer", version)]
struct Args {
    /// first, last, last_extended, patronym, cause_of_death or cause_of_death_extended
    #[arg(short, long)]
    category: String,

    /// Directory holding the reference tables
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the prefix trie instead of comparing against every reference name
    #[arg(long)]
    prefix: bool,

    /// Only normalize the first token of each line
    #[arg(long, conflicts_with = "all")]
    first_token: bool,

    /// Normalize every token of each line separately
    #[arg(long)]
    all: bool,

    /// Write one JSON object per line
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Output<'a> {
    raw: &'a str,
    normalized: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<&'a MatchDiagnostics>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let normalizer = match build_normalizer(&args) {
        Ok(normalizer) => normalizer,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(&args, &normalizer) {
        eprintln!("{} {}", "[ERROR]".red().bold(), e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn build_normalizer(args: &Args) -> normalizer_core::Result<Normalizer> {
    let mut config = match &args.config {
        Some(path) => NormalizerConfig::load(path)?,
        None => NormalizerConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    let category: NameCategory = args.category.parse()?;
    Normalizer::new(category, &config)
}

fn run(args: &Args, normalizer: &Normalizer) -> io::Result<()> {
    let options = NormalizeOptions {
        mode: if args.prefix { SearchMode::Prefix } else { SearchMode::Exhaustive },
        only_first_token: args.first_token,
    };
    let styled = !args.json && io::stdout().is_tty();
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let raw = line?;
        if args.all {
            let normalized = normalizer.normalize_all_with(&raw, options.mode);
            write_line(&mut stdout, args.json, styled, &raw, &normalized, None)?;
        } else {
            let (normalized, diagnostics) = normalizer.normalize_with(Some(&raw), options);
            write_line(&mut stdout, args.json, styled, &raw, &normalized, Some(&diagnostics))?;
        }
    }
    stdout.flush()
}

/// Plain output is always `raw<TAB>normalized`; on a terminal unmatched
/// names are highlighted and followed by the nearest reference key.
fn write_line(
    out: &mut impl Write,
    json: bool,
    styled: bool,
    raw: &str,
    normalized: &str,
    diagnostics: Option<&MatchDiagnostics>,
) -> io::Result<()> {
    if json {
        let output = Output { raw, normalized, diagnostics };
        let line = serde_json::to_string(&output).map_err(io::Error::other)?;
        return writeln!(out, "{}", line);
    }
    match diagnostics {
        Some(d) if styled && !d.success => writeln!(
            out,
            "{}\t{}\t{}",
            raw,
            normalized.yellow(),
            format!("(nearest: {} {:.3})", d.nearest.as_deref().unwrap_or("-"), d.similarity).dark_grey()
        ),
        _ => writeln!(out, "{}\t{}", raw, normalized),
    }
}
