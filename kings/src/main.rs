//! Book of Kings chapter summarizer.
//!
//! Downloads chapters from the Sefaria text repository, summarizes each one
//! with Gemini into a structured Hebrew summary, and writes a Markdown report
//! with per-chapter synopses and a cross-reference of every character and
//! place mentioned. Both the raw text and the summaries are cached under the
//! data directory, so reruns only pay for chapters not seen before.
//!
//! ```bash
//! kings --book I_Kings --chapters 1..8
//! ```

use kings_core::{
    Book, CacheDir, ChapterStore, GeminiSummarizer, Pipeline, ReportAssembler, SefariaClient,
    SummaryStore,
};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kings_core=info,kings=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    let options = match Options::parse(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("Run with --help for usage.");
            return ExitCode::FAILURE;
        }
    };

    // Check for API key
    if std::env::var("GEMINI_API_KEY").is_err() {
        eprintln!("Please set the GEMINI_API_KEY environment variable.");
        eprintln!("You can get an API key from https://aistudio.google.com/api-keys");
        return ExitCode::FAILURE;
    }

    match run(options).await {
        Ok(out) => {
            println!("Summary saved to {}", out.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(options: Options) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let cache = CacheDir::open(&options.data_dir)?;
    let pipeline = Pipeline::new(
        ChapterStore::new(cache.clone(), Box::new(SefariaClient::new())),
        SummaryStore::new(cache, Box::new(GeminiSummarizer::from_env()?)),
    );

    info!(
        book = options.book.english_name(),
        chapters = ?options.chapters,
        "starting run"
    );
    let output = pipeline.run(options.book, options.chapters.clone()).await?;

    let report = ReportAssembler::new().assemble(&output.summaries, &output.aggregate);
    std::fs::write(&options.out, report)?;
    Ok(options.out)
}

/// Parsed command-line options.
struct Options {
    book: Book,
    chapters: RangeInclusive<u32>,
    data_dir: PathBuf,
    out: PathBuf,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut book = Book::FirstKings;
        let mut chapters = 1..=8;
        let mut data_dir = PathBuf::from("data");
        let mut out = PathBuf::from("kings_summary.md");

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--book" => {
                    let value = flag_value(args, i, "--book")?;
                    book = value.parse().map_err(|e| format!("{e}"))?;
                    i += 2;
                }
                "--chapters" => {
                    let value = flag_value(args, i, "--chapters")?;
                    chapters = parse_chapters(value)?;
                    i += 2;
                }
                "--data-dir" => {
                    data_dir = PathBuf::from(flag_value(args, i, "--data-dir")?);
                    i += 2;
                }
                "--out" => {
                    out = PathBuf::from(flag_value(args, i, "--out")?);
                    i += 2;
                }
                other => {
                    return Err(format!("unknown argument '{other}'"));
                }
            }
        }

        Ok(Self {
            book,
            chapters,
            data_dir,
            out,
        })
    }
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

/// Parse a chapter selection: a single number ("5") or a range ("1..8",
/// inclusive on both ends).
fn parse_chapters(value: &str) -> Result<RangeInclusive<u32>, String> {
    let parse_one = |s: &str| {
        s.parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| format!("invalid chapter number '{s}'"))
    };

    if let Some((start, end)) = value.split_once("..") {
        let start = parse_one(start)?;
        let end = parse_one(end)?;
        if start > end {
            return Err(format!("empty chapter range '{value}'"));
        }
        Ok(start..=end)
    } else {
        let n = parse_one(value)?;
        Ok(n..=n)
    }
}

fn print_help() {
    println!("kings - Book of Kings chapter summarizer");
    println!();
    println!("Downloads chapters, summarizes them with Gemini, and writes a");
    println!("Markdown report with a cross-reference of characters and places.");
    println!("Requires the GEMINI_API_KEY environment variable (or a .env file).");
    println!();
    println!("USAGE:");
    println!("  kings [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help           Show this help message");
    println!("  --book <BOOK>        I_Kings or II_Kings (default: I_Kings)");
    println!("  --chapters <RANGE>   Chapter number or inclusive range, e.g. 3 or 1..8");
    println!("                       (default: 1..8)");
    println!("  --data-dir <DIR>     Cache directory for text and summaries (default: data)");
    println!("  --out <FILE>         Report output path (default: kings_summary.md)");
    println!();
    println!("EXAMPLES:");
    println!("  kings                                  # I Kings, chapters 1-8");
    println!("  kings --book II_Kings --chapters 1..25");
    println!("  kings --chapters 17 --out elijah.md");
}
