//! chaptext - print the reading text of EPUB chapters

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use chaptext::{ChapterParser, Error, ParseOptions, ResourceTable, Resources};

#[derive(Parser)]
#[command(name = "chaptext")]
#[command(version, about = "Extract reading text from EPUB chapters", long_about = None)]
#[command(after_help = "EXAMPLES:
    chaptext book.epub                          Print every chapter
    chaptext book.epub OEBPS/text/ch1.xhtml     Print one chapter
    chaptext --images --json book.epub          JSON output with image markers")]
struct Cli {
    /// EPUB (or any ZIP) container
    #[arg(value_name = "CONTAINER")]
    container: String,

    /// Chapter paths inside the container (default: every HTML/XHTML entry)
    #[arg(value_name = "CHAPTER")]
    chapters: Vec<String>,

    /// Emit inline image markers instead of dropping images
    #[arg(long)]
    images: bool,

    /// Print a JSON array of {path, title, body}
    #[arg(long)]
    json: bool,

    /// Log debug details to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct ChapterOutput<'a> {
    path: &'a str,
    title: Option<String>,
    body: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "chaptext=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> chaptext::Result<()> {
    let resources = Resources::open(&cli.container)?;
    let parser = ChapterParser::with_options(ParseOptions::new().with_images(cli.images));

    let paths: Vec<&str> = if cli.chapters.is_empty() {
        resources.documents().collect()
    } else {
        cli.chapters.iter().map(String::as_str).collect()
    };

    let mut outputs = Vec::with_capacity(paths.len());
    for path in paths {
        let data = resources
            .get(path)
            .ok_or_else(|| Error::ChapterNotFound(path.to_string()))?;
        let chapter = parser.parse(data, path, &resources)?;
        outputs.push(ChapterOutput {
            path,
            title: chapter.title,
            body: chapter.body,
        });
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&outputs)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        println!("{json}");
    } else {
        for output in &outputs {
            if let Some(title) = &output.title {
                println!("# {title}\n");
            }
            print!("{}", output.body);
            if !output.body.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}
