use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use redocx::{Options, PageBreaks};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BreakMode {
    Auto,
    Rendered,
    Explicit,
}

impl From<BreakMode> for PageBreaks {
    fn from(mode: BreakMode) -> Self {
        match mode {
            BreakMode::Auto => PageBreaks::Auto,
            BreakMode::Rendered => PageBreaks::Rendered,
            BreakMode::Explicit => PageBreaks::Explicit,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Reconcile page footnotes and normalize text in a DOCX, keeping formatting")]
struct Cli {
    /// Input DOCX file
    input: PathBuf,

    /// Output DOCX file
    output: Option<PathBuf>,

    /// Most footnotes a single page may hold
    #[arg(long, default_value_t = redocx::DEFAULT_MAX_SENTINELS)]
    max_sentinels: usize,

    /// Which markup decides where pages break
    #[arg(long, value_enum, default_value = "auto")]
    page_breaks: BreakMode,

    /// Warn about paragraphs not longer than this many characters (0 disables)
    #[arg(long, default_value_t = 60)]
    min_length: usize,

    /// Do not rejoin paragraphs split across pages
    #[arg(long)]
    no_merge: bool,

    /// Keep short all-digit paragraphs (running page numbers)
    #[arg(long)]
    keep_page_numbers: bool,

    /// Do not normalize dashes between digits
    #[arg(long)]
    no_dashes: bool,

    /// `word:replacement` dictionary for ё restoration
    #[arg(long, value_name = "PATH")]
    yo_dictionary: Option<PathBuf>,

    /// Print the tagged paragraphs and footnotes instead of writing a document
    #[arg(long)]
    dump: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = Options {
        max_sentinels: cli.max_sentinels,
        page_breaks: cli.page_breaks.into(),
        min_paragraph_len: cli.min_length,
        merge_continuations: !cli.no_merge,
        strip_page_numbers: !cli.keep_page_numbers,
        dash_normalization: !cli.no_dashes,
        yo_dictionary: cli.yo_dictionary,
    };

    let result = if cli.dump {
        dump(&cli.input, &options)
    } else if let Some(output) = &cli.output {
        redocx::process(&cli.input, output, &options)
    } else {
        eprintln!("Error: OUTPUT is required unless --dump is given");
        return ExitCode::from(2);
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn dump(input: &std::path::Path, options: &Options) -> Result<(), redocx::Error> {
    let source = redocx::docx::parse(input, options.page_breaks)?;
    let doc = redocx::transform(&source, options)?;
    for paragraph in &doc.paragraphs {
        println!("[p{}] {}", paragraph.page, paragraph.marked);
    }
    for (i, footnote) in doc.footnotes.iter().enumerate() {
        println!(
            "{{{{{}}}}} [p{} #{}] {}",
            i + 1,
            footnote.page,
            footnote.ordinal,
            footnote.marked
        );
    }
    Ok(())
}
