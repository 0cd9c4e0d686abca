use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::{Parser, ValueEnum};
use related_tfidf::{Document, HitEntry, RelatedConfig, Result, TFIDFVectorizer, TieBreak};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "related-tfidf", about = "Related posts by TF-IDF weighted tag similarity")]
struct Args {
    /// JSON array of {"id", "tags"} documents, "-" reads stdin
    #[arg(short, long, default_value = "-")]
    docs: PathBuf,

    /// Document to find related posts for
    #[arg(short, long, required_unless_present = "all", conflicts_with = "all")]
    target: Option<String>,

    /// Rank related posts for every document
    #[arg(long)]
    all: bool,

    /// Number of results per document
    #[arg(short, long)]
    count: Option<usize>,

    /// Ordering among equal scores
    #[arg(long, value_enum)]
    tie_break: Option<TieBreakArg>,

    /// Score candidates in parallel
    #[arg(long)]
    parallel: bool,

    /// Fail on repeated document ids
    #[arg(long)]
    strict_ids: bool,

    /// JSON config file, flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Tsv)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum TieBreakArg {
    CorpusOrder,
    DocumentId,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::CorpusOrder => TieBreak::CorpusOrder,
            TieBreakArg::DocumentId => TieBreak::DocumentId,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `score<TAB>id` lines
    Tsv,
    Json,
}

#[derive(Serialize)]
struct RelatedOut<'a> {
    id: &'a str,
    similarity: f64,
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    id: &'a str,
    related: Vec<RelatedOut<'a>>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<RelatedConfig> {
    let mut config = match &args.config {
        Some(path) => RelatedConfig::from_path(path)?,
        None => RelatedConfig::default(),
    };
    if let Some(count) = args.count {
        config.count = count;
    }
    if let Some(tie_break) = args.tie_break {
        config.tie_break = tie_break.into();
    }
    config.parallel |= args.parallel;
    config.strict_ids |= args.strict_ids;
    Ok(config)
}

fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let documents = load_documents(&args.docs)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&args, &config, &documents, &mut out)
}

/// Rank and write the results for the requested targets
fn render(
    args: &Args,
    config: &RelatedConfig,
    documents: &[Document],
    out: &mut impl Write,
) -> Result<()> {
    let load_start = Instant::now();
    let vectorizer: TFIDFVectorizer<Document> = if config.strict_ids {
        TFIDFVectorizer::try_new_strict(documents)?
    } else {
        TFIDFVectorizer::new(documents)
    };
    tracing::info!(
        docs = documents.len(),
        vocab = vectorizer.space().dim(),
        elapsed_ms = load_start.elapsed().as_secs_f64() * 1000.0,
        "indexed documents"
    );

    let targets: Vec<&str> = match &args.target {
        Some(target) => {
            if !vectorizer.contains_doc(target) {
                tracing::warn!(id = target.as_str(), "target not found, no related documents");
            }
            vec![target.as_str()]
        }
        None => documents.iter().map(|d| d.id.as_str()).collect(),
    };

    match args.format {
        Format::Tsv => {
            for target in &targets {
                let hits = vectorizer.related_with(target, config);
                if args.all {
                    writeln!(out, "# {target}")?;
                }
                write_tsv(&mut *out, &hits)?;
            }
        }
        Format::Json => {
            let rendered: Vec<DocumentOut<'_>> = targets
                .iter()
                .map(|&target| DocumentOut {
                    id: target,
                    related: to_out(&vectorizer.related_with(target, config)),
                })
                .collect();
            if args.all {
                serde_json::to_writer_pretty(&mut *out, &rendered)?;
            } else {
                let related: Vec<&RelatedOut<'_>> =
                    rendered.iter().flat_map(|d| d.related.iter()).collect();
                serde_json::to_writer_pretty(&mut *out, &related)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn to_out<'a>(hits: &[HitEntry<'a, Document>]) -> Vec<RelatedOut<'a>> {
    hits.iter()
        .map(|hit| RelatedOut {
            id: hit.id(),
            similarity: hit.similarity,
        })
        .collect()
}

fn write_tsv(out: &mut impl Write, hits: &[HitEntry<'_, Document>]) -> io::Result<()> {
    for hit in hits {
        writeln!(out, "{:.6}\t{}", hit.similarity, hit.id())?;
    }
    Ok(())
}
