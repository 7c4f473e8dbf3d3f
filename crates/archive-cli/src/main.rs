use std::path::PathBuf;

use archive_core::{ArchiveCatalog, ArchiveQuery, ArchiveView, CategoryFilter, EntryKind, IndexOptions};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "archive-index", version, about = "Build and query the public archive index")]
struct Cli {
    /// Log debug detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the archive root and write the JSON index
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Load the index and print the filtered, year-grouped listing
    Query(QueryArgs),
    /// Report files added, removed or changed since the index was built
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Archive root directory
    #[arg(long, env = "ARCHIVE_ROOT", default_value = "public/archive")]
    root: PathBuf,

    /// Index file
    #[arg(short, long, env = "ARCHIVE_INDEX", default_value = "archive-index.json")]
    output: PathBuf,

    /// Public path the archive root is served under
    #[arg(long, default_value = "/archive")]
    url_prefix: String,

    /// JSON map of path or filename to category
    #[arg(long)]
    categories: Option<PathBuf>,
}

impl SourceArgs {
    fn into_options(self, pretty: bool) -> IndexOptions {
        IndexOptions {
            root: self.root,
            output: self.output,
            url_prefix: self.url_prefix,
            categories: self.categories,
            pretty,
        }
    }
}

#[derive(Args)]
struct QueryArgs {
    /// Index file
    #[arg(short, long, env = "ARCHIVE_INDEX", default_value = "archive-index.json")]
    index: PathBuf,

    /// Case-insensitive text matched against filename and title
    #[arg(short, long, default_value = "")]
    search: String,

    /// Document year, or "all"
    #[arg(long, default_value = "all")]
    year: String,

    /// "photo", "document" or "all"
    #[arg(long = "type", default_value = "all")]
    kind: String,

    /// Category name, "Photos", or "all" (case-insensitive)
    #[arg(long, default_value = "all")]
    category: String,

    /// Print the view as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "archive_core=debug,archive_cli=debug"
    } else {
        "archive_core=info,archive_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn progress_bar() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} {msg}")?);
    Ok(pb)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build { source, compact } => run_build(source.into_options(!compact)),
        Command::Query(args) => run_query(args),
        Command::Check { source } => run_check(source.into_options(true)),
    }
}

fn run_build(options: IndexOptions) -> anyhow::Result<()> {
    let t_total = std::time::Instant::now();
    tracing::debug!(root = %options.root.display(), output = %options.output.display(), "building archive index");
    let pb = progress_bar()?;

    let result = archive_core::build_index(&options, &|_stage, current, total, message| {
        pb.set_length(total);
        pb.set_position(current + 1);
        pb.set_message(message.to_string());
    });
    pb.finish_and_clear();
    let result = result?;

    eprintln!(
        "Done! {} files ({} photos, {} documents, {} bytes) -> {} ({:.2}s)",
        result.entries,
        result.photos,
        result.documents,
        result.total_bytes,
        options.output.display(),
        t_total.elapsed().as_secs_f64()
    );
    Ok(())
}

fn run_check(options: IndexOptions) -> anyhow::Result<()> {
    let report = archive_core::check_index(&options, &|_, _, _, _| {})?;

    for url in &report.added {
        println!("+ {}", url);
    }
    for url in &report.removed {
        println!("- {}", url);
    }
    for url in &report.changed {
        println!("~ {}", url);
    }

    if report.is_stale() {
        anyhow::bail!(
            "{} is stale: {} added, {} removed, {} changed; rebuild it",
            options.output.display(),
            report.added.len(),
            report.removed.len(),
            report.changed.len()
        );
    }
    eprintln!("{} is up to date", options.output.display());
    Ok(())
}

/// `--type` value as a kind facet; `None` means no constraint.
fn kind_filter(value: &str) -> anyhow::Result<Option<EntryKind>> {
    match value {
        "" | "all" => Ok(None),
        other => EntryKind::parse(other)
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("unknown --type {:?}: expected photo, document or all", other)),
    }
}

fn run_query(args: QueryArgs) -> anyhow::Result<()> {
    let catalog = ArchiveCatalog::load(&args.index);

    let category = match args.category.as_str() {
        "" | "all" => CategoryFilter::All,
        other => CategoryFilter::from_query_param(Some(other)),
    };
    let mut query =
        ArchiveQuery::from_params(&args.search, &args.year, "all", "all").with_category(category);
    if let Some(kind) = kind_filter(&args.kind)? {
        query = query.with_kind(kind);
    }
    let view = archive_core::build_view(&catalog, &query);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn print_view(view: &ArchiveView) {
    if let Some(reason) = view.load_error {
        eprintln!("Archive index could not be loaded: {}", reason);
    }
    println!("{} of {} files", view.filtered, view.total);

    if view.no_matches() {
        println!("No documents match your search.");
        return;
    }

    for group in &view.groups {
        let plural = if group.count == 1 { "" } else { "s" };
        println!("\n{}  ({} file{})", group.year, group.count, plural);
        for e in &group.entries {
            let category = e.entry.category.as_deref().map(|c| format!(" [{}]", c)).unwrap_or_default();
            println!("  {}{}  {}", e.title, category, e.doc_date);
            println!("    {} {}", e.action_label(), e.entry.url);
        }
    }
}
