use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use bookgraph_core::{
    AggregatorConfig, AppConfig, BookgraphError, ExitCode, Graph, LookupError, RootSession,
    SearchOptions, Work, WorkLookup,
};
use bookgraph_openlibrary::OpenLibrarySource;

mod logger;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bookgraph",
    about = "Find related books on Open Library and emit them as a graph",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Wrap output in a JSON envelope (for scripts).
    /// Also enabled by setting BOOKGRAPH_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Bypass the on-disk response cache.
    #[arg(long, global = true)]
    no_cache: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search works by title.
    Search {
        query: String,
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Show a single work by Open Library id (e.g. OL45883W).
    Show { id: String },

    /// Build the recommendation graph for one or more root works.
    Graph {
        /// Root work ids, in selection order.
        #[arg(required = true)]
        ids: Vec<String>,
        /// Override the recommendation cap.
        #[arg(long)]
        cap: Option<usize>,
        /// Print a ranked summary instead of graph JSON.
        #[arg(long)]
        summary: bool,
        /// Pretty-print graph JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective configuration as TOML.
    Config,

    /// Check that Open Library is reachable.
    Doctor,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let json_output = cli.json || std::env::var("BOOKGRAPH_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load()?;
    if cli.no_cache {
        config.openlibrary.cache_enabled = false;
    }
    logger::init(&logger::effective_level(&config.log.level, cli.verbose))?;

    let source = Arc::new(OpenLibrarySource::from_config(
        &config.openlibrary,
        Some(AppConfig::cache_dir()),
    )?);

    match cli.command {
        Commands::Search { query, limit } => {
            let opts = SearchOptions::with_limit(limit);
            let works = match source.search_by_title(&query, &opts).await {
                Ok(works) => works,
                Err(e) => fail(json_output, start, &e.into()),
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": works, "total": works.len(), "query": query },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if works.is_empty() {
                println!("No results for: {query}");
            } else {
                for work in &works {
                    println!("{}", work_line(work));
                }
            }
        }

        Commands::Show { id } => {
            let work = match source.resolve_work_by_id(&id).await {
                Ok(work) => work,
                Err(e) => fail(json_output, start, &e.into()),
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":work,"meta":{"duration_ms":dur}}))?;
            } else {
                println!("{}", serde_json::to_string_pretty(&work)?);
            }
        }

        Commands::Graph {
            ids,
            cap,
            summary,
            pretty,
        } => {
            let mut recommend = config.recommend.clone();
            if let Some(cap) = cap {
                recommend.cap = cap.max(1);
            }
            let mut session = RootSession::new(source, AggregatorConfig::from(&recommend));

            let mut skipped = Vec::new();
            for id in &ids {
                match session.add_root(id).await {
                    Ok(_) => {}
                    Err(BookgraphError::RootNotFound(missing)) => {
                        warn!(id = %missing, "root not found, skipping");
                        skipped.push(missing);
                    }
                    Err(e) => fail(json_output, start, &e),
                }
            }
            if session.roots().is_empty() {
                fail(
                    json_output,
                    start,
                    &BookgraphError::RootNotFound(ids.join(", ")),
                );
            }

            let handle = session.spawn_rebuild();
            let rebuilt = tokio::select! {
                res = handle.wait() => res,
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("Interrupted.");
                    std::process::exit(ExitCode::GeneralError as i32);
                }
            };
            match rebuilt {
                Ok(rebuilt) => {
                    session.apply(rebuilt);
                }
                Err(e) => fail(json_output, start, &e),
            }
            let graph = session.graph();
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": graph,
                    "meta": { "duration_ms": dur, "skipped": skipped, "stats": graph.stats() }
                }))?;
            } else if summary {
                print_summary(&session, graph, &skipped);
            } else if pretty {
                println!("{}", serde_json::to_string_pretty(graph)?);
            } else {
                println!("{}", serde_json::to_string(graph)?);
            }
        }

        Commands::Config => {
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "path": AppConfig::config_path(), "config": config },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("# {}", AppConfig::config_path().display());
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }

        Commands::Doctor => {
            let status = source.health_check().await;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":status,"meta":{"duration_ms":dur}}))?;
            } else if status.available {
                println!(
                    "Open Library: ok ({} ms)",
                    status.latency_ms.unwrap_or_default()
                );
            } else {
                println!(
                    "Open Library: unavailable: {}",
                    status.error.as_deref().unwrap_or("unknown error")
                );
            }
            if !status.available {
                std::process::exit(ExitCode::NetworkError as i32);
            }
        }
    }

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

/// Report `err` and exit with its exit code.
fn fail(json_output: bool, start: Instant, err: &BookgraphError) -> ! {
    let code = err.exit_code();
    let kind = match err {
        BookgraphError::RootNotFound(_) | BookgraphError::Lookup(LookupError::NotFound(_)) => {
            "not_found"
        }
        BookgraphError::Lookup(_) => "network",
        _ => "error",
    };
    if json_output {
        let val = serde_json::json!({
            "status": "error",
            "error": kind,
            "message": err.to_string(),
            "meta": { "duration_ms": start.elapsed().as_millis() }
        });
        println!("{val}");
    } else {
        eprintln!("{err}");
    }
    std::process::exit(code as i32);
}

fn work_line(work: &Work) -> String {
    let year = work
        .first_publish_year
        .map(|y| y.to_string())
        .unwrap_or_default();
    let authors = work.authors.join(", ");
    format!(
        "{id:<12}  {title:<40}  {year:<4}  {authors}",
        id = work.id,
        title = work.title,
    )
}

fn print_summary<L: WorkLookup + 'static>(
    session: &RootSession<L>,
    graph: &Graph,
    skipped: &[String],
) {
    println!("Roots:");
    for root in session.roots() {
        println!("  {}", work_line(root));
    }
    for id in skipped {
        println!("  {id:<12}  (not found, skipped)");
    }

    let recs = session.recommendations();
    if recs.is_empty() {
        println!("No recommendations.");
        return;
    }
    println!("Recommendations:");
    for rec in recs {
        let marker = if rec.is_intersection { "*" } else { " " };
        let roots: Vec<&str> = rec.matching_root_ids.iter().collect();
        println!(
            "{marker} {}  [{}]",
            work_line(&rec.work),
            roots.join(", ")
        );
    }

    let stats = graph.stats();
    println!(
        "{} nodes, {} links, {} bridging, {} via shared subjects",
        graph.nodes.len(),
        stats.links,
        stats.bridging,
        stats.intersection
    );
}
