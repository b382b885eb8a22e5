//! `weaver` — CLI front-end for the snippet memory engine.
//!
//! # Usage
//!
//! ```text
//! weaver <command> [args]
//!
//! Commands:
//!   save <text> [--url <source>]   save a snippet (runs extraction)
//!   list                           list saved snippets
//!   show <id>                      print one snippet in full
//!   delete <id>                    delete a snippet (graph is rebuilt)
//!   clear                          delete everything
//!   optimize <prompt>              rewrite a prompt with saved context
//!   graph                          print graph stats and relationships
//!   top [n]                        show the n most-connected concepts
//!   find <query>                   search concepts by name/type/description
//! ```
//!
//! Configuration comes from `config/default.toml` plus `WEAVER_*` env vars;
//! the oracle API key must be in `WEAVER_API_KEY` (a `.env` file is read if
//! present).

use std::process;

use tracing::info;

use weaver::config;
use weaver::engine::Weaver;
use weaver::error::AppError;
use weaver::graph::query;
use weaver::logger;
use weaver::prompts;

struct Args {
    command: Option<String>,
    url: Option<String>,
    rest: Vec<String>,
}

fn parse_args() -> Args {
    let mut command = None;
    let mut url = None;
    let mut rest = Vec::new();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--url" | "-u" => {
                url = iter.next();
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            _ if command.is_none() => command = Some(arg),
            _ => rest.push(arg),
        }
    }

    Args { command, url, rest }
}

fn print_help() {
    eprintln!("usage: weaver <command> [args]");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  save <text> [--url <source>]   save a snippet (runs extraction)");
    eprintln!("  list                           list saved snippets");
    eprintln!("  show <id>                      print one snippet in full");
    eprintln!("  delete <id>                    delete a snippet (graph is rebuilt)");
    eprintln!("  clear                          delete everything");
    eprintln!("  optimize <prompt>              rewrite a prompt with saved context");
    eprintln!("  graph                          print graph stats and relationships");
    eprintln!("  top [n]                        show the n most-connected concepts");
    eprintln!("  find <query>                   search concepts by name/type/description");
    eprintln!();
    eprintln!("env:");
    eprintln!("  WEAVER_API_KEY    oracle API key (required for the gemini provider)");
    eprintln!("  WEAVER_DATA_DIR   override the data directory");
    eprintln!("  WEAVER_LOG_LEVEL  override the log level");
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level)?;

    info!(
        data_dir = %config.data_dir.display(),
        provider = %config.oracle.provider,
        "config loaded"
    );

    let args = parse_args();
    let Some(command) = args.command else {
        eprintln!("error: no command given");
        eprintln!("  run 'weaver --help' for usage");
        process::exit(1);
    };

    let engine = Weaver::from_config(&config)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Config(format!("tokio runtime: {e}")))?;

    rt.block_on(dispatch(&engine, &command, args.url, &args.rest))
}

async fn dispatch(
    engine: &Weaver,
    command: &str,
    url: Option<String>,
    rest: &[String],
) -> Result<(), AppError> {
    match command {
        "save" => {
            let text = rest.first().ok_or_else(|| usage("save <text> [--url <source>]"))?;
            let snippet = engine.save_snippet(text, url.as_deref().unwrap_or("")).await?;
            println!("saved {}", snippet.id);
            println!(
                "  {} nodes, {} relationships extracted",
                snippet.nodes.len(),
                snippet.relationships.len()
            );
        }
        "list" => {
            let snippets = engine.snippets().await?;
            if snippets.is_empty() {
                println!("no saved snippets");
                return Ok(());
            }
            for s in &snippets {
                println!(
                    "{}  {}  [{}]  {}",
                    s.id,
                    format_timestamp(s.timestamp),
                    prompts::domain_of(&s.source_url),
                    prompts::preview(&s.text, 50),
                );
            }
        }
        "show" => {
            let id = rest.first().ok_or_else(|| usage("show <id>"))?;
            let snippets = engine.snippets().await?;
            let Some(s) = snippets.iter().find(|s| &s.id == id) else {
                return Err(AppError::Store(format!("no snippet with id {id}")));
            };
            println!("id:        {}", s.id);
            println!("saved:     {}", format_timestamp(s.timestamp));
            println!("source:    {}", if s.source_url.is_empty() { "-" } else { &s.source_url });
            let concepts: Vec<&str> = s.nodes.iter().map(|n| n.name.as_str()).collect();
            println!("concepts:  {}", if concepts.is_empty() { "-".to_string() } else { concepts.join(", ") });
            println!();
            println!("{}", s.text);
        }
        "delete" => {
            let id = rest.first().ok_or_else(|| usage("delete <id>"))?;
            engine.delete_snippet(id).await?;
            println!("deleted {id}");
        }
        "clear" => {
            engine.clear_all().await?;
            println!("cleared");
        }
        "optimize" => {
            let prompt = rest.first().ok_or_else(|| usage("optimize <prompt>"))?;
            let optimized = engine.optimize_query(prompt).await?;
            println!("{optimized}");
        }
        "graph" => {
            let graph = engine.graph().await?;
            println!(
                "{} nodes, {} relationships",
                graph.nodes.len(),
                graph.relationships.len()
            );
            for rel in &graph.relationships {
                let from = node_name(&graph, &rel.from_node);
                let to = node_name(&graph, &rel.to_node);
                println!("  {} --[{}]--> {}", from, rel.relationship_type, to);
            }
        }
        "top" => {
            let limit = rest
                .first()
                .map(|s| s.parse::<usize>())
                .transpose()
                .map_err(|e| AppError::Config(format!("invalid count: {e}")))?
                .unwrap_or(7);
            let graph = engine.graph().await?;
            for node in query::top_nodes_by_degree(&graph, limit) {
                println!(
                    "{}  ({}, {} connections)",
                    node.name,
                    node.node_type,
                    query::degree(&graph, &node.id)
                );
            }
        }
        "find" => {
            let q = rest.first().ok_or_else(|| usage("find <query>"))?;
            let graph = engine.graph().await?;
            let matches = query::filter_nodes(&graph, q);
            if matches.is_empty() {
                println!("no matching concepts");
                return Ok(());
            }
            for node in matches {
                println!("{}  ({})  {}", node.name, node.node_type, node.description);
                for nb in query::neighbors(&graph, &node.id) {
                    println!(
                        "    --[{}]--> {}",
                        nb.relationship.relationship_type, nb.node.name
                    );
                }
                let mentions = engine.snippets_mentioning(node).await?;
                println!("    found in {} snippet(s)", mentions.len());
            }
        }
        other => {
            return Err(AppError::Config(format!(
                "unknown command: {other}\n  run 'weaver --help' for usage"
            )));
        }
    }
    Ok(())
}

fn usage(msg: &str) -> AppError {
    AppError::Config(format!("usage: weaver {msg}"))
}

/// Resolve a node id to its display name; dangling ids print as the raw id.
fn node_name<'a>(graph: &'a weaver::graph::Graph, id: &'a str) -> &'a str {
    graph
        .nodes
        .iter()
        .find(|n| n.id == id)
        .map(|n| n.name.as_str())
        .unwrap_or(id)
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}
