use anyhow::{Context, Result};
use rtl_mark_config::{FileStore, Settings};
use rtl_mark_engine::{
    DomTree, Engine, MemoryStore, NodeId, RTL_MARKER_CLASS, parse_html, shared,
};
use std::{env, path::PathBuf, process};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut page_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => match iter.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => {
                    eprintln!("Error: --config needs a path");
                    process::exit(1);
                }
            },
            _ if page_path.is_none() => page_path = Some(PathBuf::from(arg)),
            _ => {
                eprintln!("Usage: {} <page.html> [--config <config.toml>]", args[0]);
                process::exit(1);
            }
        }
    }
    let Some(page_path) = page_path else {
        eprintln!("Usage: {} <page.html> [--config <config.toml>]", args[0]);
        process::exit(1);
    };

    let store = match &config_path {
        Some(path) => FileStore::open(path),
        None => FileStore::open_default(),
    };
    let store = match store {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!(
                "Or remove the file at {} to start from defaults",
                config_path
                    .unwrap_or_else(Settings::config_path)
                    .display()
            );
            process::exit(1);
        }
    };

    let markup = std::fs::read_to_string(&page_path)
        .with_context(|| format!("failed to read {}", page_path.display()))?;
    let mut dom = parse_html(&markup);

    let mut engine = Engine::new(shared(store), shared(MemoryStore::new()));
    engine.init(&mut dom);
    tracing::debug!(page = %page_path.display(), "initial scan complete");

    let marked: Vec<NodeId> = dom
        .descendants(dom.root())
        .filter(|&id| dom.has_class(id, RTL_MARKER_CLASS))
        .collect();

    if marked.is_empty() {
        println!("No RTL blocks found.");
    } else {
        println!("Marked {} block(s):", marked.len());
        for id in marked {
            let tag = dom.tag(id).unwrap_or("?");
            println!("  <{tag}> {}", snippet(&dom, id));
        }
    }

    let status = serde_json::to_string_pretty(&engine.status())?;
    println!("{status}");
    Ok(())
}

/// First words of the block's text content, whitespace-collapsed.
fn snippet(dom: &DomTree, node: NodeId) -> String {
    let text: String = dom
        .descendants(node)
        .filter_map(|id| dom.text(id))
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed: Vec<&str> = text.split_whitespace().collect();
    let mut out = collapsed.join(" ");
    const MAX: usize = 60;
    if out.chars().count() > MAX {
        out = out.chars().take(MAX).collect::<String>() + "…";
    }
    out
}
