//! Builds (or refreshes) the per-domain embedding caches ahead of serving.

use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use vetrag_core::Category;
use vetrag_cli::{build_service, init_logging, load_settings};

#[derive(Parser)]
#[command(name = "vetrag-indexer", about = "Warm the embedding caches")]
struct Args {
    #[arg(short, long, default_value = ".")]
    config_dir: PathBuf,

    /// Drop the existing cache directory first
    #[arg(long)]
    rebuild: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let settings = load_settings(&args.config_dir)?;

    let cache_dir = &settings.data.cache_dir;
    if args.rebuild && cache_dir.exists() {
        tracing::info!(dir = %cache_dir.display(), "removing embedding cache");
        fs::remove_dir_all(cache_dir)?;
    }

    let service = build_service(&settings)?;
    for category in Category::PRIORITY {
        println!("{category}: {} documents indexed", service.documents(category).len());
    }
    println!("cache: {}", cache_dir.display());
    Ok(())
}
