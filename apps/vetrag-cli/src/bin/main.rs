//! vetrag: routed hybrid retrieval over clinical, disease and pharma records.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use vetrag_answer::{provider_from_settings, Assistant, Task};
use vetrag_core::config::ProviderKind;
use vetrag_core::records::{load_records, PharmaRecord};
use vetrag_core::Category;
use vetrag_dose::DoseResolver;
use vetrag_text::CategoryClassifier;
use vetrag_cli::{build_service, init_logging, load_settings};

#[derive(Parser)]
#[command(name = "vetrag")]
#[command(author, version, about = "Veterinary record retrieval and answering", long_about = None)]
struct Cli {
    /// Directory holding config.toml and config.<env>.toml
    #[arg(short, long, default_value = ".")]
    config_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the domain a query would be routed to
    Classify { query: String },

    /// Rank records for a query
    Search {
        query: String,
        /// pharma, clinical or disease; classified when omitted
        #[arg(short, long)]
        domain: Option<Category>,
        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute a dose: "calculate the dose rate of <drug>, <kg> kg <species>"
    Dose { query: String },

    /// Retrieve and answer with a language model
    Ask {
        query: String,
        #[arg(short, long)]
        domain: Option<Category>,
        /// e.g. indication, line_of_treatment, symptoms
        #[arg(short, long, default_value = "general")]
        task: Task,
        #[arg(short, long, value_enum)]
        provider: Option<ProviderArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Ollama,
    Gemini,
}

impl From<ProviderArg> for ProviderKind {
    fn from(p: ProviderArg) -> Self {
        match p {
            ProviderArg::Ollama => ProviderKind::Ollama,
            ProviderArg::Gemini => ProviderKind::Gemini,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut settings = load_settings(&cli.config_dir)?;

    match cli.command {
        Commands::Classify { query } => {
            let classifier = CategoryClassifier::default();
            for (category, hits) in classifier.counts(&query) {
                println!("{category}: {hits}");
            }
            println!("=> {}", classifier.classify(&query));
        }
        Commands::Search { query, domain, json } => {
            let service = build_service(&settings)?;
            let search = service.search(&query, domain)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&search.candidates)?);
            } else if search.candidates.is_empty() {
                println!("No relevant {} data found.", search.category);
            } else {
                println!("domain: {}", search.category);
                for (i, c) in search.candidates.iter().enumerate() {
                    let title = c.text.lines().next().unwrap_or_default();
                    println!(
                        "{}. [{}] hybrid={:.3} vector={:.3} lexical={:.3}  {}",
                        i + 1,
                        c.id,
                        c.hybrid_score,
                        c.vector_score,
                        c.lexical_score,
                        title
                    );
                }
            }
        }
        Commands::Dose { query } => {
            let records: Vec<PharmaRecord> = load_records(&settings.data.pharma_path)?;
            let outcome = DoseResolver::new(&records).resolve(&query);
            println!("{}", outcome.response());
            let reference = outcome.reference();
            if !reference.is_empty() {
                println!("\n{reference}");
            }
        }
        Commands::Ask { query, domain, task, provider } => {
            if let Some(p) = provider {
                settings.llm.provider = p.into();
            }
            let service = build_service(&settings)?;
            let provider = provider_from_settings(&settings.llm)?;
            let reply = Assistant::new(&service, provider.as_ref()).ask(&query, domain, task)?;
            println!("[{}] {}", reply.category, reply.response);
            if !reply.reference.is_empty() {
                println!("\n{}", reply.reference);
            }
        }
    }
    Ok(())
}
