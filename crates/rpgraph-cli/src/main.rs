//! rpgraph: reaction order, pathway similarity and node-link export for
//! pathway documents.

use std::path::Path;

use anyhow::Context;
use rpgraph_compare::{PathwayRef, SimilarityScorer};
use rpgraph_core::{MemoryProvider, RpGraphConfig};
use rpgraph_graph::{PathwayGraph, TerminalNodeClassifier};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load(path: &str) -> anyhow::Result<MemoryProvider> {
    MemoryProvider::load(Path::new(path))
        .with_context(|| format!("Failed to load pathway document {}", path))
}

fn parse_level(arg: Option<&String>, default: i32, what: &str) -> anyhow::Result<i32> {
    match arg {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid {} specificity: {}", what, value)),
        None => Ok(default),
    }
}

fn build_graph(
    config: &RpGraphConfig,
    path: &str,
    pathway_id: Option<&String>,
) -> anyhow::Result<PathwayGraph> {
    let provider = load(path)?;
    let pathway_id = pathway_id.map(String::as_str).unwrap_or(&config.pathway_id);
    let graph = PathwayGraph::build(&provider, pathway_id, config)?;
    info!(
        "Loaded {} from {}: {} species, {} reactions",
        pathway_id,
        path,
        graph.num_species(),
        graph.num_reactions()
    );
    Ok(graph)
}

fn order(config: &RpGraphConfig, args: &[String]) -> anyhow::Result<()> {
    let Some(path) = args.first() else {
        anyhow::bail!("Usage: rpgraph order <pathway.json> [pathway-id]");
    };
    let graph = build_graph(config, path, args.get(1))?;

    let outcome = graph.ordered_reactions();
    let report = serde_json::json!({
        "pathway": graph.pathway_id(),
        "order": outcome,
        "only_consumed": TerminalNodeClassifier::only_consumed(&graph, true),
        "only_produced": TerminalNodeClassifier::only_produced(&graph, true),
        "sink_species": TerminalNodeClassifier::sink_species(&graph),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn compare(config: &RpGraphConfig, args: &[String]) -> anyhow::Result<()> {
    if args.len() < 2 {
        anyhow::bail!(
            "Usage: rpgraph compare <source.json> <target.json> [species-level] [reaction-level]"
        );
    }
    let species = parse_level(args.get(2), config.species_specificity, "species")?;
    let reaction = parse_level(args.get(3), config.reaction_specificity, "reaction")?;

    let source = load(&args[0])?;
    let target = load(&args[1])?;
    let scorer = SimilarityScorer::new(config);
    let score = scorer.similarity_score(
        PathwayRef::new(&source, &config.pathway_id),
        PathwayRef::new(&target, &config.pathway_id),
        species,
        reaction,
    )?;

    let report = serde_json::json!({
        "source": args[0],
        "target": args[1],
        "species_specificity": species,
        "reaction_specificity": reaction,
        "score": score,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn export(config: &RpGraphConfig, args: &[String]) -> anyhow::Result<()> {
    let Some(path) = args.first() else {
        anyhow::bail!("Usage: rpgraph export <pathway.json> [pathway-id]");
    };
    let graph = build_graph(config, path, args.get(1))?;
    println!("{}", serde_json::to_string_pretty(&graph.export_document())?);
    Ok(())
}

fn print_help() {
    println!("rpgraph: pathway graph analysis");
    println!();
    println!("Usage: rpgraph <command> [args]");
    println!();
    println!("Commands:");
    println!("  order <pathway.json> [pathway-id]       Reconstruct the reaction order");
    println!("  compare <src.json> <dst.json> [s] [r]   Score structural similarity");
    println!("  export <pathway.json> [pathway-id]      Print the node-link document");
    println!("  help                                    Show this help message");
    println!();
    println!("Settings are read from RPGRAPH_* environment variables.");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_help();
        return Ok(());
    };

    let config = RpGraphConfig::from_env()?;
    let rest = &args[2..];

    match command.as_str() {
        "order" => order(&config, rest),
        "compare" => compare(&config, rest),
        "export" => export(&config, rest),
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}. Use 'rpgraph help' for usage.", command);
            std::process::exit(1);
        }
    }
}
