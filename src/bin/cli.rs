//! symgraph CLI - drives the engine end to end on JSON inputs.

use clap::Parser;
use tracing_subscriber::filter::{Directive, EnvFilter};

use symgraph::cli::{depresolve, graph, Cli, Commands};
use symgraph::SymgraphConfig;

fn main() {
    // stdout carries the JSON output; logs go to stderr.
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "symgraph=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = SymgraphConfig::load(&cli.config);

    match cli.command {
        Commands::Graph {
            forest,
            project,
            encoding,
            error_budget,
            diagnostics,
            pretty,
        } => {
            if let Some(encoding) = encoding {
                config.emitter.encoding = encoding;
            }
            if error_budget.is_some() {
                config.emitter.error_budget = error_budget;
            }
            graph::graph(&config, &forest, project.as_deref(), diagnostics, pretty)
        }

        Commands::Depresolve {
            project,
            offline,
            pretty,
        } => {
            if offline {
                config.resolver.offline = true;
            }
            depresolve::depresolve(&config, &project, pretty)
        }
    }
}
