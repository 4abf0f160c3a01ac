//! CLI module for symgraph.
//!
//! Commands:
//! - graph: resolved forest → defs, refs, docs
//! - depresolve: project dependencies → repository targets

pub mod depresolve;
pub mod graph;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::graph::TargetEncoding;

#[derive(Parser)]
#[command(name = "symgraph")]
#[command(about = "symgraph - symbol graphs and dependency origins", long_about = None)]
pub struct Cli {
    /// Config file (missing file means defaults)
    #[arg(short, long, default_value = "symgraph.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // ─── Graph ────────────────────────────────────────────────────
    /// Emit defs, refs and docs for a resolved forest
    Graph {
        /// Forest JSON file (or - for stdin)
        forest: PathBuf,

        /// Project info JSON; attaches repository targets to external refs
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Encoding output offsets are measured in (utf-8, utf-16le, utf-16be, latin-1)
        #[arg(short, long)]
        encoding: Option<TargetEncoding>,

        /// Abort a unit after this many skipped nodes
        #[arg(long)]
        error_budget: Option<usize>,

        /// Print skipped nodes and failed units to stderr
        #[arg(long)]
        diagnostics: bool,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    // ─── Dependencies ─────────────────────────────────────────────
    /// Resolve every declared dependency to its repository
    Depresolve {
        /// Project info JSON
        project: PathBuf,

        /// Skip registry lookups
        #[arg(long)]
        offline: bool,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
}

/// Write `value` to stdout as one JSON document.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
