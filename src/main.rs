//! # evtpack Converter
//!
//! A command-line tool for moving row-oriented event data in and out of
//! columnar Parquet tables.
//!
//! ## Usage
//!
//! ```bash
//! # Row container to columnar Parquet
//! evtpack pack -i run0123.json -t tree
//!
//! # One or more Parquet shards back to a row container
//! evtpack unpack -i shards/ -o merged.json
//!
//! # Inspect a shard
//! evtpack info run0123.parquet
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
