use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod info;
mod pack;
mod unpack;

/// evtpack - Row-Oriented Event Data <-> Columnar Parquet Converter
#[derive(Parser)]
#[command(name = "evtpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a row-oriented event container to a columnar Parquet table
    Pack {
        /// Input event container file
        #[arg(short = 'i', long = "input", value_name = "INPUT")]
        input: PathBuf,

        /// Output Parquet file (default: input with a .parquet suffix)
        #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Container name inside the input file
        #[arg(short = 't', long = "container", default_value = "tree")]
        container: String,

        /// Comma-separated field subset to convert (sizing fields are kept
        /// automatically)
        #[arg(short = 'b', long = "fields", value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Compression level for ZSTD (1-22)
        #[arg(short = 'c', long, default_value = "3")]
        compression_level: i32,

        /// Row group size (rows per Parquet row group)
        #[arg(short = 'r', long, default_value = "1048576")]
        row_group_size: usize,
    },

    /// Convert one or more Parquet shards back to a row-oriented container
    Unpack {
        /// Input shard file, or directory of .parquet shards
        #[arg(short = 'i', long = "input", value_name = "INPUT")]
        input: PathBuf,

        /// Output event container file (default: input with a .json suffix)
        #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Container name to write in the output file
        #[arg(short = 't', long = "container", default_value = "tree")]
        container: String,
    },

    /// Display schema and row count of a Parquet shard
    Info {
        /// Input shard file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Pack {
            input,
            output,
            container,
            fields,
            compression_level,
            row_group_size,
        } => pack::run(
            input,
            output,
            &container,
            fields,
            compression_level,
            row_group_size,
        ),
        Commands::Unpack {
            input,
            output,
            container,
        } => unpack::run(input, output, &container),
        Commands::Info { file } => info::run(file),
    }
}
