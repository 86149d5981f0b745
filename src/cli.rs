use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(
        short,
        long,
        help = "Config file path (defaults to ./deploy.json in the working directory)"
    )]
    pub config: Option<PathBuf>,
    #[clap(long, help = "Batch window size for concurrent remote operations (default 100)")]
    pub chunk_size: Option<usize>,
    #[clap(short, long, help = "Print verbose diagnostic logs to a log file")]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[clap(about = "Generate a deploy.json config template", name = "init")]
    Init {},
}
