use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use collegeqa_core::config::BackendPreference;

#[derive(Debug, Parser)]
#[command(name = "collegeqa", about = "Answer college FAQ questions from a directory of records")]
pub struct Cli {
    /// Directory of college record JSON files (overrides data.records_dir)
    #[arg(long, global = true)]
    pub records: Option<PathBuf>,

    /// Retrieval backend to use
    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer a single question
    Query(QueryArgs),
    /// Show how a question would be routed without retrieving
    Classify {
        text: String,
    },
    /// Show corpus and backend statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Read questions from stdin until `quit` or end of input
    Interactive {
        #[arg(long)]
        top_k: Option<usize>,
    },
}

#[derive(Debug, clap::Args)]
pub struct QueryArgs {
    pub text: String,

    /// Number of results (defaults to retrieval.top_k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Print the answer and its classification as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Auto,
    Vector,
    Lexical,
}

impl From<BackendArg> for BackendPreference {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => Self::Auto,
            BackendArg::Vector => Self::Vector,
            BackendArg::Lexical => Self::Lexical,
        }
    }
}
