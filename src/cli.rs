use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "tokenmeter",
    about = "Token count and cost estimation for LLM requests",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the pricing JSON file
    #[arg(long, global = true, env = "TOKENMETER_PRICING")]
    pub pricing: Option<PathBuf>,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate tokens and cost for a single request
    #[command(alias = "e")]
    Estimate {
        /// Model identifier (e.g. openai:gpt-4o-mini)
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt text
        #[arg(long)]
        system: Option<String>,

        /// User prompt text
        #[arg(long)]
        user: Option<String>,

        /// Read the user prompt from a file
        #[arg(long, conflicts_with = "user")]
        user_file: Option<PathBuf>,

        /// Serialized tool definitions, counted as input
        #[arg(long)]
        tools_json: Option<String>,

        /// Expected output token count
        #[arg(long, default_value = "0")]
        output_tokens: u64,

        /// RAG: tokens sent to the embedding model
        #[arg(long)]
        embedding_tokens: Option<u64>,

        /// RAG: number of vectors read from the store
        #[arg(long)]
        vectors_read: Option<u64>,

        /// RAG: read fee charged per vector
        #[arg(long, default_value = "0.0")]
        vector_read_fee: f64,
    },

    /// Estimate a batch of requests from a JSON file
    #[command(alias = "b")]
    Batch {
        /// JSON file containing an array of estimation requests
        file: PathBuf,
    },

    /// List models in the pricing table
    #[command(alias = "m")]
    Models,
}
