//! Command-line interface

pub mod commands;
pub mod output;

use clap::Parser;
use commands::{PathArgs, SchedulingStrategyArg};
use std::ffi::OsString;

/// Build hashed script and style bundles
#[derive(Debug, Parser, Clone)]
#[command(name = "assetter")]
#[command(version = "0.1.0")]
#[command(about = "Builds content-hashed script and style bundles with manifests", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Optional YAML build configuration
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<String>,

    /// How the two pipelines are scheduled; overrides the config file
    #[arg(long, value_enum)]
    pub strategy: Option<SchedulingStrategyArg>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
