use clap::{Parser, Subcommand};

use crate::pipeline::Pipeline;

pub mod engine;

/// Reduce partitions used when none are requested.
pub const DEFAULT_REDUCERS: u32 = 11;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single workload
    Submit {
        /// Glob spec for the input files, once per input dataset
        #[arg(short, long, required = true)]
        input: Vec<String>,

        // Name of the workload
        #[arg(short, long)]
        workload: String,

        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Number of reduce partitions
        #[arg(short, long, default_value_t = DEFAULT_REDUCERS)]
        reducers: u32,

        /// Auxiliary arguments to pass to the MapReduce application.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
    /// Run a chain of workloads, passing intermediate output along
    Pipeline {
        /// Which chain to run
        #[arg(short, long, value_enum)]
        name: Pipeline,

        /// Glob spec for the input files, once per input dataset
        #[arg(short, long, required = true)]
        input: Vec<String>,

        /// Output directory; intermediate stages write below it
        #[arg(short, long)]
        output: String,

        /// Number of reduce partitions for stages that allow more than one
        #[arg(short, long, default_value_t = DEFAULT_REDUCERS)]
        reducers: u32,

        /// Auxiliary arguments passed to every stage, e.g. `-- --district 3`.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Job {
    pub inputs: Vec<String>,
    pub workload: String,
    pub output: String,
    pub args: Vec<String>,
    pub n_reduce: u32,
}
