use anyhow::*;
use clap::Parser;
use crimewx::pipeline;
use crimewx::standalone::{engine, Args, Commands, Job};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    match args.command {
        Commands::Submit {
            input,
            workload,
            output,
            reducers,
            args,
        } => engine::run(&Job {
            inputs: input,
            workload,
            output,
            args,
            n_reduce: reducers,
        }),
        Commands::Pipeline {
            name,
            input,
            output,
            reducers,
            args,
        } => pipeline::run(name, &input, &output, &args, reducers),
    }
}
