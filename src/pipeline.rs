//! Chains of workloads run back to back.
//!
//! Each stage writes its reduce output to a directory below the pipeline's
//! output directory; the next stage reads `mr-out-*` from there.

use std::path::Path;

use anyhow::{bail, Result};
use clap::ValueEnum;
use tracing::info;

use crate::standalone::engine::{self, outputs_of};
use crate::standalone::Job;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pipeline {
    /// Raw crime export -> per-date crime vectors for one district.
    Crime,
    /// Crime vectors x daily weather -> joined daily rows.
    Daily,
    /// Crime vectors x daily weather -> joined rows -> 7-row weeks.
    Weekly,
    /// Raw crime export x raw station weather -> every stage above.
    Full,
}

impl Pipeline {
    /// What each input of the pipeline should contain, in order.
    pub fn inputs(self) -> &'static [&'static str] {
        match self {
            Pipeline::Crime => &["raw crime export"],
            Pipeline::Daily | Pipeline::Weekly => &["crime vectors", "daily weather"],
            Pipeline::Full => &["raw crime export", "raw station weather"],
        }
    }

    /// The jobs making up this pipeline, in the order they must run.
    pub fn stages(
        self,
        inputs: &[String],
        output: &str,
        args: &[String],
        n_reduce: u32,
    ) -> Result<Vec<Job>> {
        if inputs.len() != self.inputs().len() {
            bail!(
                "pipeline {:?} takes {} input(s): {}",
                self,
                self.inputs().len(),
                self.inputs().join(", ")
            );
        }
        let stage = |workload: &str, inputs: Vec<String>, output: String| Job {
            inputs,
            workload: workload.to_string(),
            output,
            args: args.to_vec(),
            n_reduce,
        };

        let jobs = match self {
            Pipeline::Crime => {
                let counts = subdir(output, "intermediate");
                vec![
                    stage("crime-count", vec![inputs[0].clone()], counts.clone()),
                    stage("crime-vector", vec![outputs_of(&counts)], subdir(output, "final")),
                ]
            }
            Pipeline::Daily => vec![stage("join", inputs.to_vec(), output.to_string())],
            Pipeline::Weekly => {
                let joined = subdir(output, "joined");
                vec![
                    stage("join", inputs.to_vec(), joined.clone()),
                    stage("rollup-week", vec![outputs_of(&joined)], subdir(output, "final")),
                ]
            }
            Pipeline::Full => {
                let counts = subdir(output, "crime-count");
                let crime = subdir(output, "crime");
                let weather = subdir(output, "weather");
                let joined = subdir(output, "joined");
                vec![
                    stage("crime-count", vec![inputs[0].clone()], counts.clone()),
                    stage("crime-vector", vec![outputs_of(&counts)], crime.clone()),
                    stage("weather-daily", vec![inputs[1].clone()], weather.clone()),
                    stage(
                        "join",
                        vec![outputs_of(&crime), outputs_of(&weather)],
                        joined.clone(),
                    ),
                    stage("rollup-week", vec![outputs_of(&joined)], subdir(output, "weekly")),
                ]
            }
        };
        Ok(jobs)
    }
}

fn subdir(output: &str, name: &str) -> String {
    Path::new(output).join(name).display().to_string()
}

/// Run every stage of `pipeline`, stopping at the first failure.
pub fn run(
    pipeline: Pipeline,
    inputs: &[String],
    output: &str,
    args: &[String],
    n_reduce: u32,
) -> Result<()> {
    let jobs = pipeline.stages(inputs, output, args, n_reduce)?;
    let total = jobs.len();
    for (i, job) in jobs.iter().enumerate() {
        info!(pipeline = ?pipeline, stage = i + 1, total, workload = %job.workload, "starting stage");
        engine::run(job)?;
    }
    Ok(())
}
