use anyhow::{bail, Context, Result};
use bytes::Bytes;
use dashmap::DashMap;
use glob::glob;
use itertools::Itertools;
use rayon::prelude::*;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::standalone::Job;
use crate::utils::aux_from_args;
use crate::*;

// types related to this engine
type BucketIndex = u32;
type Buckets = DashMap<BucketIndex, Vec<KeyValue>>;

/// Prefix of every reduce output file.
pub const OUTPUT_PREFIX: &str = "mr-out-";

/// Glob matching the reduce output of a job written to `dir`.
pub fn outputs_of(dir: &str) -> String {
    Path::new(dir)
        .join(format!("{OUTPUT_PREFIX}*"))
        .display()
        .to_string()
}

/// Run `job` to completion: map every input, then reduce every partition.
pub fn run(job: &Job) -> Result<()> {
    let engine = workload::named(&job.workload)?;
    let serialized_args = aux_from_args(&job.args)?;
    let n_reduce = engine.partitions(job.n_reduce);
    if n_reduce != job.n_reduce {
        debug!(
            workload = %job.workload,
            requested = job.n_reduce,
            n_reduce,
            "adjusted reduce partitions"
        );
    }

    let started = Instant::now();
    info!(workload = %job.workload, inputs = ?job.inputs, output = %job.output, "map phase");
    /*  The map logic carries out mapping and also shuffle. This makes sense in
     *  the case of a standalone system.
     */
    let buckets = perform_map(job, &engine, &serialized_args, n_reduce)?;
    info!(workload = %job.workload, partitions = buckets.len(), "reduce phase");
    perform_reduce(job, &engine, &serialized_args, buckets)?;
    info!(workload = %job.workload, elapsed = ?started.elapsed(), "job complete");
    Ok(())
}

pub fn perform_map(
    job: &Job,
    engine: &Workload,
    serialized_args: &Bytes,
    num_reduce_worker: u32,
) -> Result<Buckets> {
    if job.inputs.len() != engine.map_fns.len() {
        bail!(
            "workload `{}` takes {} input(s), got {}",
            job.workload,
            engine.map_fns.len(),
            job.inputs.len()
        );
    }
    let buckets: Buckets = Buckets::new();
    // Each input dataset goes through its own map function; files within
    // a dataset are mapped in parallel.
    for (pattern, map_fn) in job.inputs.iter().zip(engine.map_fns) {
        let paths = glob(pattern)
            .with_context(|| format!("bad input pattern `{pattern}`"))?
            .flatten()
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();
        if paths.is_empty() {
            warn!(pattern = %pattern, "no input files matched");
        }
        paths.par_iter().try_for_each(|path| {
            map_file(path, *map_fn, serialized_args, num_reduce_worker, &buckets)
        })?;
    }

    Ok(buckets)
}

fn map_file(
    path: &Path,
    map_fn: MapFn,
    serialized_args: &Bytes,
    num_reduce_worker: u32,
    buckets: &Buckets,
) -> Result<()> {
    let buf = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path.to_str().unwrap_or("unknown").to_string();
    // Stores the data read from each file as <Filename, All data in file>
    let input_kv = KeyValue {
        key: Bytes::from(filename),
        value: Bytes::from(buf),
    };
    let mut emitted = 0usize;
    for item in map_fn(input_kv, serialized_args.clone())? {
        let KeyValue { key, value } = item?;
        let bucket_no = ihash(&key) % num_reduce_worker;

        #[allow(clippy::unwrap_or_default)]
        buckets
            .entry(bucket_no)
            .or_insert(Vec::new())
            .push(KeyValue { key, value });
        emitted += 1;
    }
    debug!(file = %path.display(), emitted, "mapped");
    Ok(())
}

pub fn perform_reduce(
    job: &Job,
    engine: &Workload,
    serialized_args: &Bytes,
    buckets: Buckets,
) -> Result<()> {
    let output_dir = Path::new(&job.output);
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    clear_outputs(output_dir)?;

    let reducer = engine.reducer;
    buckets
        .into_iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .try_for_each(|(reduce_id, bkt)| {
            let out_path = output_dir.join(format!("{OUTPUT_PREFIX}{reduce_id}"));
            reduce_bucket(&out_path, reducer, serialized_args, bkt)
        })
}

/// Reduce one partition into `out_path`.
///
/// The partition is written to a scratch file first and renamed into place,
/// so a rerun never leaves a half-written output behind.
fn reduce_bucket(
    out_path: &Path,
    reducer: Reducer,
    serialized_args: &Bytes,
    bkt: Vec<KeyValue>,
) -> Result<()> {
    let scratch = scratch_path(out_path);
    if let Err(err) = write_partition(&scratch, reducer, serialized_args, bkt) {
        if let Err(cleanup) = fs::remove_file(&scratch) {
            debug!(file = %scratch.display(), %cleanup, "scratch file not removed");
        }
        return Err(err);
    }
    fs::rename(&scratch, out_path)
        .with_context(|| format!("moving output into {}", out_path.display()))?;
    Ok(())
}

fn write_partition(
    scratch: &Path,
    reducer: Reducer,
    serialized_args: &Bytes,
    mut bkt: Vec<KeyValue>,
) -> Result<()> {
    let mut out_file = BufWriter::new(File::create(scratch)?);
    // stable: values of one key keep the order they were mapped in
    bkt.sort_by_key(KeyValue::key);
    let groups = bkt.into_iter().chunk_by(KeyValue::key);
    match reducer {
        Reducer::Stateless(reduce_fn) => {
            for (key, value_group) in &groups {
                let iter = value_group.map(KeyValue::into_value);
                let out = reduce_fn(key, Box::new(iter), serialized_args.clone())?;
                out_file.write_all(&out)?;
            }
        }
        Reducer::Session(new_session) => {
            let mut session = new_session(serialized_args.clone())?;
            for (key, value_group) in &groups {
                let iter = value_group.map(KeyValue::into_value);
                let out = session.reduce(key, Box::new(iter))?;
                out_file.write_all(&out)?;
            }
        }
    }
    out_file.flush()?;
    Ok(())
}

fn scratch_path(out_path: &Path) -> PathBuf {
    let name = out_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(OUTPUT_PREFIX);
    out_path.with_file_name(format!(".{name}.{}", Uuid::new_v4()))
}

/// Remove reduce output, finished or scratch, left by an earlier run of
/// the same job.
fn clear_outputs(output_dir: &Path) -> Result<()> {
    for entry in fs::read_dir(output_dir)? {
        let path = entry?.path();
        let stale = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| {
                name.strip_prefix('.')
                    .unwrap_or(name)
                    .starts_with(OUTPUT_PREFIX)
            });
        if stale && path.is_file() {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
