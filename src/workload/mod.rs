//! Converts workload names to actual application code.
//!
//! # Example
//!
//! To get the date join:
//! ```
//! # use anyhow::Result;
//! use crimewx::workload;
//! # fn main() -> Result<()> {
//! let join = workload::named("join")?;
//! assert_eq!(join.map_fns.len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::{MapFn, Reducer, Workload};
use anyhow::{bail, Result};

pub mod crime;
pub mod join;
pub mod rollup;
pub mod weather;

/// Every registered workload name.
pub const NAMES: [&str; 5] = ["weather-daily", "crime-count", "crime-vector", "join", "rollup-week"];

const WEATHER_MAPS: &[MapFn] = &[weather::map];
const CRIME_COUNT_MAPS: &[MapFn] = &[crime::map_count];
const CRIME_VECTOR_MAPS: &[MapFn] = &[crime::map_vector];
// crime vectors first, daily weather second
const JOIN_MAPS: &[MapFn] = &[join::map_crime, join::map_weather];
const ROLLUP_MAPS: &[MapFn] = &[rollup::map];

/// Gets the [`Workload`] named `name`.
///
/// Returns [`None`] if no application with the given name was found.
pub fn try_named(name: &str) -> Option<Workload> {
    match name {
        "weather-daily" => Some(Workload {
            map_fns: WEATHER_MAPS,
            reducer: Reducer::Stateless(weather::reduce),
        }),
        "crime-count" => Some(Workload {
            map_fns: CRIME_COUNT_MAPS,
            reducer: Reducer::Stateless(crime::reduce_count),
        }),
        "crime-vector" => Some(Workload {
            map_fns: CRIME_VECTOR_MAPS,
            reducer: Reducer::Stateless(crime::reduce_vector),
        }),
        "join" => Some(Workload {
            map_fns: JOIN_MAPS,
            reducer: Reducer::Stateless(join::reduce),
        }),
        "rollup-week" => Some(Workload {
            map_fns: ROLLUP_MAPS,
            reducer: Reducer::Session(rollup::session),
        }),
        _ => None,
    }
}

/// Gets the [`Workload`] named `name`.
///
/// Returns an [`anyhow::Error`] if no application with the given name was found.
pub fn named(name: &str) -> Result<Workload> {
    match try_named(name) {
        Some(app) => Ok(app),
        None => bail!("No app named `{}` found. Known: {}", name, NAMES.join(", ")),
    }
}
