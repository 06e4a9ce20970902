//! Per-day weather averages from raw hourly station observations.
//!

use crate::codec;
use crate::date::DateKey;
use crate::extract::{extract_station_weather, is_header, STATION_DATE};
use crate::model::{Weather, WeatherFragment, WeatherMean};
use crate::utils::{string_from_bytes, string_to_bytes};
use crate::*;
use anyhow::Result;
use bytes::Bytes;
use tracing::trace;

/// Emits `<date, [temperature, dewpoint, windspeed, humidity]>` per hourly
/// observation.
pub fn map(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let s = string_from_bytes(kv.value)?;
    let fragments = s
        .lines()
        .enumerate()
        .filter(|(i, line)| !(*i == 0 && is_header(line, STATION_DATE)))
        .filter_map(|(_, line)| match extract_station_weather(line) {
            Ok(fragment) => Some(fragment),
            Err(err) => {
                trace!(%err, "dropping station row");
                None
            }
        })
        .collect::<Vec<_>>();

    let iter = fragments.into_iter().map(|fragment| {
        Ok(KeyValue {
            key: fragment.date.sort_key(),
            value: codec::encode(&fragment.weather)?,
        })
    });
    Ok(Box::new(iter))
}

/// Averages each measurement over the valid observations of one day.
pub fn reduce(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _aux: Bytes,
) -> Result<Bytes> {
    let date = DateKey::from_sort_key(&key)?;
    let mut mean = WeatherMean::default();
    for value in values {
        mean.add(&codec::decode::<Weather>(&value)?);
    }
    let daily = WeatherFragment {
        date,
        weather: mean.mean(),
    };
    Ok(string_to_bytes(format!("{daily}\n")))
}
