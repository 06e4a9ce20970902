//! Joins daily crime vectors with daily weather on the date.
//!
//! Inputs, in order: crime vectors (`MM/DD/YYYY,District,C1..C8`) and daily
//! weather (`YYYY-MM-DD,Wx1..Wx4`, optionally behind a header line).

use crate::codec;
use crate::extract::{extract_crime_vector, extract_weather, is_header};
use crate::model::{Fragment, JoinedRow};
use crate::utils::{string_from_bytes, string_to_bytes};
use crate::*;
use anyhow::Result;
use bytes::Bytes;
use tracing::trace;

pub fn map_crime(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let s = string_from_bytes(kv.value)?;
    let fragments = s
        .lines()
        .filter_map(|line| match extract_crime_vector(line) {
            Ok(crime) => Some(Fragment::Crime(crime)),
            Err(err) => {
                trace!(%err, "dropping crime vector");
                None
            }
        })
        .collect::<Vec<_>>();
    Ok(Box::new(fragments.into_iter().map(keyed)))
}

pub fn map_weather(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let s = string_from_bytes(kv.value)?;
    let fragments = s
        .lines()
        .enumerate()
        .filter(|(i, line)| !(*i == 0 && is_header(line, 0)))
        .filter_map(|(_, line)| match extract_weather(line) {
            Ok(weather) => Some(Fragment::Weather(weather)),
            Err(err) => {
                trace!(%err, "dropping daily weather");
                None
            }
        })
        .collect::<Vec<_>>();
    Ok(Box::new(fragments.into_iter().map(keyed)))
}

fn keyed(fragment: Fragment) -> Result<KeyValue> {
    let date = match &fragment {
        Fragment::Weather(weather) => weather.date,
        Fragment::Crime(crime) => crime.date,
    };
    Ok(KeyValue {
        key: date.sort_key(),
        value: codec::encode(&fragment)?,
    })
}

/// Merge the co-group of one date.
///
/// Each source is expected to contribute at most one fragment per date; if
/// one contributes more, the last one seen wins. Returns `None` unless both
/// sources are present.
pub fn join_fragments(fragments: impl IntoIterator<Item = Fragment>) -> Option<JoinedRow> {
    let mut weather = None;
    let mut crime = None;
    for fragment in fragments {
        match fragment {
            Fragment::Weather(fragment) => weather = Some(fragment),
            Fragment::Crime(fragment) => crime = Some(fragment),
        }
    }
    Some(JoinedRow::join(weather?, crime?))
}

pub fn reduce(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _aux: Bytes,
) -> Result<Bytes> {
    let fragments = values
        .map(|value| codec::decode::<Fragment>(&value))
        .collect::<Result<Vec<_>>>()?;
    match join_fragments(fragments) {
        Some(row) => Ok(string_to_bytes(format!("{row}\n"))),
        None => {
            trace!(date = %String::from_utf8_lossy(&key), "unmatched date");
            Ok(Bytes::new())
        }
    }
}
