//! Crime tallies per date for one district, in two stages.
//!
//! `crime-count` counts incidents per (date, category); `crime-vector`
//! folds those counts into the eight category buckets of a date. Both take
//! the district as an auxiliary argument: `-- --district N`.

use crate::classify::{category_bucket, is_primary, District};
use crate::codec;
use crate::date::{DateFormat, DateKey};
use crate::extract::extract_crime;
use crate::model::{CrimeCounts, CrimeFragment};
use crate::utils::{parse_aux, string_from_bytes, string_to_bytes};
use crate::*;
use anyhow::{anyhow, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Parser, Debug, Serialize, Deserialize)]
#[clap(no_binary_name = true)]
struct Args {
    /// District whose communities are counted; echoed into every row.
    #[clap(short, long, value_parser)]
    district: u32,
}

/// The count of one category on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CategoryCount {
    category: String,
    count: u64,
}

/// Emits `<date,category, 1>` for every primary-category incident inside
/// the configured district.
pub fn map_count(kv: KeyValue, aux: Bytes) -> MapOutput {
    let args = parse_aux::<Args>(&aux)?;
    let district = District::from_config(args.district);

    let s = string_from_bytes(kv.value)?;
    let keys = s
        .lines()
        .filter_map(|line| match extract_crime(line) {
            Ok(row) => Some(row),
            Err(err) => {
                trace!(%err, "dropping crime row");
                None
            }
        })
        .filter(|row| is_primary(&row.category) && district.contains(row.community))
        .map(|row| format!("{},{}", row.date.format(DateFormat::Iso), row.category))
        .collect::<Vec<_>>();

    let mut value_buf = BytesMut::with_capacity(keys.len() * 8);
    let iter = keys.into_iter().map(move |key| {
        value_buf.put_u64(1);
        Ok(KeyValue {
            key: string_to_bytes(key),
            value: value_buf.split().freeze(),
        })
    });
    Ok(Box::new(iter))
}

/// Sums the incidents of one (date, category) into `MM/DD/YYYY,CATEGORY,count`.
pub fn reduce_count(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _aux: Bytes,
) -> Result<Bytes> {
    let count: u64 = values.map(|mut value| value.get_u64()).sum();

    let key = string_from_bytes(key)?;
    let (date, category) = key
        .split_once(',')
        .ok_or_else(|| anyhow!("malformed count key `{key}`"))?;
    let date = DateKey::parse(date, DateFormat::Iso)?;

    let mut writer = BytesMut::with_capacity(key.len() + 16);
    writer.put(format!("{date},{category},{count}\n").as_bytes());
    Ok(writer.freeze())
}

/// Re-keys `MM/DD/YYYY,CATEGORY,count` lines by date alone.
pub fn map_vector(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let s = string_from_bytes(kv.value)?;
    let counts = s
        .lines()
        .filter_map(|line| match parse_category_count(line) {
            Some(parsed) => Some(parsed),
            None => {
                trace!(line, "dropping category count");
                None
            }
        })
        .collect::<Vec<_>>();

    let iter = counts.into_iter().map(|(date, count)| {
        Ok(KeyValue {
            key: date.sort_key(),
            value: codec::encode(&count)?,
        })
    });
    Ok(Box::new(iter))
}

fn parse_category_count(line: &str) -> Option<(DateKey, CategoryCount)> {
    let (date, rest) = line.split_once(',')?;
    let (category, count) = rest.rsplit_once(',')?;
    let date = DateKey::parse_any(date).ok()?;
    let count = count.trim().parse().ok()?;
    Some((
        date,
        CategoryCount {
            category: category.trim().to_string(),
            count,
        },
    ))
}

/// Folds every category count of a date into `MM/DD/YYYY,District,C1..C8`.
pub fn reduce_vector(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    aux: Bytes,
) -> Result<Bytes> {
    let args = parse_aux::<Args>(&aux)?;
    let date = DateKey::from_sort_key(&key)?;

    let mut counts = CrimeCounts::default();
    for value in values {
        let CategoryCount { category, count } = codec::decode(&value)?;
        counts[category_bucket(&category)] += count;
    }

    let fragment = CrimeFragment {
        date,
        district: args.district,
        counts,
    };
    Ok(string_to_bytes(format!("{fragment}\n")))
}
