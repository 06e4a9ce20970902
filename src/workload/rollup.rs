//! Rolls joined daily rows up into consecutive 7-row weeks.
//!
//! Weeks are counted in rows, not calendar weeks: the first seven joined
//! rows are week 1, the next seven week 2, and so on. Every row produces a
//! snapshot of its week so far. The reducer is a [`ReduceSession`], so the
//! engine feeds it every date of the run, in order, from one partition.

use crate::codec;
use crate::extract::extract_joined;
use crate::model::{CrimeCounts, JoinedRow, WeatherMean, WeekRow};
use crate::utils::string_from_bytes;
use crate::*;
use anyhow::Result;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

pub const WEEK_LENGTH: u32 = 7;

/// Running totals of the current week.
#[derive(Debug, Clone)]
pub struct WeekRollup {
    week: u32,
    days_seen: u32,
    weather: WeatherMean,
    crime: CrimeCounts,
    district: u32,
}

impl Default for WeekRollup {
    fn default() -> Self {
        Self::new()
    }
}

impl WeekRollup {
    pub fn new() -> Self {
        Self {
            week: 1,
            days_seen: 0,
            weather: WeatherMean::default(),
            crime: CrimeCounts::default(),
            district: 0,
        }
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Add `row` to the current week and return the week's snapshot.
    ///
    /// A row arriving after seven have been taken opens the next week.
    pub fn push(&mut self, row: &JoinedRow) -> WeekRow {
        if self.days_seen == WEEK_LENGTH {
            debug!(week = self.week, "week complete");
            self.week += 1;
            self.days_seen = 0;
            self.weather = WeatherMean::default();
            self.crime = CrimeCounts::default();
        }
        self.weather.add(&row.weather);
        for (sum, count) in self.crime.iter_mut().zip(row.counts) {
            *sum += count;
        }
        self.district = row.district;
        self.days_seen += 1;

        WeekRow {
            week: self.week,
            weather: self.weather.mean(),
            district: self.district,
            counts: self.crime,
        }
    }
}

impl ReduceSession for WeekRollup {
    fn reduce(
        &mut self,
        _key: Bytes,
        values: Box<dyn Iterator<Item = Bytes> + '_>,
    ) -> Result<Bytes> {
        let mut writer = BytesMut::new();
        for value in values {
            let row = codec::decode::<JoinedRow>(&value)?;
            writer.put(format!("{}\n", self.push(&row)).as_bytes());
        }
        Ok(writer.freeze())
    }
}

/// Keys joined rows by date so they reach the session in date order.
pub fn map(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let s = string_from_bytes(kv.value)?;
    let rows = s
        .lines()
        .filter_map(|line| match extract_joined(line) {
            Ok(row) => Some(row),
            Err(err) => {
                trace!(%err, "dropping joined row");
                None
            }
        })
        .collect::<Vec<_>>();

    let iter = rows.into_iter().map(|row| {
        Ok(KeyValue {
            key: row.date.sort_key(),
            value: codec::encode(&row)?,
        })
    });
    Ok(Box::new(iter))
}

pub fn session(_aux: Bytes) -> Result<Box<dyn ReduceSession>> {
    Ok(Box::new(WeekRollup::new()))
}
