//! Records that flow between stages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::date::{DateFormat, DateKey};
use crate::utils::fmt_measurement;

/// A single measurement; `None` marks a missing or unreadable value.
pub type Measurement = Option<f64>;

/// Temperature, dewpoint, windspeed and humidity, in that order.
pub type Weather = [Measurement; 4];

/// Incident counts per category bucket, see [`crate::classify::category_bucket`].
pub type CrimeCounts = [u64; 8];

/// One day of weather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherFragment {
    pub date: DateKey,
    pub weather: Weather,
}

/// One day of crime counts for a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeFragment {
    pub date: DateKey,
    pub district: u32,
    pub counts: CrimeCounts,
}

/// A value in the date co-group, tagged with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fragment {
    Weather(WeatherFragment),
    Crime(CrimeFragment),
}

/// A date that had both weather and crime data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub date: DateKey,
    pub weather: Weather,
    pub district: u32,
    pub counts: CrimeCounts,
}

impl JoinedRow {
    /// Merge the two halves of one date's co-group.
    pub fn join(weather: WeatherFragment, crime: CrimeFragment) -> Self {
        Self {
            date: weather.date,
            weather: weather.weather,
            district: crime.district,
            counts: crime.counts,
        }
    }
}

/// Running totals of one 7-row window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRow {
    pub week: u32,
    pub weather: Weather,
    pub district: u32,
    pub counts: CrimeCounts,
}

/// Mean of each weather measurement over the valid values seen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeatherMean {
    sums: [f64; 4],
    counts: [u32; 4],
}

impl WeatherMean {
    pub fn add(&mut self, weather: &Weather) {
        for (i, value) in weather.iter().enumerate() {
            if let Some(value) = value {
                self.sums[i] += value;
                self.counts[i] += 1;
            }
        }
    }

    /// Missing wherever no valid value was added.
    pub fn mean(&self) -> Weather {
        std::array::from_fn(|i| (self.counts[i] > 0).then(|| self.sums[i] / f64::from(self.counts[i])))
    }
}

fn write_weather(f: &mut fmt::Formatter<'_>, weather: &Weather) -> fmt::Result {
    for value in weather {
        write!(f, ",{}", fmt_measurement(*value))?;
    }
    Ok(())
}

fn write_counts(f: &mut fmt::Formatter<'_>, counts: &CrimeCounts) -> fmt::Result {
    for count in counts {
        write!(f, ",{count}")?;
    }
    Ok(())
}

/// `YYYY-MM-DD,Wx1,Wx2,Wx3,Wx4`
impl fmt::Display for WeatherFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.date.format(DateFormat::Iso))?;
        write_weather(f, &self.weather)
    }
}

/// `MM/DD/YYYY,District,C1..C8`
impl fmt::Display for CrimeFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.date, self.district)?;
        write_counts(f, &self.counts)
    }
}

/// `MM/DD/YYYY,Wx1..Wx4,District,C1..C8`
impl fmt::Display for JoinedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date)?;
        write_weather(f, &self.weather)?;
        write!(f, ",{}", self.district)?;
        write_counts(f, &self.counts)
    }
}

/// `WeekNumber,Wx1Avg..Wx4Avg,District,C1Sum..C8Sum`
impl fmt::Display for WeekRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.week)?;
        write_weather(f, &self.weather)?;
        write!(f, ",{}", self.district)?;
        write_counts(f, &self.counts)
    }
}
