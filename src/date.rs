//! Calendar date keys.
//!
//! Weather data writes dates as `YYYY-MM-DD`, crime data as `MM/DD/YYYY`,
//! and week-keyed intermediates may carry `YYYY/MM/DD`. All are parsed into a [`DateKey`], which is the only form used for
//! grouping. Parsing is deliberately permissive: any three numeric
//! components are accepted, with no range or calendar checks.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Textual layouts a date may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    Iso,
    /// `MM/DD/YYYY`
    Us,
    /// `YYYY/MM/DD`
    YearSlash,
}

impl DateFormat {
    fn separator(self) -> char {
        match self {
            DateFormat::Iso => '-',
            DateFormat::Us | DateFormat::YearSlash => '/',
        }
    }

    /// Guess the layout of `raw` from its separator and, for `/`, from
    /// whether the year leads.
    pub fn detect(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.contains('/') {
            let leading = raw.split('/').next().unwrap_or_default();
            if leading.len() == 4 {
                Some(DateFormat::YearSlash)
            } else {
                Some(DateFormat::Us)
            }
        } else if raw.contains('-') {
            Some(DateFormat::Iso)
        } else {
            None
        }
    }
}

/// A calendar date, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateKey {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

impl DateKey {
    pub fn new(year: u32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Parse `raw` laid out as `format`.
    ///
    /// Fails with [`RecordError::MalformedDate`] unless `raw` has exactly
    /// three non-empty, all-digit components.
    pub fn parse(raw: &str, format: DateFormat) -> Result<Self, RecordError> {
        let raw = raw.trim();
        let parts = raw.split(format.separator()).collect::<Vec<_>>();
        let [a, b, c] = parts.as_slice() else {
            return Err(RecordError::MalformedDate(raw.to_string()));
        };
        let (a, b, c) = (
            component(a, raw)?,
            component(b, raw)?,
            component(c, raw)?,
        );
        Ok(match format {
            DateFormat::Iso | DateFormat::YearSlash => Self::new(a, b, c),
            DateFormat::Us => Self::new(c, a, b),
        })
    }

    /// Parse `raw` in whichever layout its separator suggests.
    pub fn parse_any(raw: &str) -> Result<Self, RecordError> {
        let format = DateFormat::detect(raw)
            .ok_or_else(|| RecordError::MalformedDate(raw.trim().to_string()))?;
        Self::parse(raw, format)
    }

    /// Render the date zero-padded in `format`.
    pub fn format(&self, format: DateFormat) -> String {
        match format {
            DateFormat::Iso => format!("{:04}-{:02}-{:02}", self.year, self.month, self.day),
            DateFormat::Us => format!("{:02}/{:02}/{:04}", self.month, self.day, self.year),
            DateFormat::YearSlash => format!("{:04}/{:02}/{:02}", self.year, self.month, self.day),
        }
    }

    /// The intermediate key for this date.
    ///
    /// ISO layout, so byte order is chronological order.
    pub fn sort_key(&self) -> Bytes {
        Bytes::from(self.format(DateFormat::Iso))
    }

    /// Inverse of [`DateKey::sort_key`].
    pub fn from_sort_key(key: &[u8]) -> Result<Self, RecordError> {
        let raw = std::str::from_utf8(key)
            .map_err(|_| RecordError::MalformedDate(String::from_utf8_lossy(key).into_owned()))?;
        Self::parse(raw, DateFormat::Iso)
    }
}

/// Output rows carry `MM/DD/YYYY` dates.
impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DateFormat::Us))
    }
}

fn component(part: &str, raw: &str) -> Result<u32, RecordError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecordError::MalformedDate(raw.to_string()));
    }
    part.parse()
        .map_err(|_| RecordError::MalformedDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_layouts_into_the_same_key() {
        let iso = DateKey::parse("2018-01-02", DateFormat::Iso).unwrap();
        let us = DateKey::parse("01/02/2018", DateFormat::Us).unwrap();
        assert_eq!(iso, us);
        assert_eq!(iso, DateKey::new(2018, 1, 2));
    }

    #[test]
    fn round_trips_across_layouts() {
        for raw in ["2018-01-02", "2001-12-31", "1999-7-4", "2016-02-30"] {
            let key = DateKey::parse(raw, DateFormat::Iso).unwrap();
            let us = key.format(DateFormat::Us);
            assert_eq!(DateKey::parse(&us, DateFormat::Us).unwrap(), key);
            let iso = key.format(DateFormat::Iso);
            assert_eq!(DateKey::parse(&iso, DateFormat::Iso).unwrap(), key);
        }
    }

    #[test]
    fn renders_zero_padded() {
        let key = DateKey::parse("1/2/2018", DateFormat::Us).unwrap();
        assert_eq!(key.format(DateFormat::Us), "01/02/2018");
        assert_eq!(key.format(DateFormat::Iso), "2018-01-02");
        assert_eq!(key.to_string(), "01/02/2018");
    }

    #[test]
    fn rejects_wrong_component_count_or_non_digits() {
        for raw in ["2018-01", "2018-01-02-03", "2018--02", "2018-0a-02", "", "01/02/2018"] {
            assert!(
                matches!(
                    DateKey::parse(raw, DateFormat::Iso),
                    Err(RecordError::MalformedDate(_))
                ),
                "{raw}"
            );
        }
        assert!(DateKey::parse("-1/02/2018", DateFormat::Us).is_err());
    }

    #[test]
    fn out_of_range_components_pass_through() {
        let key = DateKey::parse("13/45/2018", DateFormat::Us).unwrap();
        assert_eq!(key, DateKey::new(2018, 13, 45));
    }

    #[test]
    fn detects_layout_from_separator() {
        assert_eq!(DateKey::parse_any(" 2018-01-02 ").unwrap(), DateKey::new(2018, 1, 2));
        assert_eq!(DateKey::parse_any("01/02/2018").unwrap(), DateKey::new(2018, 1, 2));
        assert!(DateKey::parse_any("20180102").is_err());
    }

    #[test]
    fn year_first_slashes_are_not_read_as_month_first() {
        assert_eq!(DateFormat::detect("2018/01/02"), Some(DateFormat::YearSlash));
        assert_eq!(DateFormat::detect("1/2/2018"), Some(DateFormat::Us));
        let key = DateKey::parse_any("2018/01/02").unwrap();
        assert_eq!(key, DateKey::new(2018, 1, 2));
        assert_eq!(key.sort_key(), Bytes::from("2018-01-02"));
        assert_eq!(key.format(DateFormat::YearSlash), "2018/01/02");
    }

    #[test]
    fn sort_keys_order_chronologically() {
        let mut keys = [
            DateKey::new(2018, 10, 1),
            DateKey::new(2017, 12, 31),
            DateKey::new(2018, 2, 1),
        ]
        .map(|d| d.sort_key());
        keys.sort();
        assert_eq!(DateKey::from_sort_key(&keys[0]).unwrap(), DateKey::new(2017, 12, 31));
        assert_eq!(DateKey::from_sort_key(&keys[1]).unwrap(), DateKey::new(2018, 2, 1));
        assert_eq!(DateKey::from_sort_key(&keys[2]).unwrap(), DateKey::new(2018, 10, 1));
    }
}
