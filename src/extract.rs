//! Field extractors: one comma-separated line in, one typed record out.
//!
//! Lines are split naively on `,`. Anything that does not fit the expected
//! layout comes back as a [`RecordError`] and is dropped by the caller.

use crate::date::{DateFormat, DateKey};
use crate::error::RecordError;
use crate::model::{CrimeCounts, CrimeFragment, JoinedRow, Measurement, Weather, WeatherFragment};
use crate::utils::parse_measurement;

/// Station file columns: date, then temperature, dewpoint, windspeed and
/// humidity.
pub const STATION_DATE: usize = 5;
const STATION_MEASUREMENTS: [usize; 4] = [10, 14, 17, 16];
const STATION_MIN_FIELDS: usize = 18;

/// Tokens that only appear in header rows.
const HEADER_TOKENS: [&str; 3] = ["STATION_NAME", "STATION", "DATE"];

const CRIME_MIN_FIELDS: usize = 15;
const CRIME_DATE: usize = 2;
const CRIME_CATEGORY: usize = 5;
const CRIME_COMMUNITY: usize = 13;

/// A crime incident reduced to the columns that get counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCrimeRow {
    pub date: DateKey,
    pub category: String,
    pub community: u32,
}

fn fields(line: &str, min: usize) -> Result<Vec<&str>, RecordError> {
    let fields = line.split(',').collect::<Vec<_>>();
    if fields.len() < min {
        return Err(RecordError::TooFewFields {
            expected: min,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Whether `line` is a header row, judged by its date column at `key_index`.
pub fn is_header(line: &str, key_index: usize) -> bool {
    let key = line.split(',').nth(key_index).unwrap_or_default().trim();
    let key = key.trim_matches('"');
    !key.starts_with(|c: char| c.is_ascii_digit())
        || HEADER_TOKENS.iter().any(|token| key.contains(token))
}

fn measurement(raw: &str, field: &'static str) -> Result<Measurement, RecordError> {
    parse_measurement(raw).ok_or_else(|| RecordError::invalid(field, raw))
}

fn count<T: std::str::FromStr>(raw: &str, field: &'static str) -> Result<T, RecordError> {
    raw.trim()
        .parse()
        .map_err(|_| RecordError::invalid(field, raw))
}

fn weather_columns(raw: &[&str]) -> Result<Weather, RecordError> {
    Ok([
        measurement(raw[0], "temperature")?,
        measurement(raw[1], "dewpoint")?,
        measurement(raw[2], "windspeed")?,
        measurement(raw[3], "humidity")?,
    ])
}

fn count_columns(raw: &[&str]) -> Result<CrimeCounts, RecordError> {
    let mut counts = CrimeCounts::default();
    for (slot, raw) in counts.iter_mut().zip(raw) {
        *slot = count(raw, "category count")?;
    }
    Ok(counts)
}

/// Daily weather: `YYYY-MM-DD,Wx1,Wx2,Wx3,Wx4`.
pub fn extract_weather(line: &str) -> Result<WeatherFragment, RecordError> {
    let fields = fields(line, 5)?;
    Ok(WeatherFragment {
        date: DateKey::parse_any(fields[0])?,
        weather: weather_columns(&fields[1..5])?,
    })
}

/// One hourly observation from a raw station file.
///
/// Every character other than digits, `.` and `-` is stripped from each
/// measurement column (flags like `s` or `V` trail the values). A column
/// left without a readable number is missing.
pub fn extract_station_weather(line: &str) -> Result<WeatherFragment, RecordError> {
    if line.contains(HEADER_TOKENS[0]) {
        return Err(RecordError::HeaderLine);
    }
    let fields = fields(line, STATION_MIN_FIELDS)?;
    let date = fields[STATION_DATE]
        .split_whitespace()
        .next()
        .ok_or(RecordError::MissingField("date"))?;
    let date = DateKey::parse_any(date)?;
    let weather = STATION_MEASUREMENTS.map(|index| {
        let stripped = fields[index]
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect::<String>();
        stripped.parse::<f64>().ok().filter(|v| v.is_finite())
    });
    Ok(WeatherFragment { date, weather })
}

/// One incident from the raw crime export.
pub fn extract_crime(line: &str) -> Result<RawCrimeRow, RecordError> {
    let fields = fields(line, CRIME_MIN_FIELDS)?;
    let community = fields[CRIME_COMMUNITY];
    let category = fields[CRIME_CATEGORY].trim();
    if community.is_empty() {
        return Err(RecordError::MissingField("community"));
    }
    if category.is_empty() {
        return Err(RecordError::MissingField("category"));
    }
    if !community.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecordError::invalid("community", community));
    }
    // "01/02/2018 10:00:00 PM"
    let date = fields[CRIME_DATE].split(' ').next().unwrap_or_default();
    Ok(RawCrimeRow {
        date: DateKey::parse(date, DateFormat::Us)?,
        category: category.to_string(),
        community: count(community, "community")?,
    })
}

/// Per-date crime vector: `MM/DD/YYYY,District,C1..C8`.
pub fn extract_crime_vector(line: &str) -> Result<CrimeFragment, RecordError> {
    let fields = fields(line, 10)?;
    Ok(CrimeFragment {
        date: DateKey::parse_any(fields[0])?,
        district: count(fields[1], "district")?,
        counts: count_columns(&fields[2..10])?,
    })
}

/// Joined daily row: `MM/DD/YYYY,Wx1..Wx4,District,C1..C8`.
pub fn extract_joined(line: &str) -> Result<JoinedRow, RecordError> {
    let fields = fields(line, 14)?;
    Ok(JoinedRow {
        date: DateKey::parse_any(fields[0])?,
        weather: weather_columns(&fields[1..5])?,
        district: count(fields[5], "district")?,
        counts: count_columns(&fields[6..14])?,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn extracts_station_measurements_by_position() {
        let line = station_line("2018-01-02 00:51", ["22.1", "30.5", "15.0", "40.0"]);
        let fragment = extract_station_weather(&line).unwrap();
        assert_eq!(fragment.date, DateKey::new(2018, 1, 2));
        assert_eq!(fragment.weather, [Some(22.1), Some(30.5), Some(15.0), Some(40.0)]);
    }

    #[test]
    fn strips_flags_and_marks_empty_columns_missing() {
        let line = station_line("2018-01-02 01:51", ["-3s", "", "VRB", "81*"]);
        let fragment = extract_station_weather(&line).unwrap();
        assert_eq!(fragment.weather, [Some(-3.0), None, None, Some(81.0)]);
    }

    #[test]
    fn station_header_and_short_rows_are_rejected() {
        assert_eq!(
            extract_station_weather(STATION_HEADER),
            Err(RecordError::HeaderLine)
        );
        assert!(is_header(STATION_HEADER, STATION_DATE));
        assert!(matches!(
            extract_station_weather("a,b,c"),
            Err(RecordError::TooFewFields { .. })
        ));
    }

    #[test]
    fn extracts_daily_weather() {
        let fragment = extract_weather("2018-01-02,22.1,30.5,15.0,NaN").unwrap();
        assert_eq!(fragment.date, DateKey::new(2018, 1, 2));
        assert_eq!(fragment.weather, [Some(22.1), Some(30.5), Some(15.0), None]);
        assert!(extract_weather("2018-01-02,22.1,30.5,15.0").is_err());
        assert!(extract_weather("2018-01-02,22.1,warm,15.0,40.0").is_err());
        assert!(is_header("DATE,temp,dew,wind,humidity", 0));
        assert!(!is_header("2018-01-02,22.1,30.5,15.0,40.0", 0));
    }

    #[test]
    fn extracts_crime_row() {
        let line = crime_line("01/02/2018 10:00:00 PM", " BURGLARY ", "16");
        let row = extract_crime(&line).unwrap();
        assert_eq!(
            row,
            RawCrimeRow {
                date: DateKey::new(2018, 1, 2),
                category: "BURGLARY".to_string(),
                community: 16,
            }
        );
    }

    #[test]
    fn short_crime_rows_are_rejected() {
        let line = vec!["x"; 14].join(",");
        assert_eq!(
            extract_crime(&line),
            Err(RecordError::TooFewFields {
                expected: 15,
                found: 14
            })
        );
    }

    #[test]
    fn crime_rows_need_a_numeric_community_and_a_category() {
        let date = "01/02/2018 10:00:00 PM";
        assert!(extract_crime(&crime_line(date, "THEFT", "")).is_err());
        assert!(extract_crime(&crime_line(date, "THEFT", "1a")).is_err());
        assert!(extract_crime(&crime_line(date, "  ", "16")).is_err());
        assert!(matches!(
            extract_crime(&crime_line("2018/01", "THEFT", "16")),
            Err(RecordError::MalformedDate(_))
        ));
    }

    #[test]
    fn extracts_crime_vector_and_joined_rows() {
        let crime = extract_crime_vector("01/02/2018,3,0,0,0,0,2,1,0,0").unwrap();
        assert_eq!(crime.district, 3);
        assert_eq!(crime.counts, [0, 0, 0, 0, 2, 1, 0, 0]);
        assert!(extract_crime_vector("01/02/2018,3,0,0").is_err());

        let joined = extract_joined("01/02/2018,22.1,30.5,15.0,40.0,3,0,0,0,0,2,1,0,0").unwrap();
        assert_eq!(joined.to_string(), "01/02/2018,22.1,30.5,15.0,40.0,3,0,0,0,0,2,1,0,0");
    }

    #[test]
    fn year_first_slash_dates_keep_their_year() {
        let joined = extract_joined("2018/01/02,22.1,30.5,15.0,40.0,3,0,0,0,0,2,1,0,0").unwrap();
        assert_eq!(joined.date, DateKey::new(2018, 1, 2));
        assert_eq!(joined.to_string(), "01/02/2018,22.1,30.5,15.0,40.0,3,0,0,0,0,2,1,0,0");

        let crime = extract_crime_vector("2018/01/02,3,0,0,0,0,2,1,0,0").unwrap();
        assert_eq!(crime.date.sort_key(), bytes::Bytes::from("2018-01-02"));
    }
}
