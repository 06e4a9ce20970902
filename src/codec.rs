//! Encoding of intermediate values.
//!
//! Keys travel as plain text so that the engine's byte-wise sort matches
//! their natural order. Values are structured and go through JSON.

use anyhow::Result;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

/// Serialize `value` into an intermediate value.
pub fn encode<T: Serialize>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

/// Deserialize an intermediate value produced by [`encode`].
pub fn decode<T: DeserializeOwned>(buf: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateKey;
    use crate::model::{CrimeFragment, Fragment, WeatherFragment};

    #[test]
    fn fragments_keep_their_source_tag() {
        let date = DateKey::new(2018, 1, 2);
        let weather = Fragment::Weather(WeatherFragment {
            date,
            weather: [Some(22.1), None, Some(15.0), Some(40.0)],
        });
        let crime = Fragment::Crime(CrimeFragment {
            date,
            district: 3,
            counts: [0, 0, 0, 0, 2, 1, 0, 0],
        });

        let decoded: Fragment = decode(&encode(&weather).unwrap()).unwrap();
        assert_eq!(decoded, weather);
        let decoded: Fragment = decode(&encode(&crime).unwrap()).unwrap();
        assert_eq!(decoded, crime);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode::<Fragment>(b"Wnot json").is_err());
    }
}
