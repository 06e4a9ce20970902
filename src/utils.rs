//! Utility functions shared by the workloads.
//!

use anyhow::Result;
use bytes::Bytes;
use clap::Parser;

use crate::model::Measurement;

/// Read an entire [`Bytes`] slice into a [`String`].
///
/// Returns an error if the slice contains invalid UTF-8.
pub fn string_from_bytes(buf: Bytes) -> Result<String> {
    Ok(String::from_utf8(buf.as_ref().into())?)
}

/// Convert a [`String`] to [`Bytes`].
#[inline]
pub fn string_to_bytes(s: String) -> Bytes {
    Bytes::from(s)
}

/// Parse a workload's auxiliary arguments.
///
/// `aux` is the JSON list of strings the engine serialized from the job's
/// trailing arguments. `T` should be declared with `no_binary_name = true`.
pub fn parse_aux<T: Parser>(aux: &Bytes) -> Result<T> {
    let args = if aux.is_empty() {
        Vec::new()
    } else {
        serde_json::from_slice::<Vec<String>>(aux)?
    };
    Ok(T::try_parse_from(args)?)
}

/// Serialize trailing arguments for [`parse_aux`].
pub fn aux_from_args(args: &[String]) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_string(args)?))
}

/// Render a measurement for text output.
///
/// Whole numbers keep one decimal place (`15.0`), everything else uses the
/// shortest exact form. Missing values render as `NaN`.
pub fn fmt_measurement(value: Measurement) -> String {
    match value {
        None => "NaN".to_string(),
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.1}"),
        Some(v) => format!("{v}"),
    }
}

/// Parse a measurement column written by an earlier stage.
///
/// Empty, `?` and `NaN` read as missing; infinities are treated as missing
/// too. Anything else that is not a number is `None` in the outer option.
pub fn parse_measurement(raw: &str) -> Option<Measurement> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "?" || raw.eq_ignore_ascii_case("nan") {
        return Some(None);
    }
    let value = raw.parse::<f64>().ok()?;
    Some(value.is_finite().then_some(value))
}
