use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;

use crate::extractor::error::ExtractorError;

#[inline]
pub fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[inline]
pub fn capture_group_1_or_invalid_url<'a>(
    re: &Regex,
    input: &'a str,
) -> Result<&'a str, ExtractorError> {
    capture_group_1(re, input).ok_or_else(|| ExtractorError::InvalidUrl(input.to_string()))
}

/// One step into a JSON tree: an object key or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for PathSegment<'a> {
    fn from(key: &'a str) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment<'_> {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Follow `path` through `value`. Any missing key, out-of-range index or type
/// mismatch along the way yields `None`.
pub fn traverse<'v>(value: &'v Value, path: &[PathSegment<'_>]) -> Option<&'v Value> {
    path.iter().try_fold(value, |current, segment| match segment {
        PathSegment::Key(key) => current.as_object()?.get(*key),
        PathSegment::Index(index) => current.as_array()?.get(*index),
    })
}

/// Follow `path` and coerce whatever sits there. `None` when either step fails.
pub fn pick<T>(
    value: &Value,
    path: &[PathSegment<'_>],
    coerce: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    traverse(value, path).and_then(coerce)
}

/// JSON strings only; other types are not converted.
pub fn str_or_none(value: &Value) -> Option<String> {
    value.as_str().map(ToOwned::to_owned)
}

/// Integers, floats (truncated), booleans and decimal strings.
pub fn int_or_none(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

static URL_SCHEME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:https?|rt(?:m(?:pt?[es]?|fp)|sp[su]?)|mms|ftps?|wss?):)?//").unwrap()
});

/// A trimmed string that starts with a known streaming scheme (or is
/// protocol-relative).
pub fn url_or_none(value: &Value) -> Option<String> {
    let url = value.as_str()?.trim();
    URL_SCHEME_REGEX.is_match(url).then(|| url.to_owned())
}

static FRACTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[0-9]+").unwrap());

static ISO8601_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<datetime>\d{4}-\d{1,2}-\d{1,2}.\d{1,2}:\d{1,2}:\d{1,2})(?:Z|[ ]?(?P<sign>[+-])(?P<hours>\d{2}):?(?P<minutes>\d{2}))?$",
    )
    .unwrap()
});

/// Parse `YYYY-MM-DD<delimiter>HH:MM:SS` with an optional `Z` or `±HH[:]MM`
/// suffix. Fractional seconds are dropped and a missing zone means UTC.
pub fn parse_iso8601(date_str: &str, delimiter: char) -> Option<DateTime<Utc>> {
    let date_str = FRACTION_REGEX.replace_all(date_str.trim(), "");
    let caps = ISO8601_REGEX.captures(&date_str)?;

    let offset_seconds = match (caps.name("sign"), caps.name("hours"), caps.name("minutes")) {
        (Some(sign), Some(hours), Some(minutes)) => {
            let hours: i32 = hours.as_str().parse().ok()?;
            let minutes: i32 = minutes.as_str().parse().ok()?;
            let seconds = hours * 3600 + minutes * 60;
            if sign.as_str() == "-" { -seconds } else { seconds }
        }
        _ => 0,
    };

    let format = format!("%Y-%m-%d{delimiter}%H:%M:%S");
    let naive = NaiveDateTime::parse_from_str(&caps["datetime"], &format).ok()?;
    FixedOffset::east_opt(offset_seconds)?
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
