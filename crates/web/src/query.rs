//! Query-string and urlencoded form parsing.

use std::collections::HashMap;

use tracing::warn;

/// Parsed `key=value` pairs, every key keeping its values in arrival order.
pub type QueryValues = HashMap<String, Vec<String>>;

/// Turns a raw query string (without the leading `?`) into [`QueryValues`].
///
/// The dispatcher hands one parser to every request context; a context calls it at
/// most once per request and caches the result.
pub trait QueryParser: Send + Sync {
    fn parse(&self, raw: &str) -> QueryValues;
}

/// The default parser, backed by `serde_urlencoded`.
///
/// Malformed input yields an empty mapping.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlEncodedQueryParser;

impl QueryParser for UrlEncodedQueryParser {
    fn parse(&self, raw: &str) -> QueryValues {
        match parse_urlencoded(raw.as_bytes()) {
            Ok(values) => values,
            Err(e) => {
                warn!(cause = %e, raw, "can't parse query string");
                QueryValues::new()
            }
        }
    }
}

pub(crate) fn parse_urlencoded(input: &[u8]) -> Result<QueryValues, serde_urlencoded::de::Error> {
    let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(input)?;
    let mut values = QueryValues::new();
    append_pairs(&mut values, pairs);
    Ok(values)
}

pub(crate) fn append_pairs(values: &mut QueryValues, pairs: impl IntoIterator<Item = (String, String)>) {
    for (key, value) in pairs {
        values.entry(key).or_default().push(value);
    }
}
