use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};

/// Everything except the RFC 3986 unreserved characters. `/` is encoded too.
const STRICT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes every byte outside `A-Z a-z 0-9 - . _ ~`
#[must_use]
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, STRICT_ENCODE_SET).to_string()
}

/// Lower-cases and sorts headers, returning `(canonical_headers, signed_headers)`.
///
/// Every canonical header line ends with `\n`, including the last one. Repeated
/// names are merged into one line with their values sorted and comma-joined.
pub fn canonical_headers<'a, I>(headers: I) -> (String, String)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut sorted: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        sorted
            .entry(name.to_lowercase())
            .or_default()
            .push(value.to_lowercase());
    }

    let canonical = sorted
        .iter_mut()
        .map(|(name, values)| {
            values.sort_unstable();
            format!("{name}:{}\n", values.join(","))
        })
        .collect::<String>();
    let signed = sorted.keys().map(String::as_str).collect::<Vec<_>>().join(";");

    (canonical, signed)
}

/// Percent-encodes every key and value, sorts by encoded key then encoded value
/// and joins with `&`. Repeated keys are all kept.
pub fn canonical_query<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut sorted: Vec<(String, String)> = params
        .into_iter()
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect();
    sorted.sort_unstable();

    sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
