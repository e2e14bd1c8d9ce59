//! Query-string helpers.

use url::Url;

/// Percent-decoded value of the first `key` parameter. Blank values read as absent.
pub fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
}

/// Copy of `url` with `key` set to `value` (or removed for `None`).
///
/// Every other parameter keeps its position and value.
pub fn with_query_param(url: &Url, key: &str, value: Option<&str>) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (name, existing) in url.query_pairs() {
        if name == key {
            if !replaced {
                if let Some(value) = value {
                    pairs.push((name.into_owned(), value.to_string()));
                }
                replaced = true;
            }
            continue;
        }
        pairs.push((name.into_owned(), existing.into_owned()));
    }
    if !replaced {
        if let Some(value) = value {
            pairs.push((key.to_string(), value.to_string()));
        }
    }

    let mut next = url.clone();
    if pairs.is_empty() {
        next.set_query(None);
    } else {
        next.query_pairs_mut().clear().extend_pairs(pairs);
    }
    next
}
