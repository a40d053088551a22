//! URL and query-string helpers shared by the request builder and the
//! endpoint catalog.

use std::fmt;

use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

/// Insertion-ordered string mapping used for query strings and form bodies
///
/// Keys are unique: setting an existing key replaces its value in place, so
/// the original position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Params::set`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a value, replacing any previous value for the key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Sets a value only if the key is not present yet
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if !self.contains_key(&key) {
            self.entries.push((key, value.into()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merges `other` into `self`; values from `other` win
    pub fn merge_from(&mut self, other: &Params) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Parses an `application/x-www-form-urlencoded` string such as `a=1&b=2`
    ///
    /// Repeated keys keep the last value.
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    }

    /// Serializes as `application/x-www-form-urlencoded` (no leading `?`)
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

/// Copies every key of each object source into `target`, skipping `null`
/// values
///
/// Later sources win on collisions. Sources that are not JSON objects are
/// ignored.
pub fn merge<'a, 'b, I>(target: &'a mut Map<String, Value>, sources: I) -> &'a mut Map<String, Value>
where
    I: IntoIterator<Item = &'b Value>,
{
    for source in sources {
        let Value::Object(fields) = source else {
            continue;
        };
        for (key, value) in fields {
            if !value.is_null() {
                target.insert(key.clone(), value.clone());
            }
        }
    }
    target
}

/// Joins path segments onto `base` with exactly one `/` between each
pub fn join_path<S: AsRef<str>>(base: &str, segments: &[S]) -> String {
    let mut path = base.to_string();
    for segment in segments {
        let segment = segment.as_ref();
        let segment = segment.strip_prefix('/').unwrap_or(segment);
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(segment);
    }
    path
}

/// Merges `params` into the query string of `url`
///
/// Existing keys are overridden, not duplicated. The query component is
/// dropped entirely when the merged mapping is empty; a `#fragment` is kept.
/// `url` must be absolute.
pub fn append_query(url: &str, params: &Params) -> Result<String, url::ParseError> {
    let mut url = Url::parse(url)?;
    let mut query: Params = url.query_pairs().into_owned().collect();
    query.merge_from(params);

    if query.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(query.iter());
    }
    Ok(url.into())
}

/// Returns true if `endpoint` is a URL with a host component
pub fn is_absolute_url(endpoint: &str) -> bool {
    Url::parse(endpoint).is_ok_and(|u| u.has_host())
}

/// Expands `:name` segments of a path template
///
/// Values are percent-encoded, including `/` and `%`, so callers must pass
/// them unencoded. A name with no value becomes an empty segment.
pub fn format_endpoint(template: &str, values: &[(&str, &str)]) -> String {
    template
        .split('/')
        .map(|part| match part.strip_prefix(':') {
            Some(name) => values
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| urlencoding::encode(v).into_owned())
                .unwrap_or_default(),
            None => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
