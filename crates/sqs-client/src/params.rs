//! Request parameters and their canonical form.
//!
//! [`Params`] is the mutable, multi-valued parameter mapping that operations
//! build up. Signing freezes it into [`SignedParams`], which can be encoded
//! for the wire but no longer changed.

use std::collections::BTreeMap;

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;

pub(crate) const SIGNATURE: &str = "Signature";

/// Ordered-key, multi-valued request parameter mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, Vec<String>>,
}

impl Params {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to a single value, replacing any existing values
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// Append a value to `key`
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Builder-style variant of [`Params::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `key`
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove `key` and return its values
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over every `(key, value)` pair in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v.as_str())))
    }

    /// Canonical query string used as signing input.
    ///
    /// Every `key=value` pair (one per value) is percent-encoded, leaving only
    /// `A-Z a-z 0-9 - _ . ~` untouched, then the encoded pairs are sorted as
    /// plain byte strings and joined with `&`.
    pub fn canonical_query_string(&self) -> String {
        let mut pairs: Vec<String> = self
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        pairs.sort_unstable();
        pairs.join("&")
    }

    /// `application/x-www-form-urlencoded` form of the parameters
    pub fn form_encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.add(key, value);
        }
        params
    }
}

/// Parameters that carry a signature.
///
/// There is no way to mutate a `SignedParams`. Changing a parameter means
/// calling [`SignedParams::into_unsigned`] and signing the result again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParams {
    inner: Params,
}

impl SignedParams {
    pub(crate) fn new(inner: Params) -> Self {
        Self { inner }
    }

    /// Read-only view of the signed parameters
    pub fn params(&self) -> &Params {
        &self.inner
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key)
    }

    /// The computed signature
    pub fn signature(&self) -> Option<&str> {
        self.inner.get(SIGNATURE)
    }

    pub fn form_encode(&self) -> String {
        self.inner.form_encode()
    }

    /// Drop the signature and return the parameters for modification
    pub fn into_unsigned(self) -> Params {
        let mut params = self.inner;
        params.remove(SIGNATURE);
        params
    }
}
