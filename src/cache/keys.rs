//! Cache address generation for filtered resource queries

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde_json::Value;

use crate::models::{DateMode, FilterDescriptor, Scope};

/// Token under which all date-bounded entries of a scope live
pub const FILTER_TOKEN: &str = "filter";

/// An ordered sequence of tokens identifying one cached result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheAddress(Vec<String>);

impl CacheAddress {
    /// The address that matches nothing
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append one token, returning the extended address
    pub fn join(mut self, token: impl Into<String>) -> Self {
        self.0.push(token.into());
        self
    }

    /// Token-wise prefix test. An empty prefix never matches.
    pub fn starts_with(&self, prefix: &CacheAddress) -> bool {
        !prefix.is_empty() && self.0.starts_with(&prefix.0)
    }
}

impl<S: Into<String>> FromIterator<S> for CacheAddress {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for CacheAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

/// Plain key/value object embedded as a single address token
pub type KeyObject = BTreeMap<&'static str, Value>;

/// `[scope]`
pub fn root_address(scope: &Scope) -> CacheAddress {
    CacheAddress(vec![scope.root().to_string()])
}

/// `[scope, "filter"]`
pub fn filtered_address_prefix(scope: &Scope) -> CacheAddress {
    root_address(scope).join(FILTER_TOKEN)
}

/// Address of the result set described by `filter` within `scope`.
///
/// A non-empty search term wins over any date restriction. An unrecognized
/// date mode yields the empty address.
pub fn address(scope: &Scope, filter: &FilterDescriptor) -> CacheAddress {
    if let Some(term) = filter.active_search() {
        let mut object = KeyObject::new();
        object.insert("searchTerm", Value::String(term.to_string()));
        return root_address(scope).join(encode(&object));
    }

    match filter.date_mode {
        DateMode::All if scope.is_period_aware() => {
            let mut object = KeyObject::new();
            put_date_field(&mut object, filter);
            filtered_address_prefix(scope).join(encode(&object))
        }
        DateMode::All => root_address(scope),
        DateMode::Range => {
            let mut object = KeyObject::new();
            put_date(&mut object, "from", filter.from);
            put_date(&mut object, "to", filter.to);
            put_date_field(&mut object, filter);
            root_address(scope).join(encode(&object))
        }
        DateMode::Single => {
            let mut object = KeyObject::new();
            if let Some(month) = filter.month {
                object.insert("month", Value::from(month));
            }
            if let Some(year) = filter.year {
                object.insert("year", Value::from(year));
            }
            put_date_field(&mut object, filter);
            filtered_address_prefix(scope).join(encode(&object))
        }
        DateMode::Unrecognized => CacheAddress::empty(),
    }
}

/// Canonical JSON for a key object: keys in sorted order, no whitespace
pub fn encode(object: &KeyObject) -> String {
    // BTreeMap iteration is sorted, so the insertion order below is sorted
    // whether or not serde_json preserves insertion order.
    let map = object
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    Value::Object(map).to_string()
}

fn put_date(object: &mut KeyObject, key: &'static str, date: Option<NaiveDate>) {
    if let Some(date) = date {
        object.insert(key, Value::String(date.format("%Y-%m-%d").to_string()));
    }
}

fn put_date_field(object: &mut KeyObject, filter: &FilterDescriptor) {
    if let Some(field) = filter.effective_date_field().and_then(|f| f.as_str()) {
        object.insert("dateField", Value::String(field.to_string()));
    }
}
