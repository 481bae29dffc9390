//! Airport and airline resolution against reference lists.
//!
//! Matching goes from strict to loose: exact name, code, substring, and
//! finally a placeholder that carries only the display name so user input is
//! never dropped.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirportOption {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub country: Option<String>,
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirlineOption {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
}

/// Reference data supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceLookups {
    pub airports: Vec<AirportOption>,
    pub airlines: Vec<AirlineOption>,
}

/// How a display name was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMatch {
    Exact,
    Code,
    Partial,
    /// Nothing matched; the option carries only the display name.
    Placeholder,
}

impl LookupMatch {
    pub fn is_resolved(self) -> bool {
        self != LookupMatch::Placeholder
    }
}

/// Entries that can be resolved by name or code.
pub trait LookupEntry: Clone {
    fn display_name(&self) -> &str;
    fn code(&self) -> Option<&str>;
    fn placeholder(display_name: &str) -> Self;
}

impl LookupEntry for AirportOption {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn placeholder(display_name: &str) -> Self {
        AirportOption {
            name: display_name.to_string(),
            ..Default::default()
        }
    }
}

impl LookupEntry for AirlineOption {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn placeholder(display_name: &str) -> Self {
        AirlineOption {
            name: display_name.to_string(),
            ..Default::default()
        }
    }
}

/// Resolve `display_name` against `entries`.
///
/// Blank names resolve to `None`. Anything else resolves to an entry, possibly
/// a [`LookupMatch::Placeholder`].
pub fn resolve<T: LookupEntry>(display_name: Option<&str>, entries: &[T]) -> Option<(T, LookupMatch)> {
    let query = display_name.map(str::trim).filter(|name| !name.is_empty())?;
    let query_lower = query.to_lowercase();

    if let Some(entry) = entries
        .iter()
        .find(|entry| entry.display_name().trim().to_lowercase() == query_lower)
    {
        return Some((entry.clone(), LookupMatch::Exact));
    }

    if let Some(code) = code_in_query(query) {
        if let Some(entry) = entries.iter().find(|entry| {
            entry
                .code()
                .is_some_and(|candidate| candidate.trim().eq_ignore_ascii_case(code))
        }) {
            return Some((entry.clone(), LookupMatch::Code));
        }
    }

    if let Some(entry) = entries.iter().find(|entry| {
        let name = entry.display_name().trim().to_lowercase();
        !name.is_empty() && (name.contains(&query_lower) || query_lower.contains(&name))
    }) {
        return Some((entry.clone(), LookupMatch::Partial));
    }

    Some((T::placeholder(query), LookupMatch::Placeholder))
}

pub fn resolve_airport(
    display_name: Option<&str>,
    lookups: &ReferenceLookups,
) -> Option<(AirportOption, LookupMatch)> {
    resolve(display_name, &lookups.airports)
}

pub fn resolve_airline(
    display_name: Option<&str>,
    lookups: &ReferenceLookups,
) -> Option<(AirlineOption, LookupMatch)> {
    resolve(display_name, &lookups.airlines)
}

/// A code embedded in the query: the whole query when it looks like one
/// (`"JFK"`, `"B6"`), or the last parenthesised token (`"Logan (BOS)"`).
fn code_in_query(query: &str) -> Option<&str> {
    if let (Some(open), Some(close)) = (query.rfind('('), query.rfind(')')) {
        if open < close {
            let inner = query[open + 1..close].trim();
            if looks_like_code(inner) {
                return Some(inner);
            }
        }
    }
    looks_like_code(query).then_some(query)
}

fn looks_like_code(text: &str) -> bool {
    (2..=4).contains(&text.len()) && text.chars().all(|ch| ch.is_ascii_alphanumeric())
}
