//! Domain term dictionary used to bias transcript correction.
//!
//! The dictionary is a flat JSON object mapping a phonetic reading (kana
//! spelling) to its canonical written form, e.g.
//! `{"いちがたとうにょうびょう": "1型糖尿病"}`. It is reloaded from disk on
//! every request so edits take effect without a restart. Entries keep the
//! file's order (serde_json's `preserve_order`), so the prompt's entry cap
//! takes the first entries of the file. Loading is deliberately
//! soft-failing: a missing or corrupt file yields an empty dictionary and a
//! warning, and correction proceeds without enrichment.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

/// Reading → canonical form term mapping, in file order.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<(String, String)>,
}

impl Dictionary {
    /// Load the dictionary from `path`, returning an empty mapping on any
    /// read or parse failure.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "Dictionary not loaded from {}: {} (correction proceeds without it)",
                    path.display(),
                    err
                );
                return Self::default();
            }
        };

        let map = match serde_json::from_str::<serde_json::Map<String, Value>>(&raw) {
            Ok(map) => map,
            Err(err) => {
                warn!(
                    "Dictionary at {} is not a JSON object: {} (correction proceeds without it)",
                    path.display(),
                    err
                );
                return Self::default();
            }
        };

        let mut entries = Vec::with_capacity(map.len());
        for (reading, value) in map {
            match value {
                Value::String(canonical) => entries.push((reading, canonical)),
                _ => {
                    warn!(
                        "Dictionary at {} is not a flat string map (correction proceeds without it)",
                        path.display()
                    );
                    return Self::default();
                }
            }
        }

        debug!(
            "Loaded {} dictionary entries from {}",
            entries.len(),
            path.display()
        );
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate `(reading, canonical)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[cfg(test)]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}
