// Intermediate representation: plot-level options and the mark list

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Insertion-ordered mapping from option name to source text.
///
/// Re-inserting an existing key replaces its value but keeps the key's
/// original position, the way assigning to an object property does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(String, String)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Data transform wrapped around a mark's options, e.g. `Plot.binX(...)`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Transform constructor identifier (`binX`, `group`, ...)
    pub name: String,
    /// Source text of the transform call's first argument
    pub transform_options: Option<String>,
    /// Dequoted property values of the transform call's second argument
    pub mark_options: OptionMap,
}

/// One visual mark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    /// Mark constructor identifier (`lineY`, `dot`, `frame`, ...)
    pub name: String,
    /// `data` plus any per-channel options; empty for zero-argument constructors
    pub options: OptionMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

impl Mark {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: OptionMap::new(),
            transform: None,
        }
    }
}

/// Everything extracted from one plot expression
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotIr {
    pub plot_options: OptionMap,
    pub marks: Vec<Mark>,
}
