//! Read-only view over configuration and plan objects
//!
//! Unknown values read as absent, so a plan that still carries `Unknown`
//! for computed attributes expands the same way as the configuration.

use std::collections::HashMap;

use tfplug::types::{Dynamic, DynamicValue};

#[derive(Debug, Clone, Copy)]
pub struct Attrs<'a> {
    map: Option<&'a HashMap<String, Dynamic>>,
}

impl<'a> Attrs<'a> {
    pub fn new(value: &'a Dynamic) -> Self {
        Self {
            map: value.as_map(),
        }
    }

    pub fn of(value: &'a DynamicValue) -> Self {
        Self::new(&value.value)
    }

    pub fn is_empty(&self) -> bool {
        self.map
            .map_or(true, |m| m.values().all(Dynamic::is_absent))
    }

    pub fn get(&self, key: &str) -> Option<&'a Dynamic> {
        self.map?.get(key).filter(|v| !v.is_absent())
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Non-empty string
    pub fn str(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(Dynamic::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// String including the empty string, for attributes where clearing matters
    pub fn raw_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Dynamic::as_str).map(str::to_string)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Dynamic::as_bool)
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.get(key)
            .and_then(Dynamic::as_number)
            .map(|n| n as i64)
    }

    pub fn list(&self, key: &str) -> &'a [Dynamic] {
        self.get(key)
            .and_then(Dynamic::as_list)
            .map_or(&[], Vec::as_slice)
    }

    /// Non-empty string elements of a list or set attribute
    pub fn strings(&self, key: &str) -> Vec<String> {
        self.list(key)
            .iter()
            .filter_map(Dynamic::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// `None` when the list is empty or absent
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        let list = self.strings(key);
        (!list.is_empty()).then_some(list)
    }

    /// The first element of a block list. Empty blocks read as absent.
    pub fn block(&self, key: &str) -> Option<Attrs<'a>> {
        self.list(key)
            .first()
            .map(Attrs::new)
            .filter(|b| !b.is_empty())
    }

    pub fn blocks(&self, key: &str) -> Vec<Attrs<'a>> {
        self.list(key)
            .iter()
            .map(Attrs::new)
            .filter(|b| !b.is_empty())
            .collect()
    }
}
