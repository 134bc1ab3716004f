//! Flat facet-name -> total mapping shared by both strategies.

use std::collections::hash_map;
use std::collections::HashMap;

/// Accumulated total per facet name
///
/// Contributions under the same name are always summed, never overwritten.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetTotals {
    totals: HashMap<String, f64>,
}

impl FacetTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the entry for `name`, creating it if needed
    pub fn add(&mut self, name: &str, value: f64) {
        match self.totals.get_mut(name) {
            Some(total) => *total += value,
            None => {
                self.totals.insert(name.to_string(), value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.totals.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(name, total)| (name.as_str(), *total))
    }
}

impl IntoIterator for FacetTotals {
    type Item = (String, f64);
    type IntoIter = hash_map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.totals.into_iter()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FacetTotals {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut totals = Self::new();
        for (name, value) in iter {
            *totals.totals.entry(name.into()).or_insert(0.0) += value;
        }
        totals
    }
}
