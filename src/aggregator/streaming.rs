//! Single-pass aggregation driven by the JSON decoder, without building a tree.
//!
//! A chain of `DeserializeSeed`s walks the document while serde_json reads
//! it. Each facet key opens a frame on a stack. When the facet's object ends
//! the frame closes: its subtree total is recorded under its name and folded
//! into the parent frame. Memory is bounded by the nesting depth plus the
//! number of distinct names.
//!
//! Subtree totals are folded child by child in document order, which is the
//! order the recursive aggregator uses, so both strategies produce the same
//! floating-point sums.
//!
//! ```text
//! {"data": {"f1": {"f2": {"count": 5}, "f3": {}}}}
//!           open   open   set 5     close f2=5
//!                         open f3   close f3=0
//!                                   close f1=5+0
//! ```

use super::totals::FacetTotals;
use crate::utils::config::{COUNT_KEY, DATA_KEY};
use crate::utils::error::FacetError;
use log::debug;
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use std::collections::HashSet;
use std::fmt;
use std::io::{BufReader, Read};

/// A facet whose object is still open
#[derive(Debug)]
struct Frame {
    name: String,
    total: f64,
    /// Keys already seen in this facet's object
    keys: HashSet<String>,
}

/// Streaming facet aggregator
///
/// Holds the open-facet stack and the running totals. Driven by
/// [`stream_totals`].
#[derive(Debug, Default)]
pub struct StreamingAggregator {
    open: Vec<Frame>,
    /// Keys seen directly under `data`
    top_keys: HashSet<String>,
    totals: FacetTotals,
    /// Domain error behind the last decoder error, if any
    failure: Option<FacetError>,
    closed: usize,
}

impl StreamingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the object of facet `name`
    fn open_facet(&mut self, name: String) -> Result<(), FacetError> {
        if name.is_empty() {
            return Err(FacetError::parse(
                format!("{}.", self.path()),
                "facet name cannot be empty",
            ));
        }

        let keys = match self.open.last_mut() {
            Some(frame) => &mut frame.keys,
            None => &mut self.top_keys,
        };
        if !keys.insert(name.clone()) {
            return Err(FacetError::parse(
                format!("{}.{}", self.path(), name),
                format!("duplicate key `{}`", name),
            ));
        }

        self.open.push(Frame {
            name,
            total: 0.0,
            keys: HashSet::new(),
        });
        Ok(())
    }

    /// Record the count of the innermost facet, making it a leaf
    fn set_count(&mut self, count: f64) {
        if let Some(frame) = self.open.last_mut() {
            frame.total = count;
        }
    }

    /// Leave the innermost facet and fold its total into its parent
    fn close_facet(&mut self) {
        let Some(frame) = self.open.pop() else {
            return;
        };

        self.totals.add(&frame.name, frame.total);
        if let Some(parent) = self.open.last_mut() {
            parent.total += frame.total;
        }
        self.closed += 1;
    }

    /// Dotted path of the innermost open facet
    fn path(&self) -> String {
        std::iter::once(DATA_KEY)
            .chain(self.open.iter().map(|frame| frame.name.as_str()))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Keep `error` and hand the decoder an error that aborts the scan
    fn fail<E: de::Error>(&mut self, error: FacetError) -> E {
        let decoder_error = E::custom(&error);
        self.failure = Some(error);
        decoder_error
    }

    fn reject_shape<E: de::Error>(&mut self, message: impl Into<String>) -> E {
        let error = FacetError::parse(self.path(), message);
        self.fail(error)
    }

    fn reject_count<E: de::Error>(&mut self, message: impl Into<String>) -> E {
        let error = FacetError::type_error(format!("{}.{}", self.path(), COUNT_KEY), message);
        self.fail(error)
    }

    /// Totals of a completely scanned document
    pub fn finish(self) -> FacetTotals {
        debug!(
            "Streamed {} facets into {} facet totals",
            self.closed,
            self.totals.len()
        );
        self.totals
    }
}

/// The top-level `{"data": ...}` wrapper
struct DocumentSeed<'a>(&'a mut StreamingAggregator);

impl<'de> DeserializeSeed<'de> for DocumentSeed<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for DocumentSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a single `data` key")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<(), A::Error> {
        let mut seen_data = false;

        while let Some(key) = access.next_key::<String>()? {
            if key != DATA_KEY {
                return Err(de::Error::unknown_field(&key, &[DATA_KEY]));
            }
            if seen_data {
                return Err(de::Error::duplicate_field(DATA_KEY));
            }
            seen_data = true;
            access.next_value_seed(FacetSeed {
                aggregator: &mut *self.0,
                top: true,
            })?;
        }

        if !seen_data {
            return Err(de::Error::missing_field(DATA_KEY));
        }
        Ok(())
    }
}

/// The object of one facet, or the `data` object itself when `top` is set
struct FacetSeed<'a> {
    aggregator: &'a mut StreamingAggregator,
    top: bool,
}

impl FacetSeed<'_> {
    fn reject<E: de::Error>(self, found: &str) -> E {
        let what = if self.top { "`data`" } else { "facet value" };
        self.aggregator
            .reject_shape(format!("{} must be an object, found {}", what, found))
    }
}

impl<'de> DeserializeSeed<'de> for FacetSeed<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for FacetSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a facet object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<(), A::Error> {
        let aggregator = self.aggregator;
        let mut first = true;

        while let Some(key) = access.next_key::<String>()? {
            if key == COUNT_KEY {
                if self.top {
                    return Err(aggregator
                        .reject_shape("reserved key `count` cannot name a top-level facet"));
                }
                if !first {
                    return Err(aggregator.reject_shape("`count` must be the only key of a leaf facet"));
                }

                let count = access.next_value_seed(CountSeed(&mut *aggregator))?;
                aggregator.set_count(count);

                if access.next_key::<String>()?.is_some() {
                    return Err(aggregator.reject_shape("`count` must be the only key of a leaf facet"));
                }
                return Ok(());
            }

            if let Err(error) = aggregator.open_facet(key) {
                return Err(aggregator.fail(error));
            }
            access.next_value_seed(FacetSeed {
                aggregator: &mut *aggregator,
                top: false,
            })?;
            aggregator.close_facet();
            first = false;
        }

        Ok(())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<(), E> {
        Err(self.reject("boolean"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<(), E> {
        Err(self.reject("number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<(), E> {
        Err(self.reject("number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<(), E> {
        Err(self.reject("number"))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<(), E> {
        Err(self.reject("string"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        Err(self.reject("null"))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _: A) -> Result<(), A::Error> {
        Err(self.reject("array"))
    }
}

/// The value stored under `count`
struct CountSeed<'a>(&'a mut StreamingAggregator);

impl<'de> DeserializeSeed<'de> for CountSeed<'_> {
    type Value = f64;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for CountSeed<'_> {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        if !v.is_finite() {
            return Err(self.0.reject_count("count is not a finite number"));
        }
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<f64, E> {
        Err(self.0.reject_count("count must be a number, found boolean"))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<f64, E> {
        Err(self.0.reject_count("count must be a number, found string"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Err(self.0.reject_count("count must be a number, found null"))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _: A) -> Result<f64, A::Error> {
        Err(self.0.reject_count("count must be a number, found array"))
    }

    fn visit_map<A: MapAccess<'de>>(self, _: A) -> Result<f64, A::Error> {
        Err(self.0.reject_count("count must be a number, found object"))
    }
}

/// Scan `reader` once and return the facet totals
///
/// **Public** - the streaming strategy end to end
///
/// # Arguments
/// * `reader` - Raw request body; read incrementally, never buffered whole
///
/// # Errors
/// * `FacetError::Io` - Reading the input failed
/// * `FacetError::Parse` - JSON syntax error or schema violation
/// * `FacetError::Type` - Non-numeric or out-of-range `count`
pub fn stream_totals<R: Read>(reader: R) -> Result<FacetTotals, FacetError> {
    let mut aggregator = StreamingAggregator::new();
    let mut deserializer = serde_json::Deserializer::from_reader(BufReader::new(reader));

    let scanned = DocumentSeed(&mut aggregator)
        .deserialize(&mut deserializer)
        .and_then(|()| deserializer.end());

    if let Err(err) = scanned {
        return Err(aggregator.failure.take().unwrap_or_else(|| err.into()));
    }

    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(input: &str) -> Result<FacetTotals, FacetError> {
        stream_totals(input.as_bytes())
    }

    #[test]
    fn test_single_leaf() {
        let result = totals(r#"{"data": {"facet1": {"count": 3}}}"#).unwrap();
        assert_eq!(result.get("facet1"), Some(3.0));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_ancestors_accumulate() {
        let result = totals(
            r#"{"data": {"a": {"b": {"count": 2}, "c": {"count": 3}}, "d": {"count": 1}}}"#,
        )
        .unwrap();
        assert_eq!(result.get("a"), Some(5.0));
        assert_eq!(result.get("b"), Some(2.0));
        assert_eq!(result.get("c"), Some(3.0));
        assert_eq!(result.get("d"), Some(1.0));
    }

    #[test]
    fn test_frames_fold_into_parent() {
        let mut aggregator = StreamingAggregator::new();
        aggregator.open_facet("a".to_string()).unwrap();
        aggregator.open_facet("b".to_string()).unwrap();
        aggregator.set_count(2.0);
        assert_eq!(aggregator.path(), "data.a.b");

        aggregator.close_facet();
        aggregator.open_facet("c".to_string()).unwrap();
        aggregator.set_count(3.0);
        aggregator.close_facet();
        aggregator.close_facet();

        let result = aggregator.finish();
        assert_eq!(result.get("a"), Some(5.0));
        assert_eq!(result.get("b"), Some(2.0));
    }

    #[test]
    fn test_empty_data() {
        assert!(totals(r#"{"data": {}}"#).unwrap().is_empty());
    }

    #[test]
    fn test_empty_facet_reports_zero() {
        let result = totals(r#"{"data": {"empty": {}}}"#).unwrap();
        assert_eq!(result.get("empty"), Some(0.0));
    }

    #[test]
    fn test_nested_data_is_a_facet() {
        let result = totals(r#"{"data": {"data": {"count": 4}}}"#).unwrap();
        assert_eq!(result.get("data"), Some(4.0));
    }

    #[test]
    fn test_string_count_is_type_error() {
        let err = totals(r#"{"data": {"facet": {"count": "abc"}}}"#).unwrap_err();
        match err {
            FacetError::Type { location, .. } => assert_eq!(location, "data.facet.count"),
            other => panic!("expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_count_is_type_error() {
        let err = totals(r#"{"data": {"facet": {"count": 1e999}}}"#).unwrap_err();
        assert!(matches!(err, FacetError::Type { .. }));
    }

    #[test]
    fn test_duplicate_sibling_is_parse_error() {
        let err = totals(r#"{"data": {"a": {"count": 1}, "a": {"count": 2}}}"#).unwrap_err();
        match err {
            FacetError::Parse { location, .. } => assert_eq!(location, "data.a"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_same_name_in_other_scopes() {
        let result = totals(r#"{"data": {"a": {"b": {"count": 1}}, "c": {"b": {"count": 2}}}}"#)
            .unwrap();
        assert_eq!(result.get("b"), Some(3.0));
    }

    #[test]
    fn test_missing_data() {
        assert!(matches!(totals("{}"), Err(FacetError::Parse { .. })));
    }

    #[test]
    fn test_unexpected_top_level_key() {
        assert!(matches!(
            totals(r#"{"data": {}, "other": {}}"#),
            Err(FacetError::Parse { .. })
        ));
    }

    #[test]
    fn test_count_with_siblings() {
        assert!(totals(r#"{"data": {"f": {"count": 1, "g": {"count": 2}}}}"#).is_err());
        assert!(totals(r#"{"data": {"f": {"g": {"count": 2}, "count": 1}}}"#).is_err());
    }

    #[test]
    fn test_count_at_top_level() {
        assert!(matches!(
            totals(r#"{"data": {"count": 1}}"#),
            Err(FacetError::Parse { .. })
        ));
    }

    #[test]
    fn test_non_object_facet() {
        match totals(r#"{"data": {"f": 5}}"#).unwrap_err() {
            FacetError::Parse { location, .. } => assert_eq!(location, "data.f"),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(matches!(
            totals(r#"{"data": {"f": [1]}}"#),
            Err(FacetError::Parse { .. })
        ));
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(
            totals(r#"{"data": {"f": {"count": 1}"#),
            Err(FacetError::Parse { .. })
        ));
    }

    #[test]
    fn test_trailing_content() {
        assert!(matches!(
            totals(r#"{"data": {}} {}"#),
            Err(FacetError::Parse { .. })
        ));
    }
}
