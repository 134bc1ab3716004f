//! Wire schema for facet requests and responses.
//!
//! Input:  `{"data": {"facet1": {"facet2": {"count": 10}}}}`
//! Output: `{"result": [{"facet1": 10}, {"facet2": 10}]}`

use crate::utils::config::DATA_KEY;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Largest magnitude at which every integer is exactly representable in f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// Top-level request document
///
/// `data` must be present and must be an object; any other top-level key
/// is rejected, and so is a repeated key in any object of the document.
#[derive(Debug, Clone)]
pub struct FacetRequest {
    pub data: Map<String, Value>,
}

impl<'de> Deserialize<'de> for FacetRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RequestVisitor)
    }
}

struct RequestVisitor;

impl<'de> Visitor<'de> for RequestVisitor {
    type Value = FacetRequest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a single `data` key")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FacetRequest, A::Error> {
        let mut data = None;

        while let Some(key) = access.next_key::<String>()? {
            if key != DATA_KEY {
                return Err(de::Error::unknown_field(&key, &[DATA_KEY]));
            }
            if data.is_some() {
                return Err(de::Error::duplicate_field(DATA_KEY));
            }
            data = Some(access.next_value::<UniqueObject>()?.0);
        }

        data.map(|data| FacetRequest { data })
            .ok_or_else(|| de::Error::missing_field(DATA_KEY))
    }
}

/// JSON object whose keys are unique at every depth
///
/// `serde_json::Map` keeps the last of two equal keys; facet documents
/// treat a repeated key as malformed instead.
struct UniqueObject(Map<String, Value>);

impl<'de> Deserialize<'de> for UniqueObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(UniqueVisitor).and_then(|value| match value {
            Value::Object(map) => Ok(UniqueObject(map)),
            _ => Err(de::Error::custom("expected an object")),
        })
    }
}

/// Any JSON value, with [`UniqueObject`] rules applied to nested objects
struct UniqueValue(Value);

impl<'de> Deserialize<'de> for UniqueValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UniqueVisitor).map(UniqueValue)
    }
}

struct UniqueVisitor;

impl<'de> Visitor<'de> for UniqueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(UniqueValue(item)) = access.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key `{}`", key)));
            }
            let UniqueValue(value) = access.next_value()?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

/// Top-level response document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetResponse {
    pub result: Vec<FacetEntry>,
}

/// One `{name: total}` element of the result array
///
/// Serializes as a single-entry JSON object. Totals without a fractional
/// part are written as JSON integers so that `100.0` renders as `100`.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetEntry {
    pub name: String,
    pub total: f64,
}

impl FacetEntry {
    pub fn new(name: impl Into<String>, total: f64) -> Self {
        Self {
            name: name.into(),
            total,
        }
    }
}

impl Serialize for FacetEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &TotalValue(self.total))?;
        map.end()
    }
}

/// Serializes a total as an integer when that is lossless
struct TotalValue(f64);

impl Serialize for TotalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
            serializer.serialize_i64(value as i64)
        } else {
            serializer.serialize_f64(value)
        }
    }
}
