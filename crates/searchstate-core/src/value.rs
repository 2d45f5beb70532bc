//! Search value model.
//!
//! A query string decodes into a [`SearchMap`]: an order-irrelevant mapping
//! from string keys to loosely-typed [`SearchValue`]s (strings, numbers,
//! booleans, null, nested objects and arrays).
//!
//! ## Shared containers
//!
//! Containers (`String`, `Array`, `Object`) are `Rc`-backed so that the
//! structural differ can reuse unchanged subtrees *by reference* across
//! snapshot transitions. Two values are structurally equal via `PartialEq`;
//! two values are *identical* when they share the same allocation (see
//! [`SearchValue::same_allocation`]).
//!
//! ## `Undefined` vs `Null`
//!
//! `Undefined` models the transient "cleared" state a key passes through
//! during partial updates and `merge: false` navigation. It is stripped by
//! [`clean_search_map`](crate::clean_search_map) before a search string is
//! built and is never produced by decoding. `Null` is a real value and
//! round-trips through the URL.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::Number;

/// Order-irrelevant mapping from param names to [`SearchValue`]s.
pub type SearchMap = BTreeMap<String, SearchValue>;

/// An immutable, shared snapshot of a decoded search mapping.
///
/// Identity (`Rc::ptr_eq`) changes only when structural content changes;
/// consumers keyed on identity can skip work when handed the same snapshot.
pub type Snapshot = Rc<SearchMap>;

/// A loosely-typed search param value.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchValue {
	/// Absent-but-mentioned. Stripped before encoding; never decoded.
	Undefined,
	/// JSON `null`.
	Null,
	Bool(bool),
	Number(Number),
	String(Rc<str>),
	Array(Rc<Vec<SearchValue>>),
	Object(Rc<SearchMap>),
}

impl SearchValue {
	/// Whether this value is [`SearchValue::Undefined`].
	pub fn is_undefined(&self) -> bool {
		matches!(self, Self::Undefined)
	}

	/// Whether this value is a primitive (not an array or object).
	pub fn is_primitive(&self) -> bool {
		!matches!(self, Self::Array(_) | Self::Object(_))
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Number(n) => n.as_i64(),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(n) => n.as_f64(),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[SearchValue]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&SearchMap> {
		match self {
			Self::Object(map) => Some(map),
			_ => None,
		}
	}

	/// Whether `self` and `other` are the *same* value, not merely equal.
	///
	/// Containers compare by allocation; primitives — strings included —
	/// fall back to value equality (primitives carry no identity, matching
	/// how reference equality behaves for them in dynamic runtimes).
	pub fn same_allocation(&self, other: &SearchValue) -> bool {
		match (self, other) {
			(Self::String(a), Self::String(b)) => Rc::ptr_eq(a, b) || a == b,
			(Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
			(Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
			(a, b) => a == b,
		}
	}

	/// Converts a `serde_json::Value` into a `SearchValue`.
	///
	/// Integral floats are normalized to the integer representation so that
	/// `2.0` and `2` encode identically.
	pub fn from_json(value: serde_json::Value) -> SearchValue {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(b) => Self::Bool(b),
			serde_json::Value::Number(n) => Self::Number(normalize_number(n)),
			serde_json::Value::String(s) => Self::String(Rc::from(s)),
			serde_json::Value::Array(items) => {
				Self::Array(Rc::new(items.into_iter().map(Self::from_json).collect()))
			}
			serde_json::Value::Object(entries) => Self::Object(Rc::new(
				entries
					.into_iter()
					.map(|(k, v)| (k, Self::from_json(v)))
					.collect(),
			)),
		}
	}

	/// Converts into a `serde_json::Value`.
	///
	/// Returns `None` for `Undefined`. Inside containers, JSON semantics
	/// apply: object entries holding `Undefined` are dropped, array elements
	/// holding `Undefined` become `null`.
	pub fn to_json(&self) -> Option<serde_json::Value> {
		match self {
			Self::Undefined => None,
			Self::Null => Some(serde_json::Value::Null),
			Self::Bool(b) => Some(serde_json::Value::Bool(*b)),
			Self::Number(n) => Some(serde_json::Value::Number(n.clone())),
			Self::String(s) => Some(serde_json::Value::String(s.to_string())),
			Self::Array(items) => Some(serde_json::Value::Array(
				items
					.iter()
					.map(|v| v.to_json().unwrap_or(serde_json::Value::Null))
					.collect(),
			)),
			Self::Object(map) => Some(serde_json::Value::Object(
				map.iter()
					.filter_map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
					.collect(),
			)),
		}
	}
}

/// Collapse integral floats to the integer representation.
pub(crate) fn normalize_number(n: Number) -> Number {
	if n.as_i64().is_some() || n.as_u64().is_some() {
		return n;
	}
	if let Some(f) = n.as_f64() {
		if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
			return Number::from(f as i64);
		}
	}
	n
}

impl fmt::Display for SearchValue {
	/// Plain string form used for scalar query-string values.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Undefined => write!(f, "undefined"),
			Self::Null => write!(f, "null"),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Number(n) => write!(f, "{n}"),
			Self::String(s) => write!(f, "{s}"),
			Self::Array(_) | Self::Object(_) => {
				let json = self.to_json().unwrap_or(serde_json::Value::Null);
				write!(f, "{json}")
			}
		}
	}
}

impl From<bool> for SearchValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i32> for SearchValue {
	fn from(value: i32) -> Self {
		Self::Number(Number::from(i64::from(value)))
	}
}

impl From<i64> for SearchValue {
	fn from(value: i64) -> Self {
		Self::Number(Number::from(value))
	}
}

impl From<u64> for SearchValue {
	fn from(value: u64) -> Self {
		Self::Number(Number::from(value))
	}
}

impl From<f64> for SearchValue {
	/// Non-finite floats become `Null`, mirroring JSON serialization.
	fn from(value: f64) -> Self {
		match Number::from_f64(value) {
			Some(n) => Self::Number(normalize_number(n)),
			None => Self::Null,
		}
	}
}

impl From<&str> for SearchValue {
	fn from(value: &str) -> Self {
		Self::String(Rc::from(value))
	}
}

impl From<String> for SearchValue {
	fn from(value: String) -> Self {
		Self::String(Rc::from(value))
	}
}

impl From<Vec<SearchValue>> for SearchValue {
	fn from(value: Vec<SearchValue>) -> Self {
		Self::Array(Rc::new(value))
	}
}

impl From<SearchMap> for SearchValue {
	fn from(value: SearchMap) -> Self {
		Self::Object(Rc::new(value))
	}
}

impl Serialize for SearchValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_json()
			.unwrap_or(serde_json::Value::Null)
			.serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for SearchValue {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Ok(Self::from_json(serde_json::Value::deserialize(
			deserializer,
		)?))
	}
}

/// Builds a [`SearchMap`] from `key => value` pairs.
///
/// Values go through `SearchValue::from`, so literals work directly:
///
/// ```
/// use searchstate_core::search_map;
///
/// let map = search_map! { "page" => 2, "tab" => "all" };
/// assert_eq!(map.len(), 2);
/// ```
#[macro_export]
macro_rules! search_map {
	() => { $crate::SearchMap::new() };
	($($key:expr => $value:expr),+ $(,)?) => {{
		let mut map = $crate::SearchMap::new();
		$( map.insert(($key).to_string(), $crate::SearchValue::from($value)); )+
		map
	}};
}
