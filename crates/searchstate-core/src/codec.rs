//! Query-string codec.
//!
//! Converts between a raw query string and a [`SearchMap`], with scalar
//! coercion on the way in:
//!
//! - `"true"` / `"false"` become booleans
//! - full-string, round-trippable numerics become numbers (`"042"` stays a
//!   string because `42` would not print back as `"042"`)
//! - remaining strings are offered to the structured codec (JSON by
//!   default); on failure they stay strings
//!
//! On the way out, `Undefined` entries are dropped, arrays of primitives
//! become repeated keys, and any other container is stringified through the
//! structured codec before percent-encoding. The wire format is plain
//! `application/x-www-form-urlencoded` pairs via `serde_urlencoded`.
//!
//! A failure inside a custom [`StructuredCodec`] never fails the whole
//! operation: the affected value falls back to its raw form.

use std::collections::btree_map::Entry;
use std::error::Error;
use std::rc::Rc;

use crate::value::{SearchMap, SearchValue, normalize_number};
use serde_json::Number;

/// Pluggable (de)serializer for structured (non-scalar) param values.
pub trait StructuredCodec {
	/// Parses a raw string into a value. Errors leave the string untouched.
	fn parse(&self, raw: &str) -> Result<SearchValue, Box<dyn Error>>;
	/// Stringifies a structured value. Errors fall back to the plain form.
	fn stringify(&self, value: &SearchValue) -> Result<String, Box<dyn Error>>;
}

/// The default structured codec: JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl StructuredCodec for JsonCodec {
	fn parse(&self, raw: &str) -> Result<SearchValue, Box<dyn Error>> {
		let json: serde_json::Value = serde_json::from_str(raw)?;
		Ok(SearchValue::from_json(json))
	}

	fn stringify(&self, value: &SearchValue) -> Result<String, Box<dyn Error>> {
		let json = value.to_json().unwrap_or(serde_json::Value::Null);
		Ok(serde_json::to_string(&json)?)
	}
}

/// Decodes a query string with the default JSON codec.
pub fn parse_search(search: &str) -> SearchMap {
	parse_search_with(search, &JsonCodec)
}

/// Decodes a query string, offering leftover strings to `codec`.
///
/// Strips a leading `?`; repeated keys accumulate into arrays. Elements of
/// repeated-key arrays are only scalar-coerced, never structured-parsed.
pub fn parse_search_with(search: &str, codec: &dyn StructuredCodec) -> SearchMap {
	let trimmed = search.strip_prefix('?').unwrap_or(search);
	let pairs: Vec<(String, String)> = serde_urlencoded::from_str(trimmed).unwrap_or_default();

	let mut map = SearchMap::new();
	for (key, value) in pairs {
		let coerced = coerce_scalar(&value);
		match map.entry(key) {
			Entry::Vacant(entry) => {
				entry.insert(coerced);
			}
			Entry::Occupied(mut entry) => match entry.get_mut() {
				SearchValue::Array(items) => Rc::make_mut(items).push(coerced),
				previous => {
					let first = previous.clone();
					*previous = SearchValue::Array(Rc::new(vec![first, coerced]));
				}
			},
		}
	}

	for value in map.values_mut() {
		if let SearchValue::String(s) = value {
			if let Ok(parsed) = codec.parse(s) {
				*value = parsed;
			}
		}
	}

	map
}

/// Encodes a search mapping with the default JSON codec.
pub fn stringify_search(map: &SearchMap) -> String {
	stringify_search_with(map, &JsonCodec)
}

/// Encodes a search mapping into a `?`-prefixed query string, or `""` when
/// nothing remains after dropping `Undefined` entries.
pub fn stringify_search_with(map: &SearchMap, codec: &dyn StructuredCodec) -> String {
	let pairs = search_pairs_with(map, codec);
	if pairs.is_empty() {
		return String::new();
	}
	match serde_urlencoded::to_string(&pairs) {
		Ok(encoded) if !encoded.is_empty() => format!("?{encoded}"),
		_ => String::new(),
	}
}

/// The decoded `(name, value)` pair form of a mapping, before
/// percent-encoding. Useful for building `URLSearchParams`-style lists.
pub fn search_pairs(map: &SearchMap) -> Vec<(String, String)> {
	search_pairs_with(map, &JsonCodec)
}

pub fn search_pairs_with(map: &SearchMap, codec: &dyn StructuredCodec) -> Vec<(String, String)> {
	let mut pairs = Vec::new();
	for (key, value) in map {
		match value {
			SearchValue::Undefined => {}
			SearchValue::Array(items) if items.iter().all(SearchValue::is_primitive) => {
				for item in items.iter().filter(|v| !v.is_undefined()) {
					pairs.push((key.clone(), item.to_string()));
				}
			}
			SearchValue::Array(_) | SearchValue::Object(_) => {
				let encoded = codec
					.stringify(value)
					.unwrap_or_else(|_| value.to_string());
				pairs.push((key.clone(), encoded));
			}
			scalar => pairs.push((key.clone(), scalar.to_string())),
		}
	}
	pairs
}

/// Recursively removes `Undefined` values.
///
/// Object entries holding `Undefined` are dropped; array elements holding
/// `Undefined` are filtered out. Containers left empty by the cleaning are
/// kept (an empty object still encodes as `{}`).
pub fn clean_search_map(map: &SearchMap) -> SearchMap {
	map.iter()
		.filter(|(_, value)| !value.is_undefined())
		.map(|(key, value)| (key.clone(), clean_value(value)))
		.collect()
}

fn clean_value(value: &SearchValue) -> SearchValue {
	match value {
		SearchValue::Object(map) => SearchValue::Object(Rc::new(clean_search_map(map))),
		SearchValue::Array(items) => SearchValue::Array(Rc::new(
			items
				.iter()
				.filter(|v| !v.is_undefined())
				.map(clean_value)
				.collect(),
		)),
		other => other.clone(),
	}
}

fn coerce_scalar(raw: &str) -> SearchValue {
	match raw {
		"true" => return SearchValue::Bool(true),
		"false" => return SearchValue::Bool(false),
		_ => {}
	}
	if let Some(n) = round_trip_number(raw) {
		return SearchValue::Number(n);
	}
	SearchValue::from(raw)
}

/// A numeric literal only coerces when printing it back yields the original
/// text, so `"042"`, `"1e3"` and `"5.0"` all stay strings.
fn round_trip_number(raw: &str) -> Option<Number> {
	let parsed: f64 = raw.parse().ok()?;
	if !parsed.is_finite() {
		return None;
	}
	let n = normalize_number(Number::from_f64(parsed)?);
	(n.to_string() == raw).then_some(n)
}
