//! Structural sharing between immutable search values.
//!
//! [`replace_equal_deep`] returns `prev` when `next` is deeply equal, and
//! otherwise builds a new tree that reuses every unchanged subtree of `prev`
//! by reference. Consumers keyed on allocation identity therefore see the
//! minimal set of "changed" nodes across a snapshot transition.

use std::rc::Rc;

use crate::value::{SearchMap, SearchValue, Snapshot};

/// Returns `prev` if `next` is deeply equal; otherwise returns `next` with
/// any deeply-equal children replaced by those of `prev`.
pub fn replace_equal_deep(prev: &SearchValue, next: &SearchValue) -> SearchValue {
	diff_value(prev, next).0
}

/// Map-level entry point used by the store when adopting a decoded snapshot.
///
/// Returns a clone of `prev` (same allocation) when nothing changed.
pub fn replace_equal_map(prev: &Snapshot, next: &SearchMap) -> Snapshot {
	let (copy, all_equal) = diff_map(prev, next);
	if all_equal {
		Rc::clone(prev)
	} else {
		Rc::new(copy)
	}
}

/// The `bool` reports whether the result *is* `prev` (deep equality). For
/// primitives that degenerates to value equality, which is exactly how
/// reference equality behaves for them in the structural-sharing contract.
fn diff_value(prev: &SearchValue, next: &SearchValue) -> (SearchValue, bool) {
	if prev.same_allocation(next) {
		return (prev.clone(), true);
	}
	match (prev, next) {
		(SearchValue::Array(prev_items), SearchValue::Array(next_items)) => {
			let mut equal_items = 0usize;
			let mut copy = Vec::with_capacity(next_items.len());
			for (index, next_item) in next_items.iter().enumerate() {
				match prev_items.get(index) {
					Some(prev_item) if prev_item.is_undefined() && next_item.is_undefined() => {
						copy.push(SearchValue::Undefined);
						equal_items += 1;
					}
					Some(prev_item) => {
						let (merged, was_prev) = diff_value(prev_item, next_item);
						if was_prev && !prev_item.is_undefined() {
							equal_items += 1;
						}
						copy.push(merged);
					}
					None => copy.push(next_item.clone()),
				}
			}
			if prev_items.len() == next_items.len() && equal_items == prev_items.len() {
				(prev.clone(), true)
			} else {
				(SearchValue::Array(Rc::new(copy)), false)
			}
		}
		(SearchValue::Object(prev_map), SearchValue::Object(next_map)) => {
			let (copy, all_equal) = diff_map(prev_map, next_map);
			if all_equal {
				(prev.clone(), true)
			} else {
				(SearchValue::Object(Rc::new(copy)), false)
			}
		}
		// Type mismatch or genuinely different primitive.
		_ => (next.clone(), false),
	}
}

fn diff_map(prev: &SearchMap, next: &SearchMap) -> (SearchMap, bool) {
	let mut equal_items = 0usize;
	let mut copy = SearchMap::new();
	for (key, next_value) in next {
		match prev.get(key) {
			// A key present as `Undefined` on both sides counts as equal.
			Some(prev_value) if prev_value.is_undefined() && next_value.is_undefined() => {
				copy.insert(key.clone(), SearchValue::Undefined);
				equal_items += 1;
			}
			Some(prev_value) => {
				let (merged, was_prev) = diff_value(prev_value, next_value);
				if was_prev && !prev_value.is_undefined() {
					equal_items += 1;
				}
				copy.insert(key.clone(), merged);
			}
			None => {
				copy.insert(key.clone(), next_value.clone());
			}
		}
	}
	(copy, prev.len() == next.len() && equal_items == prev.len())
}
