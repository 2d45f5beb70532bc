//! Storage side-channel for sticky params.
//!
//! Individual params can be persisted to a host storage area (browser
//! `localStorage`, a config file, anything keyed by string) and read back to
//! seed "missing param" recovery. Keys are built as `"{namespace}:{name}"`,
//! namespace omitted when absent. Values are stored in raw string form:
//! strings as-is, everything else stringified (JSON for containers).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use searchstate_core::{SearchMap, SearchValue};

/// Read/write-by-key contract over the host's storage area.
pub trait ParamStorage {
	fn get(&self, key: &str) -> Option<String>;
	fn set(&self, key: &str, value: &str);
	fn remove(&self, key: &str);
}

/// In-memory [`ParamStorage`] for tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl ParamStorage for MemoryStorage {
	fn get(&self, key: &str) -> Option<String> {
		self.entries.borrow().get(key).cloned()
	}

	fn set(&self, key: &str, value: &str) {
		self.entries
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
	}

	fn remove(&self, key: &str) {
		self.entries.borrow_mut().remove(key);
	}
}

/// Builds the scoped storage key for a param (e.g. `"app:page"`).
pub fn store_key(name: &str, namespace: Option<&str>) -> String {
	match namespace {
		Some(namespace) => format!("{namespace}:{name}"),
		None => name.to_string(),
	}
}

/// Saves the named params from `search` into `storage`.
///
/// A param that is absent, `Undefined` or `Null` removes its stored entry
/// instead. Pair with [`SearchHandle::sync_missing_params`] for restoration.
///
/// [`SearchHandle::sync_missing_params`]: crate::SearchHandle::sync_missing_params
pub fn persist_search_params(
	search: &SearchMap,
	names: &[&str],
	storage: &dyn ParamStorage,
	namespace: Option<&str>,
) {
	for name in names {
		let key = store_key(name, namespace);
		match search.get(*name) {
			None | Some(SearchValue::Undefined) | Some(SearchValue::Null) => storage.remove(&key),
			Some(SearchValue::String(s)) => storage.set(&key, s),
			Some(other) => storage.set(&key, &other.to_string()),
		}
	}
}

/// One param to recover when missing from the URL.
#[derive(Clone)]
pub struct SyncParam {
	pub name: String,
	/// Storage to read a sticky value from; when absent, only validator
	/// defaults seed the param.
	pub storage: Option<Rc<dyn ParamStorage>>,
	pub namespace: Option<String>,
}

impl SyncParam {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			storage: None,
			namespace: None,
		}
	}

	pub fn from_storage(name: impl Into<String>, storage: Rc<dyn ParamStorage>) -> Self {
		Self {
			name: name.into(),
			storage: Some(storage),
			namespace: None,
		}
	}

	pub fn namespaced(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = Some(namespace.into());
		self
	}
}

impl std::fmt::Debug for SyncParam {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SyncParam")
			.field("name", &self.name)
			.field("has_storage", &self.storage.is_some())
			.field("namespace", &self.namespace)
			.finish()
	}
}
