//! Validator-bound search handle.
//!
//! A [`SearchHandle`] binds a [`SearchScope`] to one [`Validator`] and is
//! the main entry point for application code: reactive reads go through the
//! validated-search cache, writes go through the navigation queue. Build one
//! per route schema and clone it freely — clones share the binding.
//!
//! ```ignore
//! let validator = Validator::infallible(|raw| search_map! {
//!     "page" => raw.get("page").and_then(SearchValue::as_i64).unwrap_or(1),
//!     "tab" => raw.get("tab").and_then(SearchValue::as_str).unwrap_or("all"),
//! });
//! let handle = SearchHandle::new(&scope, validator);
//!
//! let current = handle.search()?;             // validated snapshot
//! handle.set_search(search_map! { "page" => 2 }, NavigateOptions::default());
//! ```
//!
//! Handle-level `on_before_navigate` and middleware apply to every
//! navigation issued through the handle; call-site equivalents on a
//! [`NavigateRequest`] compose inside them.

use std::rc::Rc;

use searchstate_core::{
	SearchMap, SearchValue, Snapshot, Subscription, ValidationError, Validator, clean_search_map,
	parse_search, search_pairs, stringify_search,
};
use searchstate_middleware::{NavigateOptions, Path, SearchMiddleware};

use crate::queue::{OnBeforeNavigate, QueueItem};
use crate::scope::SearchScope;
use crate::storage::{SyncParam, store_key};

/// The `search` part of a navigation: either an explicit partial mapping or
/// a function of the current validated state.
///
/// Keys set to [`SearchValue::Undefined`] clear the corresponding param.
#[derive(Clone)]
pub enum SearchUpdate {
	Map(SearchMap),
	With(Rc<dyn Fn(&SearchMap) -> SearchMap>),
}

impl SearchUpdate {
	/// Functional update: receives the current validated mapping.
	pub fn with(f: impl Fn(&SearchMap) -> SearchMap + 'static) -> Self {
		Self::With(Rc::new(f))
	}
}

impl From<SearchMap> for SearchUpdate {
	fn from(map: SearchMap) -> Self {
		Self::Map(map)
	}
}

impl std::fmt::Debug for SearchUpdate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Map(map) => f.debug_tuple("Map").field(map).finish(),
			Self::With(_) => f.write_str("With(..)"),
		}
	}
}

/// A full navigation request: search update plus optional path overrides,
/// options, and call-site middleware/callback.
pub struct NavigateRequest {
	pub search: SearchUpdate,
	pub pathname: Option<String>,
	pub hash: Option<String>,
	pub options: NavigateOptions,
	pub middleware: Vec<Rc<dyn SearchMiddleware>>,
	pub on_before_navigate: Option<OnBeforeNavigate>,
}

impl NavigateRequest {
	pub fn new(search: impl Into<SearchUpdate>) -> Self {
		Self {
			search: search.into(),
			pathname: None,
			hash: None,
			options: NavigateOptions::default(),
			middleware: Vec::new(),
			on_before_navigate: None,
		}
	}

	pub fn pathname(mut self, pathname: impl Into<String>) -> Self {
		self.pathname = Some(pathname.into());
		self
	}

	pub fn hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = Some(hash.into());
		self
	}

	pub fn options(mut self, options: NavigateOptions) -> Self {
		self.options = options;
		self
	}

	/// Merge into the current validated state (default) or replace it.
	pub fn merge(mut self, merge: bool) -> Self {
		self.options.merge = Some(merge);
		self
	}

	/// Commit with `replace_state` instead of `push_state`.
	pub fn replace(mut self, replace: bool) -> Self {
		self.options.replace = Some(replace);
		self
	}

	/// Opaque history state forwarded to the adapter.
	pub fn state(mut self, state: serde_json::Value) -> Self {
		self.options.state = Some(state);
		self
	}

	/// Call-site middleware; runs innermost, inside scope- and
	/// handle-level middleware.
	pub fn middleware(mut self, middleware: Rc<dyn SearchMiddleware>) -> Self {
		self.middleware.push(middleware);
		self
	}

	/// Call-site before-navigate callback; runs after the handle-level one.
	pub fn on_before_navigate(mut self, callback: impl Fn(&SearchMap, &Path) + 'static) -> Self {
		self.on_before_navigate = Some(Rc::new(callback));
		self
	}
}

/// Builder for a [`SearchHandle`].
pub struct SearchHandleBuilder {
	scope: SearchScope,
	validator: Validator,
	on_before_navigate: Option<OnBeforeNavigate>,
	middleware: Vec<Rc<dyn SearchMiddleware>>,
}

impl SearchHandleBuilder {
	/// Runs before every commit issued through this handle, ahead of any
	/// call-site callback.
	pub fn on_before_navigate(mut self, callback: impl Fn(&SearchMap, &Path) + 'static) -> Self {
		self.on_before_navigate = Some(Rc::new(callback));
		self
	}

	/// Handle-level middleware; wraps call-site middleware, is wrapped by
	/// scope-level middleware.
	pub fn middleware(mut self, middleware: Rc<dyn SearchMiddleware>) -> Self {
		self.middleware.push(middleware);
		self
	}

	pub fn build(self) -> SearchHandle {
		SearchHandle {
			scope: self.scope,
			validator: self.validator,
			on_before_navigate: self.on_before_navigate,
			middleware: self.middleware,
		}
	}
}

/// A validator-bound view over one scope's search state.
pub struct SearchHandle {
	scope: SearchScope,
	validator: Validator,
	on_before_navigate: Option<OnBeforeNavigate>,
	middleware: Vec<Rc<dyn SearchMiddleware>>,
}

impl Clone for SearchHandle {
	fn clone(&self) -> Self {
		Self {
			scope: self.scope.clone(),
			validator: self.validator.clone(),
			on_before_navigate: self.on_before_navigate.clone(),
			middleware: self.middleware.clone(),
		}
	}
}

impl SearchHandle {
	pub fn new(scope: &SearchScope, validator: Validator) -> Self {
		Self::builder(scope, validator).build()
	}

	pub fn builder(scope: &SearchScope, validator: Validator) -> SearchHandleBuilder {
		SearchHandleBuilder {
			scope: scope.clone(),
			validator,
			on_before_navigate: None,
			middleware: Vec::new(),
		}
	}

	/// The scope this handle operates on.
	pub fn scope(&self) -> &SearchScope {
		&self.scope
	}

	/// The current validated snapshot, memoized through the scope's cache.
	pub fn search(&self) -> Result<Snapshot, ValidationError> {
		self.scope.validated(&self.validator)
	}

	/// A projection of the validated snapshot. The selector runs on every
	/// call; selector panics propagate to the caller.
	pub fn select<T>(&self, select: impl FnOnce(&SearchMap) -> T) -> Result<T, ValidationError> {
		Ok(select(&*self.search()?))
	}

	/// One validated param by name; absent params read as `Undefined`.
	pub fn param(&self, name: &str) -> Result<SearchValue, ValidationError> {
		self.select(|search| search.get(name).cloned().unwrap_or(SearchValue::Undefined))
	}

	/// Subscribes to the scope's store; the guard unsubscribes on drop.
	pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
		self.scope.subscribe(listener)
	}

	/// Queues a navigation. The update is validated and committed on the
	/// next frame, batched with any other navigations issued before it.
	pub fn navigate(&self, request: NavigateRequest) {
		let NavigateRequest {
			search,
			pathname,
			hash,
			options,
			middleware,
			on_before_navigate,
		} = request;

		let merge = options.merge.unwrap_or(true);
		let validator = self.validator.clone();
		let updater = Box::new(move |accumulated: &SearchMap| {
			let validated = validator.validate(accumulated)?;
			// On merge, start from the fresh validated state; on replace,
			// clear every validated field before the explicit update lands,
			// so "replace" still routes through validation (and a later
			// merge in the same batch can resurrect defaults).
			let mut next: SearchMap = if merge {
				validated.clone()
			} else {
				validated
					.keys()
					.map(|key| (key.clone(), SearchValue::Undefined))
					.collect()
			};
			let update = match &search {
				SearchUpdate::Map(map) => map.clone(),
				SearchUpdate::With(f) => f(&validated),
			};
			next.extend(update);
			Ok(next)
		});

		let mut callbacks: Vec<OnBeforeNavigate> = Vec::new();
		if let Some(callback) = &self.on_before_navigate {
			callbacks.push(Rc::clone(callback));
		}
		if let Some(callback) = on_before_navigate {
			callbacks.push(callback);
		}

		let mut item_middleware = self.middleware.clone();
		item_middleware.extend(middleware);

		self.scope.enqueue(QueueItem {
			updater,
			// `merge` is consumed per item, never accumulated across the
			// batch.
			options: NavigateOptions {
				merge: None,
				..options
			},
			path: Path {
				pathname,
				hash,
				search: None,
			},
			middleware: item_middleware,
			on_before_navigate: callbacks,
		});
	}

	/// Search-only navigation convenience (no pathname/hash control).
	pub fn set_search(&self, search: impl Into<SearchUpdate>, options: NavigateOptions) {
		self.navigate(NavigateRequest::new(search).options(options));
	}

	/// Sets a single param, merging with the rest of the state.
	pub fn set_param(
		&self,
		name: &str,
		value: impl Into<SearchValue>,
		options: NavigateOptions,
	) {
		let mut update = SearchMap::new();
		update.insert(name.to_string(), value.into());
		self.set_search(update, options);
	}

	/// Updates a single param from its current validated value.
	pub fn update_param(
		&self,
		name: &str,
		update: impl Fn(&SearchValue) -> SearchValue + 'static,
		options: NavigateOptions,
	) {
		let name = name.to_string();
		self.set_search(
			SearchUpdate::with(move |validated| {
				let current = validated
					.get(&name)
					.cloned()
					.unwrap_or(SearchValue::Undefined);
				let mut next = validated.clone();
				next.insert(name.clone(), update(&current));
				next
			}),
			options,
		);
	}

	/// Builds a validated, cleaned search string from `params` — for link
	/// building, redirects, or URL construction outside navigation.
	pub fn build_search_string(&self, params: &SearchMap) -> Result<String, ValidationError> {
		let validated = self.validator.validate(params)?;
		Ok(stringify_search(&clean_search_map(&validated)))
	}

	/// Decoded `(name, value)` pairs from the current validated state with
	/// `init` merged on top, or from `init` alone with `replace_all`.
	pub fn url_search_params(
		&self,
		init: Option<SearchMap>,
		replace_all: bool,
	) -> Result<Vec<(String, String)>, ValidationError> {
		let final_search = if replace_all {
			init.unwrap_or_default()
		} else {
			let mut merged = (*self.search()?).clone();
			if let Some(init) = init {
				merged.extend(init);
			}
			merged
		};
		Ok(search_pairs(&final_search))
	}

	/// Seeds params missing from the current URL.
	///
	/// For each configured param not present in the query string, the value
	/// comes from its storage entry when one exists, otherwise from the
	/// validator's default for the current state. Anything found is written
	/// back through a single `replace_state`. Returns whether a replace was
	/// issued.
	pub fn sync_missing_params(&self, params: &[SyncParam]) -> Result<bool, ValidationError> {
		let location = self.scope.adapter().location();
		let trimmed = location
			.search
			.strip_prefix('?')
			.unwrap_or(&location.search);
		let mut pairs: Vec<(String, String)> =
			serde_urlencoded::from_str(trimmed).unwrap_or_default();

		let raw = parse_search(&location.search);
		let validated = self.validator.validate(&raw)?;

		let mut missing: Vec<(String, String)> = Vec::new();
		for param in params {
			if pairs.iter().any(|(name, _)| *name == param.name) {
				continue;
			}

			let mut value = match validated.get(&param.name) {
				None | Some(SearchValue::Undefined) | Some(SearchValue::Null) => None,
				Some(SearchValue::String(s)) => Some(s.to_string()),
				Some(other) => Some(other.to_string()),
			};
			// A stored sticky value wins over the validator default.
			if let Some(storage) = &param.storage {
				let key = store_key(&param.name, param.namespace.as_deref());
				if let Some(stored) = storage.get(&key) {
					tracing::debug!(
						target: "searchstate",
						key = %key,
						value = %stored,
						"recovered missing param from storage"
					);
					value = Some(stored);
				}
			}

			if let Some(value) = value {
				missing.push((param.name.clone(), value));
			}
		}

		if missing.is_empty() {
			return Ok(false);
		}
		pairs.extend(missing);

		let search = match serde_urlencoded::to_string(&pairs) {
			Ok(encoded) if !encoded.is_empty() => format!("?{encoded}"),
			_ => String::new(),
		};
		self.scope.adapter().replace_state(
			None,
			&Path {
				search: Some(search),
				..Path::default()
			},
		);
		self.scope.location_changed();
		Ok(true)
	}
}

impl std::fmt::Debug for SearchHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SearchHandle")
			.field("validator", &self.validator)
			.field("middleware", &self.middleware.len())
			.finish()
	}
}
