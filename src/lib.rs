//! # searchstate
//!
//! Reactive, validated URL search-state with batched navigation.
//!
//! searchstate keeps the query-string portion of a URL synchronized with a
//! validated in-memory snapshot, and funnels every mutation through a
//! batched, middleware-pipelined navigation queue. It is router-agnostic:
//! URL reads and writes go through a host-supplied adapter, and rendering
//! belongs to whatever reactive UI layer subscribes to the store.
//!
//! ## The pieces
//!
//! - **Codec** — query string ⇄ loosely-typed mapping, with scalar coercion
//!   and JSON-encoded structured values
//! - **Structural differ** — snapshots keep their identity across
//!   structurally-equal transitions, subtrees are reused by reference
//! - **Validator + cache** — host-supplied schema functions, memoized per
//!   `(snapshot, validator)` pair
//! - **Store** — subscribable holder of the decoded state
//! - **Middleware** — onion-style interceptors over pending navigations
//! - **Queue + scheduler** — all navigations issued within one frame commit
//!   as a single adapter call
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use searchstate::{
//!     ManualScheduler, MemoryAdapter, NavigateOptions, SearchHandle, SearchScope,
//!     SearchStateAdapter, SearchValue, Validator, search_map,
//! };
//!
//! let adapter = Rc::new(MemoryAdapter::with_search("?page=1&tab=all"));
//! let scheduler = Rc::new(ManualScheduler::new());
//! let scope = SearchScope::new(adapter.clone(), scheduler.clone());
//!
//! let validator = Validator::infallible(|raw| search_map! {
//!     "page" => raw.get("page").and_then(SearchValue::as_i64).unwrap_or(1),
//!     "tab" => raw.get("tab").and_then(SearchValue::as_str).unwrap_or("all"),
//! });
//! let handle = SearchHandle::new(&scope, validator);
//!
//! handle.set_search(search_map! { "page" => 2 }, NavigateOptions::default());
//! scheduler.run_frame();
//!
//! assert_eq!(adapter.location().search, "?page=2&tab=all");
//! ```

pub use searchstate_core::search_map;
pub use searchstate_core::{
	JsonCodec, SearchMap, SearchStore, SearchValue, Snapshot, StructuredCodec, Subscription,
	ValidateResult, ValidatedSearchCache, ValidationError, Validator, ValidatorId,
	clean_search_map, parse_search, parse_search_with, replace_equal_deep, replace_equal_map,
	search_pairs, search_pairs_with, stringify_search, stringify_search_with,
};
pub use searchstate_middleware::{
	IntentOverrides, KeySelection, MiddlewareContext, NavigateOptions, NavigationIntent, Path,
	RetainSearchParams, SearchMiddleware, StripSearchParams, run_middleware,
};
pub use searchstate_nav::{
	Commit, CommitKind, FlushOutcome, FrameHandle, FrameScheduler, Location, ManualScheduler,
	MemoryAdapter, MemoryStorage, NavigateRequest, NavigationQueue, OnBeforeNavigate,
	ParamStorage, SearchHandle, SearchHandleBuilder, SearchScope, SearchScopeBuilder,
	SearchStateAdapter, SearchUpdate, SyncParam, persist_search_params, store_key,
};
