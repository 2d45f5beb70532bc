//! Core primitives for reactive URL search-state.
//!
//! This crate holds the framework-free heart of the system:
//!
//! - [`value`]: the loosely-typed [`SearchValue`]/[`SearchMap`] model with
//!   `Rc`-shared containers
//! - [`codec`]: query-string parsing and stringification with scalar
//!   coercion and a pluggable structured codec
//! - [`sharing`]: the structural differ ([`replace_equal_deep`]) that keeps
//!   snapshot identity stable across equal transitions
//! - [`validate`]: the host-supplied [`Validator`] contract and composition
//! - [`cache`]: the identity-keyed [`ValidatedSearchCache`]
//! - [`store`]: the subscribable [`SearchStore`]
//!
//! Navigation (queueing, batching, middleware, adapters) lives in
//! `searchstate-middleware` and `searchstate-nav`.

pub mod cache;
pub mod codec;
pub mod error;
pub mod sharing;
pub mod store;
pub mod validate;
pub mod value;

pub use cache::ValidatedSearchCache;
pub use codec::{
	JsonCodec, StructuredCodec, clean_search_map, parse_search, parse_search_with, search_pairs,
	search_pairs_with, stringify_search, stringify_search_with,
};
pub use error::ValidationError;
pub use sharing::{replace_equal_deep, replace_equal_map};
pub use store::{SearchStore, Subscription};
pub use validate::{ValidateResult, Validator, ValidatorId};
pub use value::{SearchMap, SearchValue, Snapshot};
