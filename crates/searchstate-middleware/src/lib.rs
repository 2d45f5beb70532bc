//! Navigation middleware for searchstate.
//!
//! Pending navigations pass through an onion-style chain of
//! [`SearchMiddleware`] interceptors before being committed to the adapter.
//! Middleware can transform the pending `{search, path, options}` triple,
//! pass overrides inward through `next()`, or cancel the commit entirely.
//!
//! When middleware is composed at multiple levels, scope-level middleware
//! wraps handle-level middleware wraps call-site middleware (scope
//! outermost).
//!
//! Two supplied factories cover the common cases: [`RetainSearchParams`]
//! keeps ambient params alive across navigations, and [`StripSearchParams`]
//! keeps URLs minimal by dropping defaulted or forbidden params.

pub mod pipeline;
pub mod retain;
pub mod strip;
pub mod types;

pub use pipeline::{
	IntentOverrides, MiddlewareContext, NavigationIntent, SearchMiddleware, run_middleware,
};
pub use retain::{KeySelection, RetainSearchParams};
pub use strip::StripSearchParams;
pub use types::{NavigateOptions, Path};
