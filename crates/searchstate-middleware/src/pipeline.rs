//! Onion-style middleware pipeline over pending navigations.
//!
//! A middleware inspects or transforms the pending
//! `{search, path, options}` triple before it is committed to the adapter,
//! or cancels the commit by returning `None`. The chain composes
//! right-to-left so the *first* middleware in the list is outermost: it runs
//! first on the way in and last on the way out, classic before/after
//! semantics.
//!
//! ```text
//! [A, B]  =>  A-before, B-before, <terminal>, B-after, A-after
//! ```
//!
//! Overrides passed to [`MiddlewareContext::next_with`] propagate inward
//! (search replaces wholesale; path and options shallow-merge), and a
//! transformation made by an inner middleware is visible to the outer one
//! once its `next()` call returns. The whole chain executes synchronously
//! within one flush.

use std::rc::Rc;

use searchstate_core::SearchMap;

use crate::types::{NavigateOptions, Path};

/// The unit passed through the pipeline. `None` anywhere in the chain
/// signals cancellation of the entire commit.
#[derive(Debug, Clone, Default)]
pub struct NavigationIntent {
	pub search: SearchMap,
	pub path: Path,
	pub options: NavigateOptions,
}

/// Partial overrides handed to [`MiddlewareContext::next_with`].
#[derive(Debug, Clone, Default)]
pub struct IntentOverrides {
	/// Replaces the search mapping wholesale when `Some`.
	pub search: Option<SearchMap>,
	/// Shallow-merged over the current path.
	pub path: Option<Path>,
	/// Shallow-merged over the current options.
	pub options: Option<NavigateOptions>,
}

type NextFn<'a> = Box<dyn FnOnce(IntentOverrides) -> Option<NavigationIntent> + 'a>;

/// What a middleware sees: the current pending state plus the continuation
/// into the rest of the chain.
///
/// Calling [`next`](Self::next) consumes the context, so clone whatever you
/// still need from it first:
///
/// ```ignore
/// fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
///     let before = ctx.search.clone();
///     let mut result = ctx.next()?;
///     // ... compare `before` against `result.search` ...
///     Some(result)
/// }
/// ```
pub struct MiddlewareContext<'a> {
	pub search: SearchMap,
	pub path: Path,
	pub options: NavigateOptions,
	next: NextFn<'a>,
}

impl<'a> MiddlewareContext<'a> {
	/// Delegates to the rest of the chain unchanged.
	pub fn next(self) -> Option<NavigationIntent> {
		(self.next)(IntentOverrides::default())
	}

	/// Delegates to the rest of the chain with overrides applied.
	pub fn next_with(self, overrides: IntentOverrides) -> Option<NavigationIntent> {
		(self.next)(overrides)
	}
}

/// A navigation middleware. See the module docs for ordering semantics.
pub trait SearchMiddleware {
	fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent>;
}

/// Runs `middleware` over `initial`, first element outermost.
///
/// Returns the transformed intent, or `None` if any middleware cancelled.
pub fn run_middleware(
	middleware: &[Rc<dyn SearchMiddleware>],
	initial: &NavigationIntent,
) -> Option<NavigationIntent> {
	run_layer(middleware, 0, initial.clone())
}

fn run_layer(
	middleware: &[Rc<dyn SearchMiddleware>],
	index: usize,
	current: NavigationIntent,
) -> Option<NavigationIntent> {
	let Some(layer) = middleware.get(index) else {
		// Terminal: the innermost `next()` resolves to the current state.
		return Some(current);
	};

	let ctx = MiddlewareContext {
		search: current.search.clone(),
		path: current.path.clone(),
		options: current.options.clone(),
		next: Box::new(move |overrides: IntentOverrides| {
			let next_state = apply_overrides(current, overrides);
			run_layer(middleware, index + 1, next_state)
		}),
	};
	layer.process(ctx)
}

fn apply_overrides(current: NavigationIntent, overrides: IntentOverrides) -> NavigationIntent {
	NavigationIntent {
		search: overrides.search.unwrap_or(current.search),
		path: match &overrides.path {
			Some(path) => current.path.merged_with(path),
			None => current.path,
		},
		options: match &overrides.options {
			Some(options) => current.options.merged_with(options),
			None => current.options,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use searchstate_core::search_map;
	use std::cell::RefCell;

	struct Passthrough;

	impl SearchMiddleware for Passthrough {
		fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
			ctx.next()
		}
	}

	struct Recorder {
		name: &'static str,
		order: Rc<RefCell<Vec<String>>>,
	}

	impl SearchMiddleware for Recorder {
		fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
			self.order.borrow_mut().push(format!("{}-before", self.name));
			let result = ctx.next();
			self.order.borrow_mut().push(format!("{}-after", self.name));
			result
		}
	}

	struct Cancel;

	impl SearchMiddleware for Cancel {
		fn process(&self, _ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
			None
		}
	}

	fn initial() -> NavigationIntent {
		NavigationIntent {
			search: search_map! { "page" => 2, "tab" => "preview" },
			path: Path {
				search: Some("?page=2&tab=preview".into()),
				..Path::default()
			},
			options: NavigateOptions::default(),
		}
	}

	fn chain(list: Vec<Rc<dyn SearchMiddleware>>) -> Vec<Rc<dyn SearchMiddleware>> {
		list
	}

	#[test]
	fn test_empty_chain_returns_initial() {
		let result = run_middleware(&[], &initial()).expect("not cancelled");
		assert_eq!(result.search, initial().search);
		assert_eq!(result.path, initial().path);
	}

	#[test]
	fn test_passthrough_preserves_state() {
		let list = chain(vec![Rc::new(Passthrough)]);
		let result = run_middleware(&list, &initial()).expect("not cancelled");
		assert_eq!(result.search, initial().search);
	}

	#[test]
	fn test_onion_order_first_is_outermost() {
		let order = Rc::new(RefCell::new(Vec::new()));
		let list = chain(vec![
			Rc::new(Recorder {
				name: "outer",
				order: Rc::clone(&order),
			}),
			Rc::new(Recorder {
				name: "inner",
				order: Rc::clone(&order),
			}),
		]);

		run_middleware(&list, &initial());
		assert_eq!(
			*order.borrow(),
			vec!["outer-before", "inner-before", "inner-after", "outer-after"]
		);
	}

	#[test]
	fn test_transform_after_next() {
		struct Doubler;
		impl SearchMiddleware for Doubler {
			fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
				let mut result = ctx.next()?;
				let page = result.search["page"].as_i64().unwrap_or(0);
				result
					.search
					.insert("page".into(), searchstate_core::SearchValue::from(page * 2));
				Some(result)
			}
		}

		let list = chain(vec![Rc::new(Doubler)]);
		let result = run_middleware(&list, &initial()).expect("not cancelled");
		assert_eq!(result.search["page"].as_i64(), Some(4));
	}

	#[test]
	fn test_outer_sees_inner_transform() {
		struct SetPage(i64);
		impl SearchMiddleware for SetPage {
			fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
				let mut result = ctx.next()?;
				result
					.search
					.insert("page".into(), searchstate_core::SearchValue::from(self.0));
				Some(result)
			}
		}
		struct Observe(Rc<RefCell<Option<i64>>>);
		impl SearchMiddleware for Observe {
			fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
				let result = ctx.next()?;
				*self.0.borrow_mut() = result.search["page"].as_i64();
				Some(result)
			}
		}

		let seen = Rc::new(RefCell::new(None));
		let list = chain(vec![
			Rc::new(Observe(Rc::clone(&seen))),
			Rc::new(SetPage(99)),
		]);
		run_middleware(&list, &initial());
		assert_eq!(*seen.borrow(), Some(99));
	}

	#[test]
	fn test_overrides_propagate_inward() {
		struct Override;
		impl SearchMiddleware for Override {
			fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
				ctx.next_with(IntentOverrides {
					search: Some(search_map! { "page" => 10 }),
					path: Some(Path {
						pathname: Some("/new".into()),
						..Path::default()
					}),
					options: Some(NavigateOptions {
						replace: Some(true),
						..NavigateOptions::default()
					}),
				})
			}
		}
		struct AssertInner;
		impl SearchMiddleware for AssertInner {
			fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
				assert_eq!(ctx.search["page"].as_i64(), Some(10));
				assert_eq!(ctx.path.pathname.as_deref(), Some("/new"));
				ctx.next()
			}
		}

		let list = chain(vec![Rc::new(Override), Rc::new(AssertInner)]);
		let result = run_middleware(&list, &initial()).expect("not cancelled");
		assert_eq!(result.search, search_map! { "page" => 10 });
		assert_eq!(result.path.pathname.as_deref(), Some("/new"));
		// Path fields not overridden fall through from the initial state.
		assert_eq!(result.path.search.as_deref(), Some("?page=2&tab=preview"));
		assert_eq!(result.options.replace, Some(true));
	}

	#[test]
	fn test_cancel_short_circuits() {
		let order = Rc::new(RefCell::new(Vec::new()));
		let list = chain(vec![
			Rc::new(Recorder {
				name: "outer",
				order: Rc::clone(&order),
			}),
			Rc::new(Cancel),
		]);

		let result = run_middleware(&list, &initial());
		assert!(result.is_none());
		// The outer middleware still unwinds: its next() observed the None.
		assert_eq!(*order.borrow(), vec!["outer-before", "outer-after"]);
	}

	#[test]
	fn test_cancel_after_next() {
		struct CancelLate;
		impl SearchMiddleware for CancelLate {
			fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
				let _ = ctx.next();
				None
			}
		}

		let list = chain(vec![Rc::new(CancelLate)]);
		assert!(run_middleware(&list, &initial()).is_none());
	}
}
