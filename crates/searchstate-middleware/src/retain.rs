//! Middleware that retains search params across navigations.

use crate::pipeline::{MiddlewareContext, NavigationIntent, SearchMiddleware};

/// Which params a retain/strip middleware targets.
#[derive(Debug, Clone)]
pub enum KeySelection {
	/// Every key.
	All,
	/// The named keys only.
	Keys(Vec<String>),
}

/// Re-merges params from the pre-middleware search into the pipeline result
/// wherever the result does not already define them. Explicit results are
/// never overridden.
///
/// Compose it outside middleware that rewrite or strip the search to
/// guarantee the named params survive the rest of the chain.
#[derive(Debug, Clone)]
pub struct RetainSearchParams {
	selection: KeySelection,
}

impl RetainSearchParams {
	/// Retains every param present before the rest of the pipeline ran.
	pub fn all() -> Self {
		Self {
			selection: KeySelection::All,
		}
	}

	/// Retains the named params only.
	pub fn keys<I, S>(keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			selection: KeySelection::Keys(keys.into_iter().map(Into::into).collect()),
		}
	}
}

impl SearchMiddleware for RetainSearchParams {
	fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
		let before = ctx.search.clone();
		let mut result = ctx.next()?;

		match &self.selection {
			KeySelection::All => {
				for (key, value) in before {
					result.search.entry(key).or_insert(value);
				}
			}
			KeySelection::Keys(keys) => {
				for key in keys {
					if result.search.contains_key(key) {
						continue;
					}
					if let Some(value) = before.get(key) {
						result.search.insert(key.clone(), value.clone());
					}
				}
			}
		}

		Some(result)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pipeline::run_middleware;
	use crate::types::{NavigateOptions, Path};
	use searchstate_core::{SearchValue, search_map};
	use std::rc::Rc;

	fn initial() -> NavigationIntent {
		NavigationIntent {
			search: search_map! { "page" => 2, "tab" => "preview" },
			path: Path::default(),
			options: NavigateOptions::default(),
		}
	}

	/// Replaces the search mapping wholesale, dropping everything else.
	struct ReplaceSearch(searchstate_core::SearchMap);

	impl SearchMiddleware for ReplaceSearch {
		fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
			let mut result = ctx.next()?;
			result.search = self.0.clone();
			Some(result)
		}
	}

	#[test]
	fn test_retain_all_restores_dropped_params() {
		let list: Vec<Rc<dyn SearchMiddleware>> = vec![
			Rc::new(RetainSearchParams::all()),
			Rc::new(ReplaceSearch(search_map! { "page" => 5 })),
		];
		let result = run_middleware(&list, &initial()).expect("not cancelled");
		assert_eq!(result.search, search_map! { "page" => 5, "tab" => "preview" });
	}

	#[test]
	fn test_retain_named_keys_only() {
		let list: Vec<Rc<dyn SearchMiddleware>> = vec![
			Rc::new(RetainSearchParams::keys(["tab"])),
			Rc::new(ReplaceSearch(
				search_map! { "page" => 99, "filter" => "active" },
			)),
		];
		let result = run_middleware(&list, &initial()).expect("not cancelled");
		assert_eq!(result.search["tab"], SearchValue::from("preview"));
		assert_eq!(result.search["page"].as_i64(), Some(99));
		assert_eq!(result.search["filter"], SearchValue::from("active"));
	}

	#[test]
	fn test_retain_does_not_override_explicit_results() {
		let list: Vec<Rc<dyn SearchMiddleware>> = vec![
			Rc::new(RetainSearchParams::keys(["tab"])),
			Rc::new(ReplaceSearch(search_map! { "tab" => "details" })),
		];
		let result = run_middleware(&list, &initial()).expect("not cancelled");
		assert_eq!(result.search["tab"], SearchValue::from("details"));
	}

	#[test]
	fn test_retain_passes_cancellation_through() {
		struct Cancel;
		impl SearchMiddleware for Cancel {
			fn process(&self, _ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
				None
			}
		}

		let list: Vec<Rc<dyn SearchMiddleware>> =
			vec![Rc::new(RetainSearchParams::all()), Rc::new(Cancel)];
		assert!(run_middleware(&list, &initial()).is_none());
	}
}
