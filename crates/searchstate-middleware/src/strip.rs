//! Middleware that strips search params from the committed result.

use searchstate_core::SearchMap;

use crate::pipeline::{MiddlewareContext, NavigationIntent, SearchMiddleware};
use crate::retain::KeySelection;

#[derive(Debug, Clone)]
enum StripMode {
	/// Remove unconditionally.
	Selected(KeySelection),
	/// Remove keys whose resulting value deep-equals the supplied default.
	Defaults(SearchMap),
}

/// Removes params from the pipeline result after the rest of the chain ran.
///
/// Two forms:
///
/// - [`all`](Self::all) / [`keys`](Self::keys) remove unconditionally —
///   useful for params that must never leak into the URL.
/// - [`defaults`](Self::defaults) removes params whose value equals their
///   default, keeping URLs minimal (`?page=1` never shows when `1` is the
///   default).
#[derive(Debug, Clone)]
pub struct StripSearchParams {
	mode: StripMode,
}

impl StripSearchParams {
	/// Strips every param.
	pub fn all() -> Self {
		Self {
			mode: StripMode::Selected(KeySelection::All),
		}
	}

	/// Strips the named params unconditionally.
	pub fn keys<I, S>(keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			mode: StripMode::Selected(KeySelection::Keys(
				keys.into_iter().map(Into::into).collect(),
			)),
		}
	}

	/// Strips params that deep-equal their default value.
	pub fn defaults(defaults: SearchMap) -> Self {
		Self {
			mode: StripMode::Defaults(defaults),
		}
	}
}

impl SearchMiddleware for StripSearchParams {
	fn process(&self, ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
		let mut result = ctx.next()?;

		match &self.mode {
			StripMode::Selected(KeySelection::All) => result.search.clear(),
			StripMode::Selected(KeySelection::Keys(keys)) => {
				for key in keys {
					result.search.remove(key);
				}
			}
			StripMode::Defaults(defaults) => {
				for (key, default) in defaults {
					if result.search.get(key) == Some(default) {
						result.search.remove(key);
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
	use rstest::rstest;
	use searchstate_core::search_map;
	use std::rc::Rc;

	fn intent(search: SearchMap) -> NavigationIntent {
		NavigationIntent {
			search,
			path: Path::default(),
			options: NavigateOptions::default(),
		}
	}

	#[rstest]
	#[case(search_map! { "page" => 1, "tab" => "preview" }, search_map! { "tab" => "preview" })]
	#[case(search_map! { "page" => 2 }, search_map! { "page" => 2 })]
	#[case(search_map! { "tab" => "preview" }, search_map! { "tab" => "preview" })]
	fn test_strip_defaults(#[case] search: SearchMap, #[case] expected: SearchMap) {
		let list: Vec<Rc<dyn SearchMiddleware>> =
			vec![Rc::new(StripSearchParams::defaults(search_map! { "page" => 1 }))];
		let result = run_middleware(&list, &intent(search)).expect("not cancelled");
		assert_eq!(result.search, expected);
	}

	#[test]
	fn test_strip_defaults_compares_deeply() {
		let defaults = search_map! { "filters" => search_map! { "archived" => false } };
		let list: Vec<Rc<dyn SearchMiddleware>> =
			vec![Rc::new(StripSearchParams::defaults(defaults))];

		// Structurally equal (different allocation) still strips.
		let result = run_middleware(
			&list,
			&intent(search_map! { "filters" => search_map! { "archived" => false } }),
		)
		.expect("not cancelled");
		assert!(result.search.is_empty());
	}

	#[test]
	fn test_strip_named_keys_unconditionally() {
		let list: Vec<Rc<dyn SearchMiddleware>> =
			vec![Rc::new(StripSearchParams::keys(["token"]))];
		let result = run_middleware(
			&list,
			&intent(search_map! { "token" => "secret", "page" => 3 }),
		)
		.expect("not cancelled");
		assert_eq!(result.search, search_map! { "page" => 3 });
	}

	#[test]
	fn test_strip_all_empties_the_result() {
		let list: Vec<Rc<dyn SearchMiddleware>> = vec![Rc::new(StripSearchParams::all())];
		let result = run_middleware(&list, &intent(search_map! { "a" => 1, "b" => 2 }))
			.expect("not cancelled");
		assert!(result.search.is_empty());
	}

	#[test]
	fn test_strip_passes_cancellation_through() {
		struct Cancel;
		impl SearchMiddleware for Cancel {
			fn process(&self, _ctx: MiddlewareContext<'_>) -> Option<NavigationIntent> {
				None
			}
		}

		let list: Vec<Rc<dyn SearchMiddleware>> = vec![
			Rc::new(StripSearchParams::defaults(search_map! { "page" => 1 })),
			Rc::new(Cancel),
		];
		assert!(run_middleware(&list, &intent(search_map! { "page" => 1 })).is_none());
	}
}
