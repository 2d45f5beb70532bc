//! Shared navigation types.

/// Partial location override carried by a navigation.
///
/// `None` fields leave the corresponding part of the location untouched.
/// The `search` field holds the already-encoded (`?`-prefixed) query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
	pub pathname: Option<String>,
	pub search: Option<String>,
	pub hash: Option<String>,
}

impl Path {
	/// Shallow-merges `later` over `self`; `Some` fields of `later` win.
	pub fn merged_with(&self, later: &Path) -> Path {
		Path {
			pathname: later.pathname.clone().or_else(|| self.pathname.clone()),
			search: later.search.clone().or_else(|| self.search.clone()),
			hash: later.hash.clone().or_else(|| self.hash.clone()),
		}
	}
}

/// Per-navigation options.
///
/// `None` means "not specified"; when navigations batch, later `Some` values
/// win per key. `merge` defaults to `true` and is consumed per queue item
/// rather than accumulated.
#[derive(Debug, Clone, Default)]
pub struct NavigateOptions {
	/// Merge into the current validated state (`true`, default) or replace
	/// it wholesale (`false`).
	pub merge: Option<bool>,
	/// Commit with `replace_state` instead of `push_state`.
	pub replace: Option<bool>,
	/// Opaque history state forwarded to the adapter.
	pub state: Option<serde_json::Value>,
}

impl NavigateOptions {
	/// Shallow-merges `later` over `self`; `Some` fields of `later` win.
	pub fn merged_with(&self, later: &NavigateOptions) -> NavigateOptions {
		NavigateOptions {
			merge: later.merge.or(self.merge),
			replace: later.replace.or(self.replace),
			state: later.state.clone().or_else(|| self.state.clone()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_path_merge_later_wins() {
		let base = Path {
			pathname: Some("/a".into()),
			search: Some("?x=1".into()),
			hash: None,
		};
		let later = Path {
			pathname: Some("/b".into()),
			search: None,
			hash: Some("#top".into()),
		};
		let merged = base.merged_with(&later);
		assert_eq!(merged.pathname.as_deref(), Some("/b"));
		assert_eq!(merged.search.as_deref(), Some("?x=1"));
		assert_eq!(merged.hash.as_deref(), Some("#top"));
	}

	#[test]
	fn test_options_merge_later_wins() {
		let base = NavigateOptions {
			merge: Some(false),
			replace: None,
			state: None,
		};
		let later = NavigateOptions {
			merge: None,
			replace: Some(true),
			state: Some(serde_json::json!({ "from": "test" })),
		};
		let merged = base.merged_with(&later);
		assert_eq!(merged.merge, Some(false));
		assert_eq!(merged.replace, Some(true));
		assert!(merged.state.is_some());
	}
}
