//! The adapter boundary.
//!
//! An adapter bridges this library to the host's actual URL and history
//! handling: a router binding in a real application, [`MemoryAdapter`] in
//! tests or headless hosts. The core reads `location()` on demand and
//! commits through `push_state`/`replace_state`; it never mutates the URL
//! any other way.
//!
//! ## Contract
//!
//! `location()` must reflect the most recently committed navigation
//! synchronously after `push_state`/`replace_state` returns. The core never
//! reads `location()` speculatively mid-flush.

use std::cell::RefCell;

use searchstate_middleware::Path;

/// The current URL, split the way the history API splits it.
///
/// `search` carries its `?` prefix (or is empty), `hash` its `#` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
	pub pathname: String,
	pub search: String,
	pub hash: String,
}

/// Host-supplied bridge between the navigation core and real URL state.
pub trait SearchStateAdapter {
	/// The current location; always fresh, read on demand.
	fn location(&self) -> Location;

	/// Commits a new history entry.
	fn push_state(&self, state: Option<serde_json::Value>, path: &Path);

	/// Replaces the current history entry.
	fn replace_state(&self, state: Option<serde_json::Value>, path: &Path);
}

/// How a [`Commit`] reached the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
	Push,
	Replace,
}

/// One recorded `push_state`/`replace_state` call.
#[derive(Debug, Clone)]
pub struct Commit {
	pub kind: CommitKind,
	pub state: Option<serde_json::Value>,
	pub location: Location,
}

/// In-memory adapter for tests and non-browser hosts.
///
/// Applies committed paths onto an internal [`Location`] and records every
/// commit for inspection.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
	location: RefCell<Location>,
	commits: RefCell<Vec<Commit>>,
}

impl MemoryAdapter {
	pub fn new(initial: Location) -> Self {
		Self {
			location: RefCell::new(initial),
			commits: RefCell::new(Vec::new()),
		}
	}

	/// Convenience constructor: pathname `/`, no hash.
	pub fn with_search(search: &str) -> Self {
		Self::new(Location {
			pathname: "/".to_string(),
			search: search.to_string(),
			hash: String::new(),
		})
	}

	/// Every commit recorded so far, oldest first.
	pub fn commits(&self) -> Vec<Commit> {
		self.commits.borrow().clone()
	}

	pub fn push_count(&self) -> usize {
		self.count(CommitKind::Push)
	}

	pub fn replace_count(&self) -> usize {
		self.count(CommitKind::Replace)
	}

	fn count(&self, kind: CommitKind) -> usize {
		self.commits
			.borrow()
			.iter()
			.filter(|c| c.kind == kind)
			.count()
	}

	fn commit(&self, kind: CommitKind, state: Option<serde_json::Value>, path: &Path) {
		let mut location = self.location.borrow_mut();
		if let Some(pathname) = &path.pathname {
			location.pathname = pathname.clone();
		}
		if let Some(search) = &path.search {
			location.search = search.clone();
		}
		if let Some(hash) = &path.hash {
			location.hash = hash.clone();
		}
		self.commits.borrow_mut().push(Commit {
			kind,
			state,
			location: location.clone(),
		});
	}
}

impl SearchStateAdapter for MemoryAdapter {
	fn location(&self) -> Location {
		self.location.borrow().clone()
	}

	fn push_state(&self, state: Option<serde_json::Value>, path: &Path) {
		self.commit(CommitKind::Push, state, path);
	}

	fn replace_state(&self, state: Option<serde_json::Value>, path: &Path) {
		self.commit(CommitKind::Replace, state, path);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_push_applies_path_and_records() {
		let adapter = MemoryAdapter::with_search("?page=1");
		adapter.push_state(
			None,
			&Path {
				search: Some("?page=2".into()),
				..Path::default()
			},
		);

		assert_eq!(adapter.location().search, "?page=2");
		assert_eq!(adapter.location().pathname, "/");
		assert_eq!(adapter.push_count(), 1);
		assert_eq!(adapter.replace_count(), 0);
	}

	#[test]
	fn test_replace_keeps_unspecified_fields() {
		let adapter = MemoryAdapter::new(Location {
			pathname: "/results".into(),
			search: "?q=a".into(),
			hash: "#top".into(),
		});
		adapter.replace_state(
			None,
			&Path {
				search: Some("?q=b".into()),
				..Path::default()
			},
		);

		let location = adapter.location();
		assert_eq!(location.pathname, "/results");
		assert_eq!(location.search, "?q=b");
		assert_eq!(location.hash, "#top");
		assert_eq!(adapter.replace_count(), 1);
	}

	#[test]
	fn test_location_reflects_commit_synchronously() {
		let adapter = MemoryAdapter::with_search("");
		adapter.push_state(
			Some(serde_json::json!({ "scroll": 0 })),
			&Path {
				pathname: Some("/next".into()),
				search: Some("?page=3".into()),
				..Path::default()
			},
		);
		assert_eq!(adapter.location().pathname, "/next");
		assert_eq!(adapter.location().search, "?page=3");
		assert!(adapter.commits()[0].state.is_some());
	}
}
