//! Reactive store for the decoded search state.
//!
//! `SearchStore` holds the current raw query string plus its decoded
//! [`Snapshot`] and notifies subscribers when — and only when — the snapshot
//! identity changes. Structural sharing (see [`crate::sharing`]) means a
//! query string that decodes to an equal mapping (key reordering, say)
//! adopts the existing snapshot and produces no notification.
//!
//! ## Invariants
//!
//! 1. At most one notification per `set_state` call.
//! 2. No notification when the structural diff concludes nothing changed.
//! 3. Listeners run synchronously, in registration order.
//! 4. Dropping a [`Subscription`] removes its listener.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::codec::parse_search;
use crate::sharing::replace_equal_map;
use crate::value::{SearchMap, Snapshot};

type ParseFn = dyn Fn(&str) -> SearchMap;

struct ListenerRegistry {
	listeners: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
	next_id: Cell<u64>,
}

impl ListenerRegistry {
	fn add(&self, listener: Rc<dyn Fn()>) -> u64 {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		self.listeners.borrow_mut().push((id, listener));
		id
	}

	fn remove(&self, id: u64) {
		self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
	}

	fn emit(&self) {
		// Snapshot the list first: a listener may subscribe or unsubscribe
		// while we iterate.
		let current: Vec<Rc<dyn Fn()>> = self
			.listeners
			.borrow()
			.iter()
			.map(|(_, l)| Rc::clone(l))
			.collect();
		for listener in current {
			listener();
		}
	}
}

/// RAII guard for a store subscription; dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
	registry: Weak<ListenerRegistry>,
	id: u64,
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(registry) = self.registry.upgrade() {
			registry.remove(self.id);
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish()
	}
}

/// Reactive holder of the decoded (not yet validated) search mapping.
pub struct SearchStore {
	search: RefCell<String>,
	state: RefCell<Snapshot>,
	registry: Rc<ListenerRegistry>,
	parse: Box<ParseFn>,
}

impl SearchStore {
	/// Creates a store seeded from `search`, decoding with the default
	/// JSON-backed parser.
	pub fn new(search: &str) -> Self {
		Self::with_parser(search, parse_search)
	}

	/// Creates a store with a custom query-string parser.
	pub fn with_parser(search: &str, parse: impl Fn(&str) -> SearchMap + 'static) -> Self {
		let state = Rc::new(parse(search));
		Self {
			search: RefCell::new(search.to_string()),
			state: RefCell::new(state),
			registry: Rc::new(ListenerRegistry {
				listeners: RefCell::new(Vec::new()),
				next_id: Cell::new(0),
			}),
			parse: Box::new(parse),
		}
	}

	/// Registers a change listener; the returned guard unsubscribes on drop.
	pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
		let id = self.registry.add(Rc::new(listener));
		Subscription {
			registry: Rc::downgrade(&self.registry),
			id,
		}
	}

	/// Adopts `next_search` if it decodes to a structurally different
	/// mapping, notifying listeners exactly once on change.
	pub fn set_state(&self, next_search: &str) {
		if *self.search.borrow() == next_search {
			return;
		}
		let next_state = replace_equal_map(&self.state.borrow(), &(self.parse)(next_search));
		*self.search.borrow_mut() = next_search.to_string();

		let changed = !Rc::ptr_eq(&next_state, &self.state.borrow());
		if changed {
			*self.state.borrow_mut() = next_state;
			self.registry.emit();
		}
	}

	/// The current decoded snapshot.
	pub fn get_state(&self) -> Snapshot {
		Rc::clone(&self.state.borrow())
	}

	/// The current raw query string (e.g. `?page=2`).
	pub fn search_str(&self) -> String {
		self.search.borrow().clone()
	}
}

impl std::fmt::Debug for SearchStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SearchStore")
			.field("search", &*self.search.borrow())
			.field("listeners", &self.registry.listeners.borrow().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::search_map;

	#[test]
	fn test_initial_state_is_decoded() {
		let store = SearchStore::new("?page=1&tab=all");
		assert_eq!(*store.get_state(), search_map! { "page" => 1, "tab" => "all" });
		assert_eq!(store.search_str(), "?page=1&tab=all");
	}

	#[test]
	fn test_set_state_notifies_on_change() {
		let store = SearchStore::new("?page=1");
		let seen = Rc::new(Cell::new(0));
		let counter = Rc::clone(&seen);
		let _sub = store.subscribe(move || counter.set(counter.get() + 1));

		store.set_state("?page=2");
		assert_eq!(seen.get(), 1);
		assert_eq!(*store.get_state(), search_map! { "page" => 2 });
	}

	#[test]
	fn test_identical_string_is_noop() {
		let store = SearchStore::new("?page=1");
		let seen = Rc::new(Cell::new(0));
		let counter = Rc::clone(&seen);
		let _sub = store.subscribe(move || counter.set(counter.get() + 1));

		store.set_state("?page=1");
		assert_eq!(seen.get(), 0);
	}

	#[test]
	fn test_reordered_keys_do_not_notify() {
		let store = SearchStore::new("?a=1&b=2");
		let before = store.get_state();

		let seen = Rc::new(Cell::new(0));
		let counter = Rc::clone(&seen);
		let _sub = store.subscribe(move || counter.set(counter.get() + 1));

		// Different string, structurally equal mapping.
		store.set_state("?b=2&a=1");
		assert_eq!(seen.get(), 0, "no notification without structural change");
		assert!(Rc::ptr_eq(&before, &store.get_state()), "snapshot reused");
		assert_eq!(store.search_str(), "?b=2&a=1", "raw string still adopted");
	}

	#[test]
	fn test_snapshot_identity_stable_across_reads() {
		let store = SearchStore::new("?page=1");
		assert!(Rc::ptr_eq(&store.get_state(), &store.get_state()));
	}

	#[test]
	fn test_listeners_run_in_registration_order() {
		let store = SearchStore::new("");
		let order = Rc::new(RefCell::new(Vec::new()));

		let first = Rc::clone(&order);
		let _a = store.subscribe(move || first.borrow_mut().push("first"));
		let second = Rc::clone(&order);
		let _b = store.subscribe(move || second.borrow_mut().push("second"));

		store.set_state("?x=1");
		assert_eq!(*order.borrow(), vec!["first", "second"]);
	}

	#[test]
	fn test_dropped_subscription_stops_notifications() {
		let store = SearchStore::new("");
		let seen = Rc::new(Cell::new(0));
		let counter = Rc::clone(&seen);
		let sub = store.subscribe(move || counter.set(counter.get() + 1));

		store.set_state("?x=1");
		drop(sub);
		store.set_state("?x=2");
		assert_eq!(seen.get(), 1);
	}

	#[test]
	fn test_unchanged_subtree_keeps_allocation() {
		let store = SearchStore::new("?filters=%7B%22a%22%3A1%7D&page=1");
		let before = store.get_state();
		store.set_state("?filters=%7B%22a%22%3A1%7D&page=2");
		let after = store.get_state();

		assert!(!Rc::ptr_eq(&before, &after));
		assert!(before["filters"].same_allocation(&after["filters"]));
	}
}
