//! Provider scope.
//!
//! A [`SearchScope`] owns one [`SearchStore`], one [`ValidatedSearchCache`]
//! and one [`NavigationQueue`], plus a live reference to the host's adapter.
//! Sibling or nested scopes never share these instances: a navigation in one
//! scope cannot touch another scope's adapter, store or queue.
//!
//! The adapter slot is the only field swapped in place (every host render
//! may hand in a fresh adapter binding); store, cache and queue identities
//! are stable for the scope's lifetime.
//!
//! Cloning a `SearchScope` clones the *handle*: both clones drive the same
//! underlying instances. When the last clone drops, any scheduled flush is
//! cancelled and pending navigations are discarded — no partial commit
//! occurs.

use std::cell::RefCell;
use std::rc::Rc;

use searchstate_core::{
	SearchStore, Snapshot, Subscription, ValidatedSearchCache, ValidationError, Validator,
};
use searchstate_middleware::SearchMiddleware;

use crate::adapter::SearchStateAdapter;
use crate::flush::{FlushOutcome, run_flush};
use crate::queue::{NavigationQueue, QueueItem};
use crate::scheduler::FrameScheduler;

pub(crate) struct ScopeInner {
	adapter: RefCell<Rc<dyn SearchStateAdapter>>,
	store: SearchStore,
	cache: ValidatedSearchCache,
	queue: NavigationQueue,
	scheduler: Rc<dyn FrameScheduler>,
	middleware: Vec<Rc<dyn SearchMiddleware>>,
	on_validation_error: Option<Rc<dyn Fn(ValidationError)>>,
}

impl Drop for ScopeInner {
	fn drop(&mut self) {
		// Tearing down cancels a scheduled-but-not-yet-run flush wholesale.
		if let Some(handle) = self.queue.take_frame() {
			self.scheduler.cancel(handle);
		}
	}
}

/// Builder for a [`SearchScope`].
pub struct SearchScopeBuilder {
	adapter: Rc<dyn SearchStateAdapter>,
	scheduler: Rc<dyn FrameScheduler>,
	middleware: Vec<Rc<dyn SearchMiddleware>>,
	on_validation_error: Option<Rc<dyn Fn(ValidationError)>>,
}

impl SearchScopeBuilder {
	/// Adds scope-level middleware; it wraps handle- and call-site-level
	/// middleware on every navigation in this scope.
	pub fn middleware(mut self, middleware: Rc<dyn SearchMiddleware>) -> Self {
		self.middleware.push(middleware);
		self
	}

	/// Handles a [`ValidationError`] escaping a *scheduled* flush (there is
	/// no caller to return it to). Defaults to a `tracing` error event.
	pub fn on_validation_error(mut self, hook: impl Fn(ValidationError) + 'static) -> Self {
		self.on_validation_error = Some(Rc::new(hook));
		self
	}

	pub fn build(self) -> SearchScope {
		let store = SearchStore::new(&self.adapter.location().search);
		SearchScope {
			inner: Rc::new(ScopeInner {
				adapter: RefCell::new(self.adapter),
				store,
				cache: ValidatedSearchCache::new(),
				queue: NavigationQueue::new(),
				scheduler: self.scheduler,
				middleware: self.middleware,
				on_validation_error: self.on_validation_error,
			}),
		}
	}
}

/// Handle to one provider scope. Cheap to clone.
pub struct SearchScope {
	pub(crate) inner: Rc<ScopeInner>,
}

impl Clone for SearchScope {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl SearchScope {
	/// Creates a scope seeded from the adapter's current location.
	pub fn new(adapter: Rc<dyn SearchStateAdapter>, scheduler: Rc<dyn FrameScheduler>) -> Self {
		Self::builder(adapter, scheduler).build()
	}

	pub fn builder(
		adapter: Rc<dyn SearchStateAdapter>,
		scheduler: Rc<dyn FrameScheduler>,
	) -> SearchScopeBuilder {
		SearchScopeBuilder {
			adapter,
			scheduler,
			middleware: Vec::new(),
			on_validation_error: None,
		}
	}

	/// Swaps the adapter in place. The scope identity — store, cache,
	/// queue — is unaffected; only the slot contents change.
	pub fn set_adapter(&self, adapter: Rc<dyn SearchStateAdapter>) {
		*self.inner.adapter.borrow_mut() = adapter;
	}

	/// The current adapter.
	pub fn adapter(&self) -> Rc<dyn SearchStateAdapter> {
		Rc::clone(&self.inner.adapter.borrow())
	}

	/// The scope's reactive store.
	pub fn store(&self) -> &SearchStore {
		&self.inner.store
	}

	/// The scope's validated-search cache.
	pub fn cache(&self) -> &ValidatedSearchCache {
		&self.inner.cache
	}

	/// The scope's navigation queue (for state inspection).
	pub fn queue(&self) -> &NavigationQueue {
		&self.inner.queue
	}

	/// Validated snapshot of the current state, memoized per
	/// `(snapshot, validator)` pair.
	pub fn validated(&self, validator: &Validator) -> Result<Snapshot, ValidationError> {
		self.inner.cache.get(validator, &self.inner.store.get_state())
	}

	/// Subscribes to store changes; the guard unsubscribes on drop.
	pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
		self.inner.store.subscribe(listener)
	}

	/// Tells the scope the adapter's location changed; decodes and adopts
	/// the new search string, notifying subscribers on structural change.
	pub fn location_changed(&self) {
		let search = self.adapter().location().search;
		self.inner.store.set_state(&search);
	}

	/// Flushes the queue immediately instead of waiting for the scheduled
	/// frame. A validator failure propagates out; the queue is already
	/// drained by then, so the failed batch is not retried.
	pub fn flush(&self) -> Result<FlushOutcome, ValidationError> {
		run_flush(self)
	}

	pub(crate) fn enqueue(&self, item: QueueItem) {
		self.inner.queue.push(item);
		tracing::trace!(
			target: "searchstate",
			pending = self.inner.queue.len(),
			"navigation queued"
		);
		if !self.inner.queue.is_scheduled() {
			self.schedule_flush();
		}
	}

	pub(crate) fn middleware(&self) -> &[Rc<dyn SearchMiddleware>] {
		&self.inner.middleware
	}

	pub(crate) fn scheduler(&self) -> &Rc<dyn FrameScheduler> {
		&self.inner.scheduler
	}

	fn schedule_flush(&self) {
		let weak = Rc::downgrade(&self.inner);
		let handle = self.inner.scheduler.schedule(Box::new(move || {
			// The scope may have been torn down between scheduling and the
			// frame firing; a dead weak means there is nothing to flush.
			let Some(inner) = weak.upgrade() else {
				return;
			};
			let scope = SearchScope { inner };
			if let Err(err) = scope.flush() {
				match &scope.inner.on_validation_error {
					Some(hook) => hook(err),
					None => tracing::error!(
						target: "searchstate",
						error = %err,
						"navigation flush failed"
					),
				}
			}
		}));
		self.inner.queue.set_frame(handle);
	}
}

impl std::fmt::Debug for SearchScope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SearchScope")
			.field("store", &self.inner.store)
			.field("queue", &self.inner.queue)
			.finish()
	}
}
