//! The navigation queue.
//!
//! Accumulates logical update requests issued during one scheduling frame.
//! The queue moves between two states:
//!
//! ```text
//! Idle ── navigate() ──> Scheduled ── flush / drop ──> Idle
//! ```
//!
//! While `Scheduled`, further navigations only append; exactly one frame
//! callback is outstanding at any time. That is the batching guarantee: N
//! synchronous `navigate` calls commit as one adapter call.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use searchstate_core::{SearchMap, ValidationError};
use searchstate_middleware::{NavigateOptions, Path, SearchMiddleware};

use crate::scheduler::FrameHandle;

/// One-shot reducer from the accumulated validated state to the next one.
pub(crate) type Updater = Box<dyn FnOnce(&SearchMap) -> Result<SearchMap, ValidationError>>;

/// Called with the cleaned next search mapping and the path about to be
/// committed, after middleware and immediately before the adapter call.
pub type OnBeforeNavigate = Rc<dyn Fn(&SearchMap, &Path)>;

/// A single queued navigation. Created once per `navigate` call, immutable
/// afterwards, consumed exactly once at flush time in FIFO order.
pub(crate) struct QueueItem {
	pub(crate) updater: Updater,
	pub(crate) options: NavigateOptions,
	pub(crate) path: Path,
	pub(crate) middleware: Vec<Rc<dyn SearchMiddleware>>,
	pub(crate) on_before_navigate: Vec<OnBeforeNavigate>,
}

/// Scope-owned FIFO of pending navigation items plus at most one scheduled
/// frame handle.
#[derive(Default)]
pub struct NavigationQueue {
	items: RefCell<Vec<QueueItem>>,
	frame: Cell<Option<FrameHandle>>,
}

impl NavigationQueue {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Number of navigations waiting for the next flush.
	pub fn len(&self) -> usize {
		self.items.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.borrow().is_empty()
	}

	/// Whether a flush is currently scheduled.
	pub fn is_scheduled(&self) -> bool {
		self.frame.get().is_some()
	}

	pub(crate) fn push(&self, item: QueueItem) {
		self.items.borrow_mut().push(item);
	}

	pub(crate) fn set_frame(&self, handle: FrameHandle) {
		self.frame.set(Some(handle));
	}

	pub(crate) fn take_frame(&self) -> Option<FrameHandle> {
		self.frame.take()
	}

	/// Atomically drains every queued item, leaving the queue `Idle`.
	pub(crate) fn drain(&self) -> Vec<QueueItem> {
		std::mem::take(&mut *self.items.borrow_mut())
	}
}

impl std::fmt::Debug for NavigationQueue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NavigationQueue")
			.field("items", &self.len())
			.field("scheduled", &self.is_scheduled())
			.finish()
	}
}
