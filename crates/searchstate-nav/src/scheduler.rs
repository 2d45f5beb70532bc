//! Frame scheduling abstraction.
//!
//! The navigation queue needs exactly one capability from its host: run a
//! callback on the next frame-equivalent tick, cancellable until it fires.
//! In a browser host that is `requestAnimationFrame`; any deferred-callback
//! primitive (timer, microtask, idle callback) satisfies the contract.
//! Coalescing is the queue's job — it schedules at most once per
//! idle-to-scheduled transition.

use std::cell::{Cell, RefCell};

/// Opaque handle to a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
	/// Builds a handle from a host-side identifier.
	pub fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	pub fn into_raw(self) -> u64 {
		self.0
	}
}

/// Schedules one deferred callback per call.
///
/// Implementations must *defer*: the callback must never run inside
/// `schedule` itself. `cancel` with an already-fired or unknown handle is a
/// no-op.
pub trait FrameScheduler {
	fn schedule(&self, callback: Box<dyn FnOnce()>) -> FrameHandle;
	fn cancel(&self, handle: FrameHandle);
}

/// Deterministic scheduler pumped by hand.
///
/// Callbacks queue up until [`run_frame`](Self::run_frame) is called;
/// callbacks scheduled *during* a frame land in the next one, matching how
/// `requestAnimationFrame` behaves inside an animation-frame callback.
#[derive(Default)]
pub struct ManualScheduler {
	pending: RefCell<Vec<(FrameHandle, Box<dyn FnOnce()>)>>,
	next_handle: Cell<u64>,
}

impl ManualScheduler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Runs every callback scheduled before this call. Returns how many ran.
	pub fn run_frame(&self) -> usize {
		let current = std::mem::take(&mut *self.pending.borrow_mut());
		let count = current.len();
		for (_, callback) in current {
			callback();
		}
		count
	}

	/// Number of callbacks waiting for the next frame.
	pub fn pending_count(&self) -> usize {
		self.pending.borrow().len()
	}
}

impl FrameScheduler for ManualScheduler {
	fn schedule(&self, callback: Box<dyn FnOnce()>) -> FrameHandle {
		let handle = FrameHandle(self.next_handle.get());
		self.next_handle.set(handle.0 + 1);
		self.pending.borrow_mut().push((handle, callback));
		handle
	}

	fn cancel(&self, handle: FrameHandle) {
		self.pending.borrow_mut().retain(|(h, _)| *h != handle);
	}
}

impl std::fmt::Debug for ManualScheduler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ManualScheduler")
			.field("pending", &self.pending.borrow().len())
			.finish()
	}
}
