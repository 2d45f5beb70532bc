//! Flush: the once-per-frame commit of accumulated navigations.
//!
//! The procedure, in order:
//!
//! 1. Atomically drain the queue (the queue is `Idle` again from here on).
//! 2. Nothing drained → stop.
//! 3. Reduce items in FIFO order starting from the store's current state:
//!    each updater validates the accumulated mapping and returns the next
//!    one; path and options overrides shallow-merge left-to-right.
//! 4. Clean `Undefined` values recursively and encode the result.
//! 5. Compare against the adapter's current location; stop when nothing
//!    differs (idempotent navigations never reach the adapter).
//! 6. Run the middleware pipeline; `None` cancels the whole flush silently.
//! 7. Invoke before-navigate callbacks, then commit through
//!    `replace_state`/`push_state`.
//!
//! A validator error during step 3 propagates out. The queue was already
//! drained, so the failed batch does not linger into a future flush.

use searchstate_core::{SearchMap, ValidationError, clean_search_map, stringify_search};
use searchstate_middleware::{NavigateOptions, NavigationIntent, Path, run_middleware};

use crate::scope::SearchScope;

/// What a flush did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
	/// The queue was empty.
	Empty,
	/// The reduced result matched the adapter's current location.
	NoChange,
	/// A middleware cancelled the commit.
	Cancelled,
	/// The adapter was invoked.
	Committed,
}

pub(crate) fn run_flush(scope: &SearchScope) -> Result<FlushOutcome, ValidationError> {
	// A manual flush may race a scheduled frame; whichever runs first wins
	// and the other finds an empty queue.
	if let Some(handle) = scope.queue().take_frame() {
		scope.scheduler().cancel(handle);
	}
	let items = scope.queue().drain();
	if items.is_empty() {
		return Ok(FlushOutcome::Empty);
	}
	tracing::debug!(target: "searchstate", items = items.len(), "flushing navigation queue");

	let mut final_search: SearchMap = (*scope.store().get_state()).clone();
	let mut final_path = Path::default();
	let mut final_options = NavigateOptions::default();
	let mut middleware = scope.middleware().to_vec();
	let mut callbacks = Vec::new();

	for item in items {
		final_search = (item.updater)(&final_search)?;
		final_path = final_path.merged_with(&item.path);
		final_options = final_options.merged_with(&item.options);
		middleware.extend(item.middleware);
		callbacks.extend(item.on_before_navigate);
	}

	let cleaned = clean_search_map(&final_search);
	let next_search = stringify_search(&cleaned);

	let previous = scope.adapter().location();
	let changed = next_search != previous.search
		|| final_path
			.pathname
			.as_ref()
			.is_some_and(|pathname| *pathname != previous.pathname)
		|| final_path
			.hash
			.as_ref()
			.is_some_and(|hash| *hash != previous.hash);
	if !changed {
		tracing::debug!(target: "searchstate", %next_search, "flush produced no location change");
		return Ok(FlushOutcome::NoChange);
	}

	let intent = NavigationIntent {
		search: cleaned,
		path: Path {
			search: Some(next_search),
			..final_path
		},
		options: final_options,
	};
	let Some(result) = run_middleware(&middleware, &intent) else {
		tracing::debug!(target: "searchstate", "navigation cancelled by middleware");
		return Ok(FlushOutcome::Cancelled);
	};

	// Middleware may have rewritten the mapping; the committed query string
	// always reflects the final mapping.
	let committed_search = clean_search_map(&result.search);
	let next_path = Path {
		search: Some(stringify_search(&committed_search)),
		pathname: result.path.pathname,
		hash: result.path.hash,
	};

	for callback in &callbacks {
		callback(&committed_search, &next_path);
	}

	let replace = result.options.replace.unwrap_or(false);
	tracing::debug!(
		target: "searchstate",
		search = next_path.search.as_deref().unwrap_or(""),
		replace,
		"committing navigation"
	);
	let adapter = scope.adapter();
	if replace {
		adapter.replace_state(result.options.state, &next_path);
	} else {
		adapter.push_state(result.options.state, &next_path);
	}

	// The adapter reflects the commit synchronously; adopt it so the store
	// is consistent before the next read. This never re-enters the flush —
	// the queue was drained up front.
	scope.location_changed();

	Ok(FlushOutcome::Committed)
}
