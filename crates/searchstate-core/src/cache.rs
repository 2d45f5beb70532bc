//! Validated-search cache.
//!
//! Memoizes `(raw snapshot, validator)` pairs so repeated reads of the same
//! immutable snapshot never re-run validation. The cache associates, it does
//! not own: the raw axis is held through `Weak` references keyed by
//! allocation address, and dead entries are swept lazily whenever a new raw
//! snapshot is admitted. Entries on the validator axis live at most as long
//! as their raw snapshot's entry.
//!
//! Lookups are identity-based, not value-based: a structurally identical but
//! distinct snapshot is a miss by design — the store only produces a new
//! snapshot allocation when content actually changed, so identity is a sound
//! proxy for content here.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::error::ValidationError;
use crate::validate::{ValidateResult, Validator, ValidatorId};
use crate::value::{SearchMap, Snapshot};

type WeakValidateFn = Weak<dyn Fn(&SearchMap) -> ValidateResult>;

struct RawEntry {
	raw: Weak<SearchMap>,
	by_validator: HashMap<ValidatorId, (WeakValidateFn, Result<Snapshot, ValidationError>)>,
}

/// Two-level memoization of validation results.
#[derive(Default)]
pub struct ValidatedSearchCache {
	entries: RefCell<HashMap<usize, RawEntry>>,
}

impl ValidatedSearchCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the validated snapshot for `(raw, validator)`, running the
	/// validator only on the first lookup of a live pair.
	///
	/// A cache hit returns the stored snapshot allocation itself, so two
	/// hits compare equal by `Rc::ptr_eq`. Errors are cached the same way:
	/// a failing validator also runs at most once per pair.
	pub fn get(
		&self,
		validator: &Validator,
		raw: &Snapshot,
	) -> Result<Snapshot, ValidationError> {
		let raw_key = Rc::as_ptr(raw) as usize;

		if let Some(cached) = self.lookup(raw_key, validator, raw) {
			return cached;
		}

		// Miss: run outside any borrow, then store. The validator is host
		// code and may re-enter the cache.
		let result = validator.validate(raw).map(Rc::new);

		let mut entries = self.entries.borrow_mut();
		if !entries.contains_key(&raw_key) {
			// A new snapshot generation is the natural sweep point for
			// entries whose raw snapshot has been dropped.
			entries.retain(|_, entry| entry.raw.strong_count() > 0);
		}
		let entry = entries.entry(raw_key).or_insert_with(|| RawEntry {
			raw: Rc::downgrade(raw),
			by_validator: HashMap::new(),
		});
		entry
			.by_validator
			.insert(validator.id(), (validator.downgrade(), result.clone()));

		result
	}

	/// Drops every cached entry.
	pub fn clear(&self) {
		self.entries.borrow_mut().clear();
	}

	fn lookup(
		&self,
		raw_key: usize,
		validator: &Validator,
		raw: &Snapshot,
	) -> Option<Result<Snapshot, ValidationError>> {
		let mut entries = self.entries.borrow_mut();

		// An allocation address can be reused after the previous snapshot
		// died; verify the weak still points at *this* snapshot.
		let alive = entries.get(&raw_key).is_some_and(|entry| {
			entry
				.raw
				.upgrade()
				.is_some_and(|live| Rc::ptr_eq(&live, raw))
		});
		if !alive {
			entries.remove(&raw_key);
			return None;
		}

		let entry = entries.get(&raw_key)?;
		let (weak_fn, result) = entry.by_validator.get(&validator.id())?;
		let same_validator = weak_fn
			.upgrade()
			.is_some_and(|f| Rc::ptr_eq(&f, validator.func()));
		same_validator.then(|| result.clone())
	}
}

impl std::fmt::Debug for ValidatedSearchCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ValidatedSearchCache")
			.field("raw_entries", &self.entries.borrow().len())
			.finish()
	}
}
