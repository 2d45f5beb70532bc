//! Search validators.
//!
//! A validator is a host-supplied pure function from an untyped [`SearchMap`]
//! to a validated mapping. [`Validator`] wraps the function behind a cheap
//! clonable handle whose *identity* (the underlying allocation) keys the
//! validated-search cache, so two handles cloned from the same `Validator`
//! hit the same cache entries while two independently-built validators never
//! collide.
//!
//! ## Composition
//!
//! [`Validator::compose`] layers an extension on top of a base schema, the
//! way a child route extends its parent's params. The base runs first; the
//! extension receives the base result plus the untouched raw mapping, and
//! wins per-key on conflict. Chained `compose` calls associate left-to-right,
//! each layer seeing the fully merged result of all prior layers.

use std::error::Error;
use std::rc::{Rc, Weak};

use crate::error::ValidationError;
use crate::value::SearchMap;

/// What a validator closure returns. Any error type converts into the boxed
/// form; the wrapper turns it into a [`ValidationError`] with the message
/// preserved.
pub type ValidateResult = Result<SearchMap, Box<dyn Error>>;

type ValidateFn = dyn Fn(&SearchMap) -> ValidateResult;

/// Opaque identity of a validator, derived from its allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidatorId(usize);

/// A cloneable handle around a search-validation function.
#[derive(Clone)]
pub struct Validator {
	inner: Rc<ValidateFn>,
}

impl Validator {
	/// Wraps a fallible validation function.
	pub fn new(f: impl Fn(&SearchMap) -> ValidateResult + 'static) -> Self {
		Self { inner: Rc::new(f) }
	}

	/// Wraps a validation function that cannot fail.
	pub fn infallible(f: impl Fn(&SearchMap) -> SearchMap + 'static) -> Self {
		Self::new(move |raw| Ok(f(raw)))
	}

	/// Runs the validator, wrapping any failure into [`ValidationError`].
	pub fn validate(&self, raw: &SearchMap) -> Result<SearchMap, ValidationError> {
		(self.inner)(raw).map_err(|err| ValidationError::new(err.to_string()))
	}

	/// Layers `extend` on top of `self`.
	///
	/// `extend` receives the base result and the original raw mapping, and
	/// its keys win on conflict in the shallow merge.
	pub fn compose(
		&self,
		extend: impl Fn(&SearchMap, &SearchMap) -> ValidateResult + 'static,
	) -> Validator {
		let base = Rc::clone(&self.inner);
		Validator::new(move |raw| {
			let base_result = base(raw)?;
			let extend_result = extend(&base_result, raw)?;
			let mut merged = base_result;
			merged.extend(extend_result);
			Ok(merged)
		})
	}

	/// The cache key identity of this validator.
	pub fn id(&self) -> ValidatorId {
		ValidatorId(Rc::as_ptr(&self.inner) as *const () as usize)
	}

	pub(crate) fn downgrade(&self) -> Weak<ValidateFn> {
		Rc::downgrade(&self.inner)
	}

	pub(crate) fn func(&self) -> &Rc<ValidateFn> {
		&self.inner
	}
}

impl std::fmt::Debug for Validator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Validator").field("id", &self.id()).finish()
	}
}
