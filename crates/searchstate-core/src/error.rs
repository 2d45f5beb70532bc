//! Error types for search-state validation.

/// Error produced when a search validator rejects its input.
///
/// Wraps whatever error the host-supplied validator returned, preserving the
/// original message. Validation failures are programming errors in host
/// code: they surface synchronously and are never retried or swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("search validation failed: {message}")]
pub struct ValidationError {
	message: String,
}

impl ValidationError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}

	/// The original validator error message.
	pub fn message(&self) -> &str {
		&self.message
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_preserves_original_message() {
		let err = ValidationError::new("page must be a number");
		assert_eq!(err.message(), "page must be a number");
		assert_eq!(
			err.to_string(),
			"search validation failed: page must be a number"
		);
	}
}
