use thiserror::Error;

/// An error originating from packwire.
///
/// Errors fall into three groups. A capacity error fails the frame being
/// written, and the write can be retried with a larger limit. Malformed-stream
/// errors are fatal for the whole stream, since dictionary state on both ends
/// may have diverged. Conversion errors are local to the value being
/// converted.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// A write would exceed the capacity of the output buffer
	#[error("Tried to write {need} bytes, but only {available} bytes of capacity remain")]
	OutOfSpace {
		need: usize,
		available: usize,
	},

	/// The input ended in the middle of a value
	#[error("Tried to read {need} bytes, but only {available} bytes remain")]
	UnexpectedEnd {
		need: usize,
		available: usize,
	},

	/// The input contained a value which is not valid at this position
	#[error("Unexpected data while reading: {0}")]
	UnexpectedRead(String),

	/// The input referenced an unknown pool entry
	#[error("Invalid data: {0}")]
	InvalidData(String),

	/// No converter path exists between two types
	#[error("Can't convert {from} to {into}")]
	UnsupportedConversion {
		from: String,
		into: String,
	},

	/// A converter received a value it cannot represent in the target type
	#[error("Expected {expected}, but found {found}")]
	InvalidValue {
		expected: String,
		found: String,
	},

	/// A custom error has been thrown by a converter
	#[error("An error occurred: {0}")]
	Thrown(String),
}

impl Error {
	/// Check if this error leaves the stream in an unusable state.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Error::UnexpectedEnd { .. } | Error::UnexpectedRead(_) | Error::InvalidData(_))
	}

	/// Check if this error was raised because a frame outgrew its limit.
	pub fn is_capacity(&self) -> bool {
		matches!(self, Error::OutOfSpace { .. })
	}

	/// Check if this error was raised while converting a value.
	pub fn is_conversion(&self) -> bool {
		matches!(
			self,
			Error::UnsupportedConversion { .. } | Error::InvalidValue { .. } | Error::Thrown(_)
		)
	}

	pub(crate) fn unsupported(from: impl Into<String>, into: impl Into<String>) -> Self {
		Error::UnsupportedConversion {
			from: from.into(),
			into: into.into(),
		}
	}

	pub(crate) fn invalid_value(expected: impl Into<String>, found: impl Into<String>) -> Self {
		Error::InvalidValue {
			expected: expected.into(),
			found: found.into(),
		}
	}
}

impl From<anyhow::Error> for Error {
	fn from(e: anyhow::Error) -> Self {
		match e.downcast::<Error>() {
			Ok(e) => e,
			Err(e) => Error::Thrown(e.to_string()),
		}
	}
}
