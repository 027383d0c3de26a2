use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A string drawn from a small, repeating vocabulary, such as an enum
/// variant name.
///
/// Symbols are written once per stream and then referenced by id, whereas
/// strings are pooled per frame.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
	pub fn new(name: impl Into<String>) -> Self {
		Symbol(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Display for Symbol {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for Symbol {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Symbol {
	fn from(v: &str) -> Self {
		Symbol(v.to_owned())
	}
}

impl From<String> for Symbol {
	fn from(v: String) -> Self {
		Symbol(v)
	}
}
