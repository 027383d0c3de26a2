/// Typed slices and array nodes
pub mod array;
/// Object nodes with ordered fields
pub mod object;
/// Symbol nodes
pub mod symbol;

use serde::{Deserialize, Serialize};

pub use self::array::{Array, Slice, SliceKind};
pub use self::object::Object;
pub use self::symbol::Symbol;

/// A node in the intermediate value tree
///
/// Every host value is converted into a `Node` before it is written, and every
/// decoded frame produces a `Node` before it is converted back. Nodes are
/// plain values: they do not reference each other, so a tree of nodes is
/// acyclic by construction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Node {
	/// The null value, shared by every node kind
	#[default]
	Null,
	/// A boolean value
	Bool(bool),
	/// A signed integer, written as a zigzag varint
	Varint(i64),
	/// A single-precision float
	Float32(f32),
	/// A double-precision float
	Float64(f64),
	/// A UTF-8 string
	String(String),
	/// A string drawn from a small, repeating vocabulary
	Symbol(Symbol),
	/// An array of values, stored as typed slices
	Array(Array),
	/// An object with ordered fields
	Object(Object),
}

impl Node {
	/// The null node.
	pub const NULL: Node = Node::Null;

	/// Check if this node is null.
	pub fn is_null(&self) -> bool {
		matches!(self, Node::Null)
	}

	/// The name of this node's kind, as used in error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Node::Null => "null",
			Node::Bool(_) => "bool",
			Node::Varint(_) => "varint",
			Node::Float32(_) => "float32",
			Node::Float64(_) => "float64",
			Node::String(_) => "string",
			Node::Symbol(_) => "symbol",
			Node::Array(_) => "array",
			Node::Object(_) => "object",
		}
	}

	/// The slice kind this node is collected into when it appears in an array.
	pub fn slice_kind(&self) -> SliceKind {
		match self {
			Node::Null => SliceKind::Null,
			Node::Bool(_) => SliceKind::Bool,
			Node::Varint(_) => SliceKind::Long,
			Node::Float32(_) => SliceKind::Float,
			Node::Float64(_) => SliceKind::Double,
			Node::String(_) => SliceKind::String,
			Node::Symbol(_) => SliceKind::Symbol,
			Node::Array(_) => SliceKind::Array,
			Node::Object(_) => SliceKind::Object,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Node::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Node::Varint(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Node::Float32(v) => Some(f64::from(*v)),
			Node::Float64(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the text of a string or symbol node.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Node::String(v) => Some(v),
			Node::Symbol(v) => Some(v.as_str()),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&Array> {
		match self {
			Node::Array(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&Object> {
		match self {
			Node::Object(v) => Some(v),
			_ => None,
		}
	}
}

impl From<bool> for Node {
	fn from(v: bool) -> Self {
		Node::Bool(v)
	}
}

macro_rules! impl_from_int {
	($($t:ty),*) => {
		$(
			impl From<$t> for Node {
				fn from(v: $t) -> Self {
					Node::Varint(i64::from(v))
				}
			}
		)*
	};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Node {
	fn from(v: f32) -> Self {
		Node::Float32(v)
	}
}

impl From<f64> for Node {
	fn from(v: f64) -> Self {
		Node::Float64(v)
	}
}

impl From<String> for Node {
	fn from(v: String) -> Self {
		Node::String(v)
	}
}

impl From<&str> for Node {
	fn from(v: &str) -> Self {
		Node::String(v.to_owned())
	}
}

impl From<Symbol> for Node {
	fn from(v: Symbol) -> Self {
		Node::Symbol(v)
	}
}

impl From<Array> for Node {
	fn from(v: Array) -> Self {
		Node::Array(v)
	}
}

impl From<Slice> for Node {
	fn from(v: Slice) -> Self {
		Node::Array(Array::from(v))
	}
}

impl From<Object> for Node {
	fn from(v: Object) -> Self {
		Node::Object(v)
	}
}

impl From<Vec<Node>> for Node {
	fn from(v: Vec<Node>) -> Self {
		Node::Array(Array::from_nodes(v))
	}
}

impl<T: Into<Node>> From<Option<T>> for Node {
	fn from(v: Option<T>) -> Self {
		v.map_or(Node::Null, Into::into)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_null_is_default() {
		assert!(Node::default().is_null());
		assert!(Node::from(None::<i64>).is_null());
		assert!(!Node::from(0i64).is_null());
	}

	#[test]
	fn test_slice_kind_of_scalars() {
		assert_eq!(Node::from(1i32).slice_kind(), SliceKind::Long);
		assert_eq!(Node::from(1.0f32).slice_kind(), SliceKind::Float);
		assert_eq!(Node::from(1.0f64).slice_kind(), SliceKind::Double);
		assert_eq!(Node::from(Symbol::from("RED")).slice_kind(), SliceKind::Symbol);
	}

	#[test]
	fn test_as_str_covers_symbols() {
		assert_eq!(Node::from("abc").as_str(), Some("abc"));
		assert_eq!(Node::from(Symbol::from("RED")).as_str(), Some("RED"));
		assert_eq!(Node::from(1i64).as_str(), None);
	}

	#[test]
	fn test_serde_json() {
		let node = Node::from(vec![Node::from(1i64), Node::from("a")]);
		let json = serde_json::to_string(&node).unwrap();
		let back: Node = serde_json::from_str(&json).unwrap();
		assert_eq!(node, back);
	}
}
