use serde::{Deserialize, Serialize};

use crate::{Node, Object, Symbol};

/// The element kind of a typed slice
///
/// The discriminant is the value written in slice headers on the wire.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum SliceKind {
	Null = 0,
	Bool = 1,
	Byte = 2,
	Short = 3,
	Int = 4,
	Long = 5,
	Float = 6,
	Double = 7,
	String = 8,
	Symbol = 9,
	Object = 10,
	Array = 11,
}

impl TryFrom<u8> for SliceKind {
	type Error = u8;

	fn try_from(v: u8) -> Result<Self, Self::Error> {
		Ok(match v {
			0 => SliceKind::Null,
			1 => SliceKind::Bool,
			2 => SliceKind::Byte,
			3 => SliceKind::Short,
			4 => SliceKind::Int,
			5 => SliceKind::Long,
			6 => SliceKind::Float,
			7 => SliceKind::Double,
			8 => SliceKind::String,
			9 => SliceKind::Symbol,
			10 => SliceKind::Object,
			11 => SliceKind::Array,
			v => return Err(v),
		})
	}
}

/// A homogeneous run of array elements
///
/// Primitive runs are stored unboxed. A run of nulls only stores its length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Slice {
	Null(usize),
	Bool(Vec<bool>),
	Byte(Vec<i8>),
	Short(Vec<i16>),
	Int(Vec<i32>),
	Long(Vec<i64>),
	Float(Vec<f32>),
	Double(Vec<f64>),
	String(Vec<String>),
	Symbol(Vec<Symbol>),
	Object(Vec<Object>),
	Array(Vec<Array>),
}

/// Applies the same expression to the vector of every non-null slice.
macro_rules! each_vec {
	($slice:expr, $v:ident => $e:expr, $null:ident => $n:expr) => {
		match $slice {
			Slice::Null($null) => $n,
			Slice::Bool($v) => $e,
			Slice::Byte($v) => $e,
			Slice::Short($v) => $e,
			Slice::Int($v) => $e,
			Slice::Long($v) => $e,
			Slice::Float($v) => $e,
			Slice::Double($v) => $e,
			Slice::String($v) => $e,
			Slice::Symbol($v) => $e,
			Slice::Object($v) => $e,
			Slice::Array($v) => $e,
		}
	};
}

impl Slice {
	/// An empty slice of the given kind.
	pub fn empty(kind: SliceKind) -> Self {
		match kind {
			SliceKind::Null => Slice::Null(0),
			SliceKind::Bool => Slice::Bool(Vec::new()),
			SliceKind::Byte => Slice::Byte(Vec::new()),
			SliceKind::Short => Slice::Short(Vec::new()),
			SliceKind::Int => Slice::Int(Vec::new()),
			SliceKind::Long => Slice::Long(Vec::new()),
			SliceKind::Float => Slice::Float(Vec::new()),
			SliceKind::Double => Slice::Double(Vec::new()),
			SliceKind::String => Slice::String(Vec::new()),
			SliceKind::Symbol => Slice::Symbol(Vec::new()),
			SliceKind::Object => Slice::Object(Vec::new()),
			SliceKind::Array => Slice::Array(Vec::new()),
		}
	}

	pub fn kind(&self) -> SliceKind {
		match self {
			Slice::Null(_) => SliceKind::Null,
			Slice::Bool(_) => SliceKind::Bool,
			Slice::Byte(_) => SliceKind::Byte,
			Slice::Short(_) => SliceKind::Short,
			Slice::Int(_) => SliceKind::Int,
			Slice::Long(_) => SliceKind::Long,
			Slice::Float(_) => SliceKind::Float,
			Slice::Double(_) => SliceKind::Double,
			Slice::String(_) => SliceKind::String,
			Slice::Symbol(_) => SliceKind::Symbol,
			Slice::Object(_) => SliceKind::Object,
			Slice::Array(_) => SliceKind::Array,
		}
	}

	pub fn len(&self) -> usize {
		each_vec!(self, v => v.len(), n => *n)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the element at `index` as a node.
	pub fn get(&self, index: usize) -> Option<Node> {
		if index >= self.len() {
			return None;
		}
		Some(match self {
			Slice::Null(_) => Node::Null,
			Slice::Bool(v) => Node::Bool(v[index]),
			Slice::Byte(v) => Node::Varint(i64::from(v[index])),
			Slice::Short(v) => Node::Varint(i64::from(v[index])),
			Slice::Int(v) => Node::Varint(i64::from(v[index])),
			Slice::Long(v) => Node::Varint(v[index]),
			Slice::Float(v) => Node::Float32(v[index]),
			Slice::Double(v) => Node::Float64(v[index]),
			Slice::String(v) => Node::String(v[index].clone()),
			Slice::Symbol(v) => Node::Symbol(v[index].clone()),
			Slice::Object(v) => Node::Object(v[index].clone()),
			Slice::Array(v) => Node::Array(v[index].clone()),
		})
	}

	/// Appends every element of this slice to `out` as a node.
	pub fn push_nodes(self, out: &mut Vec<Node>) {
		match self {
			Slice::Null(n) => out.extend(std::iter::repeat_n(Node::Null, n)),
			Slice::Bool(v) => out.extend(v.into_iter().map(Node::Bool)),
			Slice::Byte(v) => out.extend(v.into_iter().map(Node::from)),
			Slice::Short(v) => out.extend(v.into_iter().map(Node::from)),
			Slice::Int(v) => out.extend(v.into_iter().map(Node::from)),
			Slice::Long(v) => out.extend(v.into_iter().map(Node::Varint)),
			Slice::Float(v) => out.extend(v.into_iter().map(Node::Float32)),
			Slice::Double(v) => out.extend(v.into_iter().map(Node::Float64)),
			Slice::String(v) => out.extend(v.into_iter().map(Node::String)),
			Slice::Symbol(v) => out.extend(v.into_iter().map(Node::Symbol)),
			Slice::Object(v) => out.extend(v.into_iter().map(Node::Object)),
			Slice::Array(v) => out.extend(v.into_iter().map(Node::Array)),
		}
	}

	/// Appends `other` to this slice if both have the same kind, otherwise
	/// hands `other` back.
	pub fn merge(&mut self, other: Slice) -> Result<(), Slice> {
		match (self, other) {
			(Slice::Null(a), Slice::Null(b)) => *a += b,
			(Slice::Bool(a), Slice::Bool(b)) => a.extend(b),
			(Slice::Byte(a), Slice::Byte(b)) => a.extend(b),
			(Slice::Short(a), Slice::Short(b)) => a.extend(b),
			(Slice::Int(a), Slice::Int(b)) => a.extend(b),
			(Slice::Long(a), Slice::Long(b)) => a.extend(b),
			(Slice::Float(a), Slice::Float(b)) => a.extend(b),
			(Slice::Double(a), Slice::Double(b)) => a.extend(b),
			(Slice::String(a), Slice::String(b)) => a.extend(b),
			(Slice::Symbol(a), Slice::Symbol(b)) => a.extend(b),
			(Slice::Object(a), Slice::Object(b)) => a.extend(b),
			(Slice::Array(a), Slice::Array(b)) => a.extend(b),
			(_, other) => return Err(other),
		}
		Ok(())
	}
}

macro_rules! impl_slice_from_vec {
	($($t:ty => $variant:ident),* $(,)?) => {
		$(
			impl From<Vec<$t>> for Slice {
				fn from(v: Vec<$t>) -> Self {
					Slice::$variant(v)
				}
			}

			impl From<Vec<$t>> for Array {
				fn from(v: Vec<$t>) -> Self {
					Array::from(Slice::$variant(v))
				}
			}

			impl From<Vec<$t>> for Node {
				fn from(v: Vec<$t>) -> Self {
					Node::Array(Array::from(Slice::$variant(v)))
				}
			}
		)*
	};
}

impl_slice_from_vec! {
	bool => Bool,
	i8 => Byte,
	i16 => Short,
	i32 => Int,
	i64 => Long,
	f32 => Float,
	f64 => Double,
	String => String,
	Symbol => Symbol,
	Object => Object,
	Array => Array,
}

/// An array node
///
/// An array is either a single typed slice, or a mixed array made of two or
/// more slices of different kinds. Construction always normalises the
/// slices: empty slices are dropped, adjacent slices of the same kind are
/// merged, and an array without elements keeps the kind of its first slice.
/// A mixed array therefore never contains another mixed array, and two
/// arrays with the same elements have the same layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Slice>", into = "Vec<Slice>")]
pub struct Array {
	slices: Vec<Slice>,
}

impl Array {
	/// An array without elements.
	pub fn empty() -> Self {
		Array {
			slices: vec![Slice::Null(0)],
		}
	}

	pub fn from_slices(slices: impl IntoIterator<Item = Slice>) -> Self {
		let mut out: Vec<Slice> = Vec::new();
		let mut first = None;
		for slice in slices {
			if slice.is_empty() {
				first.get_or_insert(slice);
				continue;
			}
			match out.last_mut() {
				Some(last) => {
					if let Err(slice) = last.merge(slice) {
						out.push(slice);
					}
				}
				None => out.push(slice),
			}
		}
		if out.is_empty() {
			out.push(first.unwrap_or(Slice::Null(0)));
		}
		Array {
			slices: out,
		}
	}

	/// Slices a sequence of nodes into typed runs.
	pub fn from_nodes(nodes: Vec<Node>) -> Self {
		crate::slicer::slice_nodes(nodes)
	}

	pub fn slices(&self) -> &[Slice] {
		&self.slices
	}

	pub fn into_slices(self) -> Vec<Slice> {
		self.slices
	}

	/// Check if this array holds more than one slice kind.
	pub fn is_mixed(&self) -> bool {
		self.slices.len() > 1
	}

	/// The element kind of a non-mixed array.
	pub fn kind(&self) -> Option<SliceKind> {
		match self.slices.as_slice() {
			[slice] => Some(slice.kind()),
			_ => None,
		}
	}

	/// The total number of elements across all slices.
	pub fn len(&self) -> usize {
		self.slices.iter().map(Slice::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the element at `index` as a node.
	pub fn get(&self, mut index: usize) -> Option<Node> {
		for slice in &self.slices {
			if index < slice.len() {
				return slice.get(index);
			}
			index -= slice.len();
		}
		None
	}

	/// Flattens the array back into a sequence of nodes, in order.
	pub fn into_nodes(self) -> Vec<Node> {
		let mut out = Vec::with_capacity(self.len());
		for slice in self.slices {
			slice.push_nodes(&mut out);
		}
		out
	}
}

impl Default for Array {
	fn default() -> Self {
		Array::empty()
	}
}

impl From<Slice> for Array {
	fn from(v: Slice) -> Self {
		Array {
			slices: vec![v],
		}
	}
}

impl From<Vec<Slice>> for Array {
	fn from(v: Vec<Slice>) -> Self {
		Array::from_slices(v)
	}
}

impl From<Array> for Vec<Slice> {
	fn from(v: Array) -> Self {
		v.slices
	}
}

impl From<Vec<Node>> for Array {
	fn from(v: Vec<Node>) -> Self {
		Array::from_nodes(v)
	}
}

impl FromIterator<Node> for Array {
	fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
		Array::from_nodes(iter.into_iter().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_slices_merges_adjacent_kinds() {
		let arr = Array::from_slices(vec![
			Slice::Long(vec![1, 2]),
			Slice::Long(vec![3]),
			Slice::Null(1),
			Slice::Null(2),
		]);
		assert_eq!(arr.slices(), &[Slice::Long(vec![1, 2, 3]), Slice::Null(3)]);
		assert!(arr.is_mixed());
		assert_eq!(arr.len(), 6);
	}

	#[test]
	fn test_from_slices_drops_empty_slices() {
		let arr = Array::from_slices(vec![Slice::Int(vec![]), Slice::Bool(vec![true])]);
		assert_eq!(arr.kind(), Some(SliceKind::Bool));
		assert!(!arr.is_mixed());
	}

	#[test]
	fn test_empty_keeps_first_kind() {
		let arr = Array::from_slices(vec![Slice::Int(vec![]), Slice::String(vec![])]);
		assert_eq!(arr.kind(), Some(SliceKind::Int));
		assert!(arr.is_empty());
		assert_eq!(Array::from_slices(vec![]).kind(), Some(SliceKind::Null));
	}

	#[test]
	fn test_get_spans_slices() {
		let arr = Array::from_slices(vec![Slice::Bool(vec![true]), Slice::Int(vec![7, 8])]);
		assert_eq!(arr.get(0), Some(Node::Bool(true)));
		assert_eq!(arr.get(2), Some(Node::Varint(8)));
		assert_eq!(arr.get(3), None);
	}

	#[test]
	fn test_slice_kind_discriminants() {
		for v in 0u8..12 {
			let kind = SliceKind::try_from(v).unwrap();
			assert_eq!(kind as u8, v);
			assert_eq!(Slice::empty(kind).kind(), kind);
		}
		assert_eq!(SliceKind::try_from(12), Err(12));
	}
}
