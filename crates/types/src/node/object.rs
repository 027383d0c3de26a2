use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Node;

/// An object with ordered fields
///
/// Field order is insertion order, and it is significant: two objects with
/// the same fields in a different order have different schemas on the wire.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object(pub(crate) IndexMap<String, Node>);

impl Object {
	/// Create a new empty object
	pub fn new() -> Self {
		Object(IndexMap::new())
	}

	/// Create a new empty object with room for `capacity` fields
	pub fn with_capacity(capacity: usize) -> Self {
		Object(IndexMap::with_capacity(capacity))
	}

	/// Insert a field, returning the previous value if the field existed.
	///
	/// An existing field keeps its position.
	pub fn insert(&mut self, key: String, value: Node) -> Option<Node> {
		self.0.insert(key, value)
	}

	pub fn get(&self, key: &str) -> Option<&Node> {
		self.0.get(key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// The field names, in order
	pub fn keys(&self) -> indexmap::map::Keys<'_, String, Node> {
		self.0.keys()
	}

	/// The field values, in order
	pub fn values(&self) -> indexmap::map::Values<'_, String, Node> {
		self.0.values()
	}

	pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
		self.0.iter()
	}
}

impl PartialEq for Object {
	fn eq(&self, other: &Self) -> bool {
		// IndexMap equality ignores order
		self.0.len() == other.0.len() && self.0.iter().eq(other.0.iter())
	}
}

impl IntoIterator for Object {
	type Item = (String, Node);
	type IntoIter = indexmap::map::IntoIter<String, Node>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a Object {
	type Item = (&'a String, &'a Node);
	type IntoIter = indexmap::map::Iter<'a, String, Node>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Object {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

impl From<IndexMap<String, Node>> for Object {
	fn from(v: IndexMap<String, Node>) -> Self {
		Object(v)
	}
}
