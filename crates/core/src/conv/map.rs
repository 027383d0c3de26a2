use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use super::{ConverterMethod, TypeKey};

/// The conversion graph
///
/// Methods are kept per source type in registration order, which is the
/// order the router discovers them in.
#[derive(Debug, Default)]
pub(crate) struct ConverterMap {
	routes: HashMap<TypeKey, Vec<Arc<ConverterMethod>>>,
	supertypes: HashMap<TypeKey, Vec<TypeKey>>,
	codecs: HashSet<TypeId>,
}

impl ConverterMap {
	/// Adds a method, returning false if the same method is already present.
	pub fn put(&mut self, method: ConverterMethod) -> bool {
		let routes = self.routes.entry(method.src()).or_default();
		if routes.iter().any(|m| m.is_same(&method)) {
			return false;
		}
		routes.push(Arc::new(method));
		true
	}

	/// Removes every method converting `src` into `tgt`, returning false if
	/// there was none.
	pub fn remove(&mut self, src: TypeKey, tgt: TypeKey) -> bool {
		let Some(routes) = self.routes.get_mut(&src) else {
			return false;
		};
		let before = routes.len();
		routes.retain(|m| m.tgt() != tgt);
		before != routes.len()
	}

	/// Records that `sub` can be used wherever `sup` is expected.
	pub fn put_subtype(&mut self, sub: TypeKey, sup: TypeKey) -> bool {
		let supertypes = self.supertypes.entry(sub).or_default();
		if supertypes.contains(&sup) {
			return false;
		}
		supertypes.push(sup);
		true
	}

	/// Marks a codec as installed, returning false if it already was.
	pub fn put_codec(&mut self, codec: TypeId) -> bool {
		self.codecs.insert(codec)
	}

	/// The methods leaving `src`, in registration order.
	pub fn routes(&self, src: TypeKey) -> &[Arc<ConverterMethod>] {
		self.routes.get(&src).map(Vec::as_slice).unwrap_or_default()
	}

	/// The first method registered for exactly this pair of types.
	pub fn get(&self, src: TypeKey, tgt: TypeKey) -> Option<&Arc<ConverterMethod>> {
		self.routes(src).iter().find(|m| m.tgt() == tgt)
	}

	/// Check if a value of type `sub` is also a value of type `sup`.
	pub fn is_assignable(&self, sup: TypeKey, sub: TypeKey) -> bool {
		if sup == sub {
			return true;
		}
		let mut seen = HashSet::from([sub]);
		let mut queue = VecDeque::from([sub]);
		while let Some(ty) = queue.pop_front() {
			for parent in self.supertypes.get(&ty).into_iter().flatten() {
				if *parent == sup {
					return true;
				}
				if seen.insert(*parent) {
					queue.push_back(*parent);
				}
			}
		}
		false
	}

	pub fn len(&self) -> usize {
		self.routes.values().map(Vec::len).sum()
	}
}
