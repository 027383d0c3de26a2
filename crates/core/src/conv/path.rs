use std::collections::HashMap;
use std::sync::Arc;

use super::map::ConverterMap;
use super::{ConverterMethod, TypeKey};

/// How many times each type has been entered on the current branch.
type Visits = HashMap<TypeKey, u32>;

/// A chain of converter methods and its total cost
#[derive(Clone, Debug)]
pub struct Path {
	distance: u32,
	methods: Vec<Arc<ConverterMethod>>,
}

impl Path {
	/// A path which leaves the value as it is, or applies the single method
	/// registered for converting a type into itself.
	fn identity(method: Option<&Arc<ConverterMethod>>) -> Self {
		Path {
			distance: method.map_or(0, |m| m.distance()),
			methods: method.into_iter().cloned().collect(),
		}
	}

	fn prepend(mut self, method: &Arc<ConverterMethod>) -> Self {
		self.distance = self.distance.saturating_add(method.distance());
		self.methods.insert(0, method.clone());
		self
	}

	pub fn distance(&self) -> u32 {
		self.distance
	}

	pub fn methods(&self) -> &[Arc<ConverterMethod>] {
		&self.methods
	}

	pub fn is_empty(&self) -> bool {
		self.methods.is_empty()
	}
}

impl ConverterMap {
	/// Finds the cheapest chain of methods converting `src` into `tgt`.
	///
	/// Among paths of equal cost, the one discovered first wins, so the
	/// result only depends on registration order.
	pub fn find_path(&self, src: TypeKey, tgt: TypeKey) -> Option<Path> {
		self.search(&Visits::new(), src, tgt)
	}

	fn search(&self, visits: &Visits, src: TypeKey, tgt: TypeKey) -> Option<Path> {
		if src == tgt {
			return Some(Path::identity(self.get(src, tgt)));
		}
		// Each branch works on its own copy of the visit counts
		let mut visits = visits.clone();
		*visits.entry(src).or_default() += 1;
		let mut best: Option<Path> = None;
		for route in self.routes(src) {
			let times = visits.get(&route.tgt()).copied().unwrap_or(0);
			// A self-loop may be passed through once, any other type is entered once
			if route.is_self_loop() {
				if times >= 2 {
					continue;
				}
			} else if times >= 1 {
				continue;
			}
			let next = if route.is_extensible() && self.is_assignable(route.tgt(), tgt) {
				self.search(&visits, tgt, tgt)
			} else {
				self.search(&visits, route.tgt(), tgt)
			};
			let Some(next) = next else {
				continue;
			};
			let path = next.prepend(route);
			if best.as_ref().is_none_or(|b| path.distance < b.distance) {
				best = Some(path);
			}
		}
		best
	}
}
