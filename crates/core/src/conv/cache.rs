//! A concurrent cache of conversion pipelines.
//!
//! Lookups never take a lock, so converting values on many threads does not
//! contend on the cache. Values are reference counted and cloned out of the
//! map, the pinned guard never escapes a method.

use std::sync::Arc;

use super::{Pipeline, TypeKey};

type Key = (TypeKey, TypeKey);

#[derive(Debug, Default)]
pub(crate) struct PipelineCache(papaya::HashMap<Key, Arc<Pipeline>>);

impl PipelineCache {
	pub fn new() -> Self {
		Self(Default::default())
	}

	/// Returns the cached pipeline for a pair of types.
	pub fn get(&self, src: TypeKey, tgt: TypeKey) -> Option<Arc<Pipeline>> {
		self.0.pin().get(&(src, tgt)).cloned()
	}

	/// Caches a pipeline, replacing any previous entry for the same pair.
	pub fn insert(&self, pipeline: Arc<Pipeline>) {
		self.0.pin().insert((pipeline.src(), pipeline.tgt()), pipeline);
	}

	/// Removes every cached pipeline.
	pub fn clear(&self) {
		self.0.pin().clear();
	}

	pub fn len(&self) -> usize {
		self.0.pin().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::conv::Registry;

	#[test]
	fn test_insert_get_clear() {
		let registry = Registry::default();
		let src = TypeKey::of::<i32>();
		let tgt = TypeKey::of::<i64>();
		let path = registry.find_path(src, tgt).unwrap();

		let cache = PipelineCache::new();
		assert!(cache.get(src, tgt).is_none());
		cache.insert(Arc::new(Pipeline::new(src, tgt, path)));
		assert_eq!(cache.get(src, tgt).unwrap().distance(), 1);
		assert!(cache.get(tgt, src).is_none());
		assert_eq!(cache.len(), 1);

		cache.clear();
		assert_eq!(cache.len(), 0);
	}
}
