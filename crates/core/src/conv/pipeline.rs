use std::sync::Arc;

use super::{Context, ConverterMethod, Instance, Path, Registry, TypeKey, XType};
use crate::err::Error;

/// A cached conversion path between two raw types
#[derive(Debug)]
pub struct Pipeline {
	src: TypeKey,
	tgt: TypeKey,
	path: Path,
}

impl Pipeline {
	pub(crate) fn new(src: TypeKey, tgt: TypeKey, path: Path) -> Self {
		Pipeline {
			src,
			tgt,
			path,
		}
	}

	pub fn src(&self) -> TypeKey {
		self.src
	}

	pub fn tgt(&self) -> TypeKey {
		self.tgt
	}

	pub fn distance(&self) -> u32 {
		self.path.distance()
	}

	pub fn steps(&self) -> &[Arc<ConverterMethod>] {
		self.path.methods()
	}

	/// Runs `value` through every step of the pipeline.
	///
	/// Every step sees the full requested type, extensible steps use it to
	/// decide what to build.
	pub fn convert(&self, registry: &Registry, value: Instance, target: &XType) -> Result<Instance, Error> {
		let ctx = Context::new(registry, target);
		self.steps().iter().try_fold(value, |value, step| step.apply(value, &ctx))
	}
}
