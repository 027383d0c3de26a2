use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use super::{Context, Instance, TypeKey};
use crate::err::Error;

/// The callable behind a converter method.
pub type ConvertFn = Arc<dyn Fn(Instance, &Context<'_>) -> anyhow::Result<Instance> + Send + Sync>;

/// A single edge in the conversion graph
///
/// An extensible method declares a generic target type. When the requested
/// type is a subtype of that target, the router treats the method as
/// producing the requested type directly, and the callable receives the
/// concrete request through [`Context::target`].
#[derive(Clone)]
pub struct ConverterMethod {
	src: TypeKey,
	tgt: TypeKey,
	distance: u32,
	extensible: bool,
	apply: ConvertFn,
}

impl ConverterMethod {
	pub fn new(src: TypeKey, tgt: TypeKey, distance: u32, extensible: bool, apply: ConvertFn) -> Self {
		ConverterMethod {
			src,
			tgt,
			distance,
			extensible,
			apply,
		}
	}

	pub fn src(&self) -> TypeKey {
		self.src
	}

	pub fn tgt(&self) -> TypeKey {
		self.tgt
	}

	pub fn distance(&self) -> u32 {
		self.distance
	}

	pub fn is_extensible(&self) -> bool {
		self.extensible
	}

	/// Check if this method converts a type into itself.
	pub fn is_self_loop(&self) -> bool {
		self.src == self.tgt
	}

	/// Check if both methods connect the same types with the same callable.
	pub(crate) fn is_same(&self, other: &ConverterMethod) -> bool {
		self.src == other.src && self.tgt == other.tgt && Arc::ptr_eq(&self.apply, &other.apply)
	}

	pub fn apply(&self, value: Instance, ctx: &Context<'_>) -> Result<Instance, Error> {
		(self.apply)(value, ctx).map_err(Error::from)
	}
}

impl Debug for ConverterMethod {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConverterMethod")
			.field("src", &self.src.name())
			.field("tgt", &self.tgt.name())
			.field("distance", &self.distance)
			.field("extensible", &self.extensible)
			.finish()
	}
}
