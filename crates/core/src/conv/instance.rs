use std::any::Any;
use std::fmt::{self, Debug, Formatter};

use super::TypeKey;

/// A type-erased host value
///
/// Host values travel through conversion pipelines as instances. The type
/// key is captured when the instance is created, so that the registry can
/// route a value without knowing its static type. A missing value is
/// represented by `Option::None` rather than by an instance.
pub struct Instance {
	key: TypeKey,
	value: Box<dyn Any + Send + Sync>,
}

impl Instance {
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Instance {
			key: TypeKey::of::<T>(),
			value: Box::new(value),
		}
	}

	pub fn type_key(&self) -> TypeKey {
		self.key
	}

	pub fn is<T: Any>(&self) -> bool {
		self.value.is::<T>()
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.downcast_ref::<T>()
	}

	/// Takes the value out of the instance, or hands the instance back if it
	/// holds a different type.
	pub fn downcast<T: Any>(self) -> Result<T, Instance> {
		let key = self.key;
		match self.value.downcast::<T>() {
			Ok(v) => Ok(*v),
			Err(value) => Err(Instance {
				key,
				value,
			}),
		}
	}
}

impl Debug for Instance {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Instance").field(&self.key.name()).finish()
	}
}
