use std::any::{Any, TypeId, type_name};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// The identity of a concrete Rust type
///
/// Two keys are equal when they describe the same type, the name is only
/// kept for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	pub fn of<T: Any + ?Sized>() -> Self {
		TypeKey {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl Display for TypeKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// A type descriptor with generic parameters
///
/// Conversion paths are computed between raw types only. The parameters
/// describe what a generic container should hold, for example a list whose
/// elements are all converted to `i64`, and are handed to extensible
/// converters at conversion time.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct XType {
	raw: TypeKey,
	params: Vec<XType>,
}

impl XType {
	pub fn of<T: Any + ?Sized>() -> Self {
		XType {
			raw: TypeKey::of::<T>(),
			params: Vec::new(),
		}
	}

	/// Appends a generic parameter to this descriptor.
	pub fn with_param(mut self, param: XType) -> Self {
		self.params.push(param);
		self
	}

	pub fn raw(&self) -> TypeKey {
		self.raw
	}

	pub fn params(&self) -> &[XType] {
		&self.params
	}

	/// The first generic parameter, such as the element type of a collection.
	pub fn param(&self) -> Option<&XType> {
		self.params.first()
	}

	/// Check if this descriptor has no generic parameters.
	pub fn is_pure(&self) -> bool {
		self.params.is_empty()
	}
}

impl From<TypeKey> for XType {
	fn from(raw: TypeKey) -> Self {
		XType {
			raw,
			params: Vec::new(),
		}
	}
}

impl Display for XType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.raw.name)?;
		if let Some((first, rest)) = self.params.split_first() {
			write!(f, "<{first}")?;
			for param in rest {
				write!(f, ", {param}")?;
			}
			f.write_str(">")?;
		}
		Ok(())
	}
}
