use std::any::{Any, type_name};
use std::sync::Arc;

use super::{Context, ConvertFn, ConverterMethod, Instance, Registry, TypeKey};
use crate::codec::Codec;
use crate::err::Error;

/// The converters contributed by a single codec
///
/// Typed registration helpers wrap a plain Rust function into a
/// [`ConverterMethod`], downcasting the source instance on the way in and
/// boxing the result on the way out.
#[derive(Debug, Default)]
pub struct Converters {
	pub(crate) methods: Vec<ConverterMethod>,
	pub(crate) subtypes: Vec<(TypeKey, TypeKey)>,
}

impl Converters {
	/// Registers a converter from `S` into `T`.
	pub fn add<S, T, F>(&mut self, distance: u32, f: F) -> &mut Self
	where
		S: Any + Send + Sync,
		T: Any + Send + Sync,
		F: Fn(S, &Context<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
	{
		let apply: ConvertFn =
			Arc::new(move |value: Instance, ctx: &Context<'_>| -> anyhow::Result<Instance> {
				f(downcast::<S>(value)?, ctx).map(Instance::new)
			});
		self.methods.push(ConverterMethod::new(
			TypeKey::of::<S>(),
			TypeKey::of::<T>(),
			distance,
			false,
			apply,
		));
		self
	}

	/// Registers an extensible converter from `S` into `T`.
	///
	/// The callable returns an instance of whichever subtype of `T` was
	/// requested, as described by [`Context::target`].
	pub fn extensible<S, T, F>(&mut self, distance: u32, f: F) -> &mut Self
	where
		S: Any + Send + Sync,
		T: Any + Send + Sync,
		F: Fn(S, &Context<'_>) -> anyhow::Result<Instance> + Send + Sync + 'static,
	{
		let apply: ConvertFn =
			Arc::new(move |value: Instance, ctx: &Context<'_>| -> anyhow::Result<Instance> {
				f(downcast::<S>(value)?, ctx)
			});
		self.methods.push(ConverterMethod::new(
			TypeKey::of::<S>(),
			TypeKey::of::<T>(),
			distance,
			true,
			apply,
		));
		self
	}

	/// Declares `Sub` as a subtype of `Sup`, with the upcast used to turn
	/// one into the other.
	pub fn subtype<Sub, Sup, F>(&mut self, f: F) -> &mut Self
	where
		Sub: Any + Send + Sync,
		Sup: Any + Send + Sync,
		F: Fn(Sub) -> Sup + Send + Sync + 'static,
	{
		self.subtypes.push((TypeKey::of::<Sub>(), TypeKey::of::<Sup>()));
		self.add::<Sub, Sup, _>(1, move |v, _| Ok(f(v)))
	}

	/// Registers a raw method.
	pub fn method(&mut self, method: ConverterMethod) -> &mut Self {
		self.methods.push(method);
		self
	}
}

fn downcast<S: Any>(value: Instance) -> anyhow::Result<S> {
	value.downcast::<S>().map_err(|v| {
		anyhow::Error::new(Error::invalid_value(type_name::<S>(), v.type_key().name()))
	})
}

/// Builds a [`Registry`] from an explicit list of codecs and methods
#[derive(Debug)]
pub struct RegistryBuilder {
	registry: Registry,
}

impl RegistryBuilder {
	pub(crate) fn new() -> Self {
		RegistryBuilder {
			registry: Registry::new(),
		}
	}

	/// Adds the built-in codecs.
	pub fn with_defaults(self) -> Self {
		crate::codec::install_defaults(&self.registry);
		self
	}

	pub fn codec<C: Codec>(self, codec: C) -> Self {
		self.registry.install(codec);
		self
	}

	pub fn method(self, method: ConverterMethod) -> Self {
		self.registry.register_method(method);
		self
	}

	pub fn build(self) -> Registry {
		self.registry
	}
}
