//! The converter registry and path router.
//!
//! Converters are edges of a directed graph between Rust types. Converting a
//! value searches the graph for the cheapest chain of edges from the value's
//! runtime type to the requested type, and caches the resulting pipeline.
//! Installing new converters invalidates every cached pipeline.

mod builder;
mod cache;
mod instance;
mod map;
mod method;
mod path;
mod pipeline;
mod xtype;

use std::any::{Any, TypeId};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use packwire_types::Node;
use parking_lot::RwLock;

pub use self::builder::{Converters, RegistryBuilder};
use self::cache::PipelineCache;
pub use self::instance::Instance;
use self::map::ConverterMap;
pub use self::method::{ConvertFn, ConverterMethod};
pub use self::path::Path;
pub use self::pipeline::Pipeline;
pub use self::xtype::{TypeKey, XType};
use crate::codec::Codec;
use crate::err::Error;

/// The converter registry
///
/// The registry is safe to share between threads. Conversions only take a
/// read lock on the graph while a missing pipeline is computed, so readers
/// never wait on each other. Registrations take the write lock and clear the
/// pipeline cache before releasing it.
pub struct Registry {
	graph: RwLock<ConverterMap>,
	pipelines: PipelineCache,
}

impl Default for Registry {
	/// Creates a registry with the built-in codecs installed.
	fn default() -> Self {
		Registry::builder().with_defaults().build()
	}
}

impl Debug for Registry {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("methods", &self.graph.read().len())
			.field("pipelines", &self.pipelines.len())
			.finish()
	}
}

impl Registry {
	/// Creates a registry without any converters.
	pub fn new() -> Self {
		Registry {
			graph: RwLock::new(ConverterMap::default()),
			pipelines: PipelineCache::new(),
		}
	}

	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::new()
	}

	/// Applies a change to the graph, clearing the pipeline cache if the
	/// graph was modified.
	fn mutate(&self, f: impl FnOnce(&mut ConverterMap) -> bool) -> bool {
		let mut graph = self.graph.write();
		let changed = f(&mut graph);
		if changed {
			debug!("Converter graph changed, clearing {} cached pipelines", self.pipelines.len());
			self.pipelines.clear();
		}
		changed
	}

	/// Installs every converter of a codec.
	///
	/// Installing the same codec type twice has no effect.
	pub fn install<C: Codec>(&self, codec: C) -> bool {
		self.mutate(|graph| {
			if !graph.put_codec(TypeId::of::<C>()) {
				return false;
			}
			let mut converters = Converters::default();
			codec.converters(&mut converters);
			trace!(
				"Installing codec {} with {} converters",
				std::any::type_name::<C>(),
				converters.methods.len()
			);
			for (sub, sup) in converters.subtypes {
				graph.put_subtype(sub, sup);
			}
			for method in converters.methods {
				graph.put(method);
			}
			true
		})
	}

	/// Registers a single converter.
	///
	/// Registering the same callable twice for the same pair of types has no
	/// effect.
	pub fn register(
		&self,
		src: TypeKey,
		tgt: TypeKey,
		distance: u32,
		extensible: bool,
		apply: ConvertFn,
	) -> bool {
		self.register_method(ConverterMethod::new(src, tgt, distance, extensible, apply))
	}

	/// Registers a single converter method.
	pub fn register_method(&self, method: ConverterMethod) -> bool {
		trace!("Registering converter {} -> {}", method.src(), method.tgt());
		self.mutate(|graph| graph.put(method))
	}

	/// Removes every converter from `src` into `tgt`.
	pub fn unregister(&self, src: TypeKey, tgt: TypeKey) -> bool {
		trace!("Removing converters {src} -> {tgt}");
		self.mutate(|graph| graph.remove(src, tgt))
	}

	/// Declares `sub` as a subtype of `sup`.
	pub fn register_subtype(&self, sub: TypeKey, sup: TypeKey) -> bool {
		self.mutate(|graph| graph.put_subtype(sub, sup))
	}

	/// Check if a value of type `sub` is also a value of type `sup`.
	pub fn is_assignable(&self, sup: TypeKey, sub: TypeKey) -> bool {
		self.graph.read().is_assignable(sup, sub)
	}

	/// Computes the cheapest path between two types, bypassing the cache.
	pub fn find_path(&self, src: TypeKey, tgt: TypeKey) -> Option<Path> {
		self.graph.read().find_path(src, tgt)
	}

	/// Returns the pipeline between two types, computing and caching it if
	/// necessary.
	pub fn pipeline(&self, src: TypeKey, tgt: TypeKey) -> Option<Arc<Pipeline>> {
		if let Some(pipeline) = self.pipelines.get(src, tgt) {
			return Some(pipeline);
		}
		// The read guard is held until the pipeline is cached, so a concurrent
		// registration cannot clear the cache in between
		let graph = self.graph.read();
		let path = graph.find_path(src, tgt)?;
		trace!("Computed pipeline {src} -> {tgt} with distance {}", path.distance());
		let pipeline = Arc::new(Pipeline::new(src, tgt, path));
		self.pipelines.insert(pipeline.clone());
		Some(pipeline)
	}

	/// The number of pipelines currently cached.
	pub fn cached_pipelines(&self) -> usize {
		self.pipelines.len()
	}

	/// Converts a value into the requested type.
	///
	/// A missing value converts to a missing value without looking for a
	/// path.
	pub fn convert(&self, value: Option<Instance>, target: &XType) -> Result<Option<Instance>, Error> {
		let Some(value) = value else {
			return Ok(None);
		};
		let src = value.type_key();
		let Some(pipeline) = self.pipeline(src, target.raw()) else {
			return Err(Error::unsupported(src.name(), target.to_string()));
		};
		pipeline.convert(self, value, target).map(Some)
	}

	/// Converts a value into `T`.
	pub fn convert_to<T: Any + Send + Sync>(&self, value: Option<Instance>) -> Result<Option<T>, Error> {
		match self.convert(value, &XType::of::<T>())? {
			None => Ok(None),
			Some(v) => v.downcast::<T>().map(Some).map_err(|v| {
				Error::invalid_value(std::any::type_name::<T>(), v.type_key().name())
			}),
		}
	}

	/// Converts a host value into a node.
	pub fn to_node(&self, value: Option<Instance>) -> Result<Node, Error> {
		Ok(self.convert_to::<Node>(value)?.unwrap_or_default())
	}

	/// Converts a node into a host value of type `T`.
	///
	/// A null node converts to `None`.
	pub fn from_node<T: Any + Send + Sync>(&self, node: Node) -> Result<Option<T>, Error> {
		if node.is_null() {
			return Ok(None);
		}
		self.convert_to::<T>(Some(Instance::new(node)))
	}
}

/// The environment of a single conversion step
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
	registry: &'a Registry,
	target: &'a XType,
}

impl<'a> Context<'a> {
	pub(crate) fn new(registry: &'a Registry, target: &'a XType) -> Self {
		Context {
			registry,
			target,
		}
	}

	/// The type requested by the caller of the conversion.
	pub fn target(&self) -> &'a XType {
		self.target
	}

	pub fn registry(&self) -> &'a Registry {
		self.registry
	}

	/// Converts a nested value, such as a collection element.
	pub fn convert(&self, value: Option<Instance>, target: &XType) -> Result<Option<Instance>, Error> {
		self.registry.convert(value, target)
	}

	/// Converts a nested value into a node.
	pub fn to_node(&self, value: Option<Instance>) -> Result<Node, Error> {
		self.registry.to_node(value)
	}
}
