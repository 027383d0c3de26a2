use std::sync::LazyLock;

use indexmap::IndexSet;
use packwire_types::{Array, Node, Object, Slice};
use regex::Regex;

use super::pool::Pool;
use super::{ContextDiff, Fields};
use crate::cnf::MAX_NESTING_DEPTH;
use crate::err::Error;

/// Field names which are safe to keep in the durable dictionaries
#[allow(clippy::unwrap_used)]
static STABLE_NAME: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]{0,63}$").unwrap());

/// Check if every field name of a struct looks like a stable identifier.
///
/// Objects keyed by arbitrary data (ids, user input, generated keys) would
/// otherwise grow the durable dictionaries without bound.
pub fn is_stable(fields: &[String]) -> bool {
	fields.iter().all(|f| STABLE_NAME.is_match(f))
}

/// The shape of an object as recorded by the scan
#[derive(Debug)]
enum Shape {
	Durable(Fields),
	Transient(usize),
}

/// The writing end of a stream's dictionaries
///
/// Encoding a frame happens in two passes over the same node. [`scan`]
/// collects every literal and touches every dictionary entry the node uses,
/// then commits the durable pools. The body is then written in the same
/// order, and looks up the ids the scan assigned.
///
/// [`scan`]: OutputContext::scan
#[derive(Debug)]
pub struct OutputContext {
	names: Pool<String>,
	structs: Pool<Fields>,
	symbols: Pool<String>,
	floats: IndexSet<u32>,
	doubles: IndexSet<u64>,
	varints: IndexSet<i64>,
	strings: IndexSet<String>,
	tmp_names: IndexSet<String>,
	tmp_structs: IndexSet<Fields>,
	shapes: Vec<Shape>,
	refs: Vec<u64>,
	cursor: usize,
	max_depth: u32,
}

impl Default for OutputContext {
	fn default() -> Self {
		Self::new()
	}
}

impl OutputContext {
	pub fn new() -> Self {
		OutputContext {
			names: Pool::new(),
			structs: Pool::new(),
			symbols: Pool::new(),
			floats: IndexSet::new(),
			doubles: IndexSet::new(),
			varints: IndexSet::new(),
			strings: IndexSet::new(),
			tmp_names: IndexSet::new(),
			tmp_structs: IndexSet::new(),
			shapes: Vec::new(),
			refs: Vec::new(),
			cursor: 0,
			max_depth: *MAX_NESTING_DEPTH,
		}
	}

	/// Overrides the maximum nesting depth of encoded nodes.
	pub fn with_max_depth(mut self, max_depth: u32) -> Self {
		self.max_depth = max_depth;
		self
	}

	/// Prepares the dictionaries for a frame carrying `node`.
	///
	/// On failure the durable pools are left as they were before the call.
	pub fn scan(&mut self, node: &Node) -> Result<ContextDiff, Error> {
		self.floats.clear();
		self.doubles.clear();
		self.varints.clear();
		self.strings.clear();
		self.tmp_names.clear();
		self.tmp_structs.clear();
		self.shapes.clear();
		self.refs.clear();
		self.cursor = 0;
		if let Err(e) = self.visit(node, 0) {
			self.names.rollback();
			self.structs.rollback();
			self.symbols.rollback();
			return Err(e);
		}
		// Names first, since added structs refer to name ids
		let diff = ContextDiff {
			names: self.names.commit(),
			structs: self.structs.commit(),
			symbols: self.symbols.commit(),
		};
		let refs = std::mem::take(&mut self.shapes)
			.into_iter()
			.map(|shape| match shape {
				Shape::Durable(fields) => self
					.structs
					.id_of(&fields)
					.map(|id| u64::from(id) << 1)
					.ok_or_else(|| Error::InvalidData("struct was not committed".to_string())),
				Shape::Transient(index) => Ok(((index as u64) << 1) | 1),
			})
			.collect::<Result<_, _>>();
		match refs {
			Ok(refs) => self.refs = refs,
			Err(e) => {
				self.revert();
				return Err(e);
			}
		}
		Ok(diff)
	}

	/// Undoes the dictionary changes of the last scan.
	///
	/// Used when the frame could not be written, so that the next frame
	/// starts from the state the reading end last saw.
	pub fn revert(&mut self) {
		self.names.revert();
		self.structs.revert();
		self.symbols.revert();
		self.refs.clear();
		self.cursor = 0;
	}

	fn visit(&mut self, node: &Node, depth: u32) -> Result<(), Error> {
		match node {
			Node::Null | Node::Bool(_) => {}
			Node::Varint(v) => {
				if *v != 0 {
					self.varints.insert(*v);
				}
			}
			Node::Float32(v) => {
				if v.to_bits() != 0 {
					self.floats.insert(v.to_bits());
				}
			}
			Node::Float64(v) => {
				if v.to_bits() != 0 {
					self.doubles.insert(v.to_bits());
				}
			}
			Node::String(v) => self.visit_string(v),
			Node::Symbol(v) => self.visit_symbol(v.as_str()),
			Node::Array(v) => {
				self.check_depth(depth)?;
				self.visit_array(v, depth + 1)?;
			}
			Node::Object(v) => {
				self.check_depth(depth)?;
				self.visit_object(v, depth + 1)?;
			}
		}
		Ok(())
	}

	fn check_depth(&self, depth: u32) -> Result<(), Error> {
		if depth >= self.max_depth {
			return Err(Error::InvalidData(format!(
				"value is nested deeper than {} levels",
				self.max_depth
			)));
		}
		Ok(())
	}

	fn visit_string(&mut self, v: &str) {
		if !v.is_empty() && !self.strings.contains(v) {
			self.strings.insert(v.to_string());
		}
	}

	fn visit_symbol(&mut self, v: &str) {
		if !v.is_empty() {
			self.symbols.touch(v, || v.to_string());
		}
	}

	fn visit_array(&mut self, arr: &Array, depth: u32) -> Result<(), Error> {
		for slice in arr.slices() {
			match slice {
				Slice::String(v) => v.iter().for_each(|v| self.visit_string(v)),
				Slice::Symbol(v) => v.iter().for_each(|v| self.visit_symbol(v.as_str())),
				Slice::Object(v) => {
					for obj in v {
						self.check_depth(depth)?;
						self.visit_object(obj, depth + 1)?;
					}
				}
				Slice::Array(v) => {
					for arr in v {
						self.check_depth(depth)?;
						self.visit_array(arr, depth + 1)?;
					}
				}
				// Everything else is written inline
				_ => {}
			}
		}
		Ok(())
	}

	fn visit_object(&mut self, obj: &Object, depth: u32) -> Result<(), Error> {
		let fields: Fields = obj.keys().cloned().collect();
		if is_stable(&fields) {
			self.structs.touch(&fields, || fields.clone());
			for name in fields.iter() {
				self.names.touch(name.as_str(), || name.clone());
			}
			self.shapes.push(Shape::Durable(fields));
		} else {
			for name in fields.iter() {
				if !self.tmp_names.contains(name.as_str()) {
					self.tmp_names.insert(name.clone());
				}
			}
			let (index, _) = self.tmp_structs.insert_full(fields);
			self.shapes.push(Shape::Transient(index));
		}
		for value in obj.values() {
			self.visit(value, depth)?;
		}
		Ok(())
	}

	/// Literal floats of the current frame, as bit patterns.
	pub fn floats(&self) -> &IndexSet<u32> {
		&self.floats
	}

	/// Literal doubles of the current frame, as bit patterns.
	pub fn doubles(&self) -> &IndexSet<u64> {
		&self.doubles
	}

	pub fn varints(&self) -> &IndexSet<i64> {
		&self.varints
	}

	pub fn strings(&self) -> &IndexSet<String> {
		&self.strings
	}

	/// Field names only used by transient structs in the current frame.
	pub fn tmp_names(&self) -> &IndexSet<String> {
		&self.tmp_names
	}

	pub fn tmp_structs(&self) -> &IndexSet<Fields> {
		&self.tmp_structs
	}

	pub fn varint_id(&self, v: i64) -> Result<u64, Error> {
		if v == 0 {
			return Ok(1);
		}
		literal_id(self.varints.get_index_of(&v), "integer")
	}

	pub fn float_id(&self, v: f32) -> Result<u64, Error> {
		if v.to_bits() == 0 {
			return Ok(1);
		}
		literal_id(self.floats.get_index_of(&v.to_bits()), "float")
	}

	pub fn double_id(&self, v: f64) -> Result<u64, Error> {
		if v.to_bits() == 0 {
			return Ok(1);
		}
		literal_id(self.doubles.get_index_of(&v.to_bits()), "double")
	}

	pub fn string_id(&self, v: &str) -> Result<u64, Error> {
		if v.is_empty() {
			return Ok(1);
		}
		literal_id(self.strings.get_index_of(v), "string")
	}

	pub fn symbol_id(&self, v: &str) -> Result<u64, Error> {
		if v.is_empty() {
			return Ok(1);
		}
		self.symbols
			.id_of(v)
			.map(u64::from)
			.ok_or_else(|| Error::InvalidData(format!("symbol {v:?} was not scanned")))
	}

	/// The durable id of a field name.
	pub fn name_id(&self, v: &str) -> Result<u32, Error> {
		self.names.id_of(v).ok_or_else(|| Error::InvalidData(format!("name {v:?} was not scanned")))
	}

	/// The position of a field name in the transient name list.
	pub fn tmp_name_index(&self, v: &str) -> Result<usize, Error> {
		self.tmp_names
			.get_index_of(v)
			.ok_or_else(|| Error::InvalidData(format!("name {v:?} was not scanned")))
	}

	/// The struct reference of the next object, in the order the scan
	/// visited them.
	pub fn next_struct_ref(&mut self) -> Result<u64, Error> {
		let out = self
			.refs
			.get(self.cursor)
			.copied()
			.ok_or_else(|| Error::InvalidData("object was not scanned".to_string()))?;
		self.cursor += 1;
		Ok(out)
	}

	/// The number of live entries in the name, struct and symbol pools.
	pub fn sizes(&self) -> (usize, usize, usize) {
		(self.names.len(), self.structs.len(), self.symbols.len())
	}
}

fn literal_id(index: Option<usize>, what: &str) -> Result<u64, Error> {
	index
		.map(|i| i as u64 + 2)
		.ok_or_else(|| Error::InvalidData(format!("{what} literal was not scanned")))
}
