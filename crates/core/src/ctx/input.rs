use packwire_types::Symbol;

use super::Fields;
use super::pool::Pool;
use crate::err::Error;

/// The reading end of a stream's dictionaries
///
/// The durable pools replay the additions and expirations announced by each
/// frame. Literal tables and transient structs only hold the current frame.
#[derive(Debug, Default)]
pub struct InputContext {
	names: Pool<String>,
	structs: Pool<Fields>,
	symbols: Pool<String>,
	pub(crate) floats: Vec<f32>,
	pub(crate) doubles: Vec<f64>,
	pub(crate) varints: Vec<i64>,
	pub(crate) strings: Vec<String>,
	tmp_names: Vec<String>,
	tmp_structs: Vec<Fields>,
}

/// Maps a pooled id to its position in a literal table.
fn index_of(id: u64, len: usize, what: &str) -> Result<usize, Error> {
	usize::try_from(id)
		.ok()
		.and_then(|id| id.checked_sub(2))
		.filter(|i| *i < len)
		.ok_or_else(|| Error::InvalidData(format!("unknown {what} id {id}")))
}

fn pool_id(id: u64) -> Result<u32, Error> {
	u32::try_from(id).map_err(|_| Error::InvalidData(format!("dictionary id {id} is out of range")))
}

impl InputContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Forgets everything scoped to the previous frame.
	pub fn begin_frame(&mut self) {
		self.floats.clear();
		self.doubles.clear();
		self.varints.clear();
		self.strings.clear();
		self.tmp_names.clear();
		self.tmp_structs.clear();
	}

	pub fn add_symbol(&mut self, v: String) -> u32 {
		self.symbols.add(v)
	}

	pub fn expire_symbol(&mut self, id: u64) -> Result<(), Error> {
		self.symbols.expire(pool_id(id)?).map(drop)
	}

	pub fn add_name(&mut self, v: String) -> u32 {
		self.names.add(v)
	}

	pub fn expire_name(&mut self, id: u64) -> Result<(), Error> {
		self.names.expire(pool_id(id)?).map(drop)
	}

	/// Adds a durable struct made of durable name ids.
	pub fn add_struct(&mut self, names: &[u64]) -> Result<u32, Error> {
		let fields = names
			.iter()
			.map(|id| self.names.resolve(pool_id(*id)?).cloned())
			.collect::<Result<Fields, Error>>()?;
		Ok(self.structs.add(fields))
	}

	pub fn expire_struct(&mut self, id: u64) -> Result<(), Error> {
		self.structs.expire(pool_id(id)?).map(drop)
	}

	pub fn add_tmp_name(&mut self, v: String) {
		self.tmp_names.push(v);
	}

	/// Adds a transient struct made of positions in the transient name list.
	pub fn add_tmp_struct(&mut self, names: &[u64]) -> Result<(), Error> {
		let fields = names
			.iter()
			.map(|i| {
				usize::try_from(*i)
					.ok()
					.and_then(|i| self.tmp_names.get(i))
					.cloned()
					.ok_or_else(|| Error::InvalidData(format!("unknown transient name {i}")))
			})
			.collect::<Result<Fields, Error>>()?;
		self.tmp_structs.push(fields);
		Ok(())
	}

	pub fn float(&self, id: u64) -> Result<f32, Error> {
		if id == 1 {
			return Ok(0.0);
		}
		index_of(id, self.floats.len(), "float").map(|i| self.floats[i])
	}

	pub fn double(&self, id: u64) -> Result<f64, Error> {
		if id == 1 {
			return Ok(0.0);
		}
		index_of(id, self.doubles.len(), "double").map(|i| self.doubles[i])
	}

	pub fn varint(&self, id: u64) -> Result<i64, Error> {
		if id == 1 {
			return Ok(0);
		}
		index_of(id, self.varints.len(), "integer").map(|i| self.varints[i])
	}

	pub fn string(&self, id: u64) -> Result<String, Error> {
		if id == 1 {
			return Ok(String::new());
		}
		index_of(id, self.strings.len(), "string").map(|i| self.strings[i].clone())
	}

	pub fn symbol(&self, id: u64) -> Result<Symbol, Error> {
		if id == 1 {
			return Ok(Symbol::default());
		}
		self.symbols.resolve(pool_id(id)?).map(|v| Symbol::new(v.as_str()))
	}

	/// Resolves a struct reference, `(id << 1) | transient`.
	pub fn fields(&self, reference: u64) -> Result<Fields, Error> {
		let id = reference >> 1;
		if reference & 1 == 1 {
			return usize::try_from(id)
				.ok()
				.and_then(|i| self.tmp_structs.get(i))
				.cloned()
				.ok_or_else(|| Error::InvalidData(format!("unknown transient struct {id}")));
		}
		self.structs.resolve(pool_id(id)?).cloned()
	}

	/// The number of live entries in the name, struct and symbol pools.
	pub fn sizes(&self) -> (usize, usize, usize) {
		(self.names.len(), self.structs.len(), self.symbols.len())
	}
}
