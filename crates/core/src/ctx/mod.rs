//! Dictionary pools shared by the two ends of a stream.
//!
//! Three durable dictionaries live as long as the stream: field names,
//! structs (the ordered field names of an object) and symbols. Entries are
//! announced in the frame which first uses them and expire after a frame
//! which does not use them. Literals (numbers and strings) are pooled per
//! frame only.

mod idpool;
mod input;
mod output;
mod pool;

use std::sync::Arc;

pub use self::idpool::{FIRST_ID, IdPool};
pub use self::input::InputContext;
pub use self::output::{OutputContext, is_stable};
pub use self::pool::{Pool, PoolDiff};

/// The ordered field names of an object
pub type Fields = Arc<[String]>;

/// The changes of every durable dictionary in a single frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContextDiff {
	pub names: PoolDiff<String>,
	pub structs: PoolDiff<Fields>,
	pub symbols: PoolDiff<String>,
}

impl ContextDiff {
	pub fn is_empty(&self) -> bool {
		self.names.is_empty() && self.structs.is_empty() && self.symbols.is_empty()
	}
}
