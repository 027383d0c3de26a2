use packwire_types::{Node, Symbol};

use super::{Codec, mismatch};
use crate::conv::Converters;
use crate::err::Error;

/// Converters between scalar Rust types and nodes
///
/// Narrow integers are widened into `i64` before becoming a node, and a
/// node is narrowed back with a range check.
#[derive(Debug)]
pub struct ScalarCodec;

macro_rules! narrow {
	($c:expr, $($t:ty),*) => {
		$(
			$c.add::<i64, $t, _>(1, |v, _| match <$t>::try_from(v) {
				Ok(v) => Ok(v),
				Err(_) => fail!(Error::invalid_value(stringify!($t), format!("out of range integer {v}"))),
			});
			$c.add::<$t, i64, _>(1, |v, _| Ok(i64::from(v)));
		)*
	};
}

impl Codec for ScalarCodec {
	fn converters(&self, c: &mut Converters) {
		c.add::<bool, Node, _>(1, |v, _| Ok(Node::Bool(v)));
		c.add::<Node, bool, _>(1, |v, _| match v {
			Node::Bool(v) => Ok(v),
			v => fail!(mismatch("bool", &v)),
		});
		// Integers
		c.add::<i64, Node, _>(1, |v, _| Ok(Node::Varint(v)));
		c.add::<Node, i64, _>(1, |v, _| match v {
			Node::Varint(v) => Ok(v),
			v => fail!(mismatch("varint", &v)),
		});
		narrow!(c, i8, i16, i32);
		// Floats
		c.add::<f32, Node, _>(1, |v, _| Ok(Node::Float32(v)));
		c.add::<Node, f32, _>(1, |v, _| match v {
			Node::Float32(v) => Ok(v),
			v => fail!(mismatch("float32", &v)),
		});
		c.add::<f32, f64, _>(1, |v, _| Ok(f64::from(v)));
		c.add::<f64, Node, _>(1, |v, _| Ok(Node::Float64(v)));
		c.add::<Node, f64, _>(1, |v, _| match v {
			Node::Float64(v) => Ok(v),
			Node::Float32(v) => Ok(f64::from(v)),
			v => fail!(mismatch("float64", &v)),
		});
		// Text
		c.add::<&'static str, String, _>(1, |v, _| Ok(v.to_owned()));
		c.add::<String, Node, _>(1, |v, _| Ok(Node::String(v)));
		c.add::<Node, String, _>(1, |v, _| match v {
			Node::String(v) => Ok(v),
			Node::Symbol(v) => Ok(v.into_string()),
			v => fail!(mismatch("string", &v)),
		});
		c.add::<Symbol, Node, _>(1, |v, _| Ok(Node::Symbol(v)));
		c.add::<Node, Symbol, _>(1, |v, _| match v {
			Node::Symbol(v) => Ok(v),
			Node::String(v) => Ok(Symbol::from(v)),
			v => fail!(mismatch("symbol", &v)),
		});
	}
}
