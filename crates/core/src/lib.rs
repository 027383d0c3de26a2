//! # Packwire Core
//!
//! The encoding engine of packwire. It turns host values into [`Node`] trees
//! through a registry of type converters, and writes those trees as compact
//! binary frames. A long-lived stream keeps dictionaries of field names,
//! object schemas and symbols on both ends, so repeated structure is sent
//! once and referenced by id afterwards.
//!
//! The main entry points are:
//!
//! - [`conv::Registry`], the converter registry and path router;
//! - [`frame::FrameWriter`] and [`frame::FrameReader`], the two halves of a
//!   context-aware stream;
//! - [`stream::Stream`], which bundles both with a shared registry.
//!
//! [`Node`]: packwire_types::Node

#[macro_use]
extern crate tracing;

#[macro_use]
mod mac;

pub mod buf;
pub mod cnf;
pub mod codec;
pub mod conv;
pub mod ctx;
pub mod err;
pub mod frame;
pub mod stream;

pub use packwire_types as types;
