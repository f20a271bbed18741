//! Codecs for scalar values and the combinators that compose them.

pub mod blob;
pub mod fixed;
pub mod list;
pub mod map;
pub mod option;
pub mod primitives;
pub mod record;
pub mod string;
pub mod tuple;
pub mod variant;
