#![forbid(unsafe_code)]
//! weir-optimizer: compile-time annotating passes over the dataflow IR.
//!
//! An annotating pass rewrites exactly one declared attribute and reads a
//! declared set of others; the driver (external to this crate) runs passes
//! sequentially in dependency order. Passes never touch graph structure.

pub mod annotating;
pub mod default_decoder;
pub mod large_shuffle;

pub use annotating::AnnotatingPass;
pub use default_decoder::DefaultEdgeDecoderPass;
pub use large_shuffle::LargeShuffleDecoderPass;
