//! Directory comparison adapters.

mod tree;

pub use tree::WalkdirComparator;
