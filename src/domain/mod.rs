//! Pure domain types with minimal dependencies
//!
//! Nothing here performs I/O. Rendering, storage and overlay state build on
//! these types.

pub mod anchor;
pub mod geometry;
pub mod plan;

pub use anchor::*;
pub use geometry::*;
pub use plan::*;
