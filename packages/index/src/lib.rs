//! Doxygen XML output as a cross-reference index.
//!
//! [`DoxygenIndex`] reads `index.xml` and resolves reference identifiers for
//! the render pass. [`Aeration`]s locate the definition of a compound or
//! member in its compound file.

pub mod aeration;
pub mod error;
pub mod index;

pub use aeration::{Aeration, Matter};
pub use error::{IndexError, IndexResult};
pub use index::{DoxygenIndex, INDEX_FILE};
