//! Symbolic references: immutable path handles standing in for values that
//! only exist once a chain runs on the remote engine.
//!
//! A [`Reference`] never holds data. Accessing a field or projecting over an
//! array produces a new, longer handle, and the compiler later renders every
//! handle as a `{{path}}` template string.

pub mod path;
pub mod root;

pub use path::*;
pub use root::*;
