//! Items used by generated code.
//!
//! Not part of the public API.

pub use alloc::{string::String, vec::Vec};

pub use tracing;
