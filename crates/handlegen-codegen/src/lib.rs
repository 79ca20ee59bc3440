//! Generate safe wrappers for C-style native APIs.
//!
//! # Overview
//!
//! `handlegen-codegen` turns [method descriptors] for a
//! handle-based, result-code-returning native API into Rust
//! wrappers that
//!
//! - grow output buffers for "query size, then fill" (two-call)
//!   functions,
//! - turn result codes into assertions or errors according to an
//!   [`ErrorPolicy`], and
//! - hand out owned handles that are destroyed exactly once.
//!
//! The generated code depends on `handlegen-core`.
//!
//! # Usage
//!
//! This crate is designed to be used from a [build script] or
//! from the `handlegen` command line tool.
//!
//! ```rust
//! use handlegen_codegen::{Config, ErrorPolicy};
//!
//! let json = r#"{
//!     "methods": [{
//!         "name": "enumerate_formats",
//!         "params": [
//!             { "name": "session", "type": "u64" },
//!             { "name": "rt", "type": "&Runtime" }
//!         ],
//!         "array": "formats",
//!         "count": "count",
//!         "capacity": "capacity",
//!         "element": "i64",
//!         "invoke": "rt.enumerate_formats(session, capacity, &mut count, formats)"
//!     }]
//! }"#;
//!
//! let mut cfg = Config::new("xr", syn::parse_quote!(crate::XrResult));
//! cfg.policy = ErrorPolicy::AlwaysFail;
//! cfg.dispatch.register(syn::parse_quote!(Runtime));
//!
//! let tokens = cfg.generate_json(json)?;
//! let code = handlegen_codegen::format(&tokens);
//! assert!(code.contains("pub fn enumerate_formats_with"));
//! # Ok::<(), handlegen_codegen::BuildError>(())
//! ```
//!
//! [method descriptors]: syntax::MethodDescriptor
//! [build script]: https://doc.rust-lang.org/cargo/reference/build-scripts.html

mod ast;
pub mod attr;
mod ctx;
mod error;
mod generate;
mod policy;
pub mod syntax;
mod util;

pub use error::BuildError;
pub use generate::{Config, dump, format};
pub use policy::ErrorPolicy;
pub use util::{IdentExt, KeyValPair};
